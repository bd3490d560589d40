//! Request and response shapes for the terminology API.
//!
//! Read types (`Api*`) are deliberately lenient: every field the client does not
//! strictly need is `#[serde(default)]` so that server-side additions never break
//! decoding. Write types (`New*`, [`EditableContainerFields`]) mirror exactly what the
//! server expects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{
    CUSTOM_VALIDATION_SCHEMA, OCL_COLLECTION_TYPE, OCL_DICTIONARY_TYPE, OCL_SOURCE_TYPE,
};

/// Who can see a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Visibility {
    /// Private to the owner
    #[default]
    None,
    /// Anyone may view
    View,
    /// Anyone may view and edit
    Edit,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::None => "None",
            Self::View => "View",
            Self::Edit => "Edit",
        };
        f.write_str(label)
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "private" => Ok(Self::None),
            "view" | "public" => Ok(Self::View),
            "edit" => Ok(Self::Edit),
            other => Err(format!("unknown visibility '{other}' (expected private, view or edit)")),
        }
    }
}

/// Values a user supplies when creating or editing a dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dictionary {
    /// Display name, e.g. "Malaria Clinic"
    pub name: String,
    /// Short code used as the dictionary id, e.g. "MC"
    pub short_code: String,
    pub description: String,
    /// Preferred language
    pub default_locale: String,
    /// Other languages
    pub supported_locales: Vec<String>,
    /// `/users/<user>/` or `/orgs/<org>/`
    pub owner_url: String,
    /// Source that concepts are preferably added from, e.g. "CIEL"
    pub preferred_source: String,
    pub public_access: Visibility,
}

impl Dictionary {
    fn joined_locales(&self) -> String {
        self.supported_locales.join(",")
    }

    /// Rebuild form values from a stored dictionary.
    #[must_use]
    pub fn from_api(dictionary: &ApiDictionary) -> Self {
        Self {
            name: dictionary.name.clone(),
            short_code: dictionary.short_code.clone().unwrap_or_else(|| dictionary.id.clone()),
            description: dictionary.description.clone().unwrap_or_default(),
            default_locale: dictionary.default_locale.clone().unwrap_or_default(),
            supported_locales: dictionary.supported_locales.clone(),
            owner_url: dictionary.owner_url.clone().unwrap_or_default(),
            preferred_source: dictionary.preferred_source.clone().unwrap_or_default(),
            public_access: dictionary.public_access.unwrap_or_default(),
        }
    }
}

/// URLs of the private resources backing a dictionary, kept in its `extras`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DictionaryExtras {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
}

/// Payload creating the private source behind a dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewSource {
    pub id: String,
    pub short_code: String,
    pub name: String,
    pub full_name: String,
    pub description: String,
    pub default_locale: String,
    pub supported_locales: String,
    pub public_access: Visibility,
    pub source_type: String,
    pub custom_validation_schema: String,
    pub external_id: String,
    pub website: String,
}

impl NewSource {
    /// Private source named after the dictionary ("<name> Source").
    #[must_use]
    pub fn for_dictionary(dictionary: &Dictionary) -> Self {
        let short_code = format!("{}Source", dictionary.short_code);
        Self {
            id: short_code.clone(),
            short_code,
            name: format!("{} Source", dictionary.name),
            full_name: format!("{} Source", dictionary.name),
            description: dictionary.description.clone(),
            default_locale: dictionary.default_locale.clone(),
            supported_locales: dictionary.joined_locales(),
            public_access: Visibility::None,
            source_type: OCL_SOURCE_TYPE.to_string(),
            custom_validation_schema: CUSTOM_VALIDATION_SCHEMA.to_string(),
            external_id: uuid::Uuid::new_v4().to_string(),
            website: String::new(),
        }
    }
}

/// Payload creating the private collection behind a dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewCollection {
    pub id: String,
    pub short_code: String,
    pub name: String,
    pub full_name: String,
    pub description: String,
    pub default_locale: String,
    pub supported_locales: String,
    pub public_access: Visibility,
    pub collection_type: String,
    pub custom_validation_schema: String,
    pub external_id: String,
    pub website: String,
}

impl NewCollection {
    /// Private collection named after the dictionary ("<name> Collection").
    #[must_use]
    pub fn for_dictionary(dictionary: &Dictionary) -> Self {
        let short_code = format!("{}Collection", dictionary.short_code);
        Self {
            id: short_code.clone(),
            short_code,
            name: format!("{} Collection", dictionary.name),
            full_name: format!("{} Collection", dictionary.name),
            description: dictionary.description.clone(),
            default_locale: dictionary.default_locale.clone(),
            supported_locales: dictionary.joined_locales(),
            public_access: Visibility::None,
            collection_type: OCL_COLLECTION_TYPE.to_string(),
            custom_validation_schema: CUSTOM_VALIDATION_SCHEMA.to_string(),
            external_id: uuid::Uuid::new_v4().to_string(),
            website: String::new(),
        }
    }
}

/// Payload creating the dictionary itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewDictionary {
    pub id: String,
    pub short_code: String,
    pub name: String,
    pub full_name: String,
    pub description: String,
    pub default_locale: String,
    pub supported_locales: String,
    pub public_access: Visibility,
    pub preferred_source: String,
    pub collection_type: String,
    pub custom_validation_schema: String,
    pub external_id: String,
    pub website: String,
    pub extras: DictionaryExtras,
}

impl NewDictionary {
    /// Dictionary payload linking the already-created source and collection.
    #[must_use]
    pub fn for_dictionary(dictionary: &Dictionary, source_url: &str, collection_url: &str) -> Self {
        Self {
            id: dictionary.short_code.clone(),
            short_code: dictionary.short_code.clone(),
            name: dictionary.name.clone(),
            full_name: dictionary.name.clone(),
            description: dictionary.description.clone(),
            default_locale: dictionary.default_locale.clone(),
            supported_locales: dictionary.joined_locales(),
            public_access: dictionary.public_access,
            preferred_source: dictionary.preferred_source.clone(),
            collection_type: OCL_DICTIONARY_TYPE.to_string(),
            custom_validation_schema: CUSTOM_VALIDATION_SCHEMA.to_string(),
            external_id: uuid::Uuid::new_v4().to_string(),
            website: String::new(),
            extras: DictionaryExtras {
                source: Some(source_url.to_string()),
                collection: Some(collection_url.to_string()),
            },
        }
    }
}

/// Fields updated in place when a dictionary is edited.
///
/// `public_access` is only sent for the dictionary; its backing source and
/// collection stay private.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditableContainerFields {
    pub name: String,
    pub description: String,
    pub default_locale: String,
    pub supported_locales: String,
    pub preferred_source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_access: Option<Visibility>,
}

impl EditableContainerFields {
    /// Fields for the backing source and collection.
    #[must_use]
    pub fn for_linked_resource(dictionary: &Dictionary) -> Self {
        Self {
            name: dictionary.name.clone(),
            description: dictionary.description.clone(),
            default_locale: dictionary.default_locale.clone(),
            supported_locales: dictionary.joined_locales(),
            preferred_source: dictionary.preferred_source.clone(),
            public_access: None,
        }
    }

    /// Fields for the dictionary itself, including visibility.
    #[must_use]
    pub fn for_dictionary(dictionary: &Dictionary) -> Self {
        Self {
            public_access: Some(dictionary.public_access),
            ..Self::for_linked_resource(dictionary)
        }
    }
}

/// A source as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSource {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub short_code: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub source_type: Option<String>,
    #[serde(default)]
    pub public_access: Option<Visibility>,
}

/// A collection as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiCollection {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub short_code: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub collection_type: Option<String>,
    #[serde(default)]
    pub public_access: Option<Visibility>,
}

/// A dictionary (a collection with linked resources in `extras`) as returned by the
/// server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiDictionary {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub short_code: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub default_locale: Option<String>,
    #[serde(default, deserialize_with = "locales::deserialize")]
    pub supported_locales: Vec<String>,
    #[serde(default)]
    pub owner_url: Option<String>,
    #[serde(default)]
    pub preferred_source: Option<String>,
    #[serde(default)]
    pub public_access: Option<Visibility>,
    #[serde(default)]
    pub extras: Option<DictionaryExtras>,
}

/// A released or draft version of a dictionary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiDictionaryVersion {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub released: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_on: Option<DateTime<Utc>>,
}

/// A concept to add to a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptRef {
    pub id: String,
    pub url: String,
    pub display_name: String,
}

impl ConceptRef {
    /// Reference for a bare identifier in `source_url`; the id doubles as display name.
    #[must_use]
    pub fn from_id(source_url: &str, id: &str) -> Self {
        Self {
            id: id.to_string(),
            url: concept_url(source_url, id),
            display_name: id.to_string(),
        }
    }
}

/// URL of concept `id` inside `source_url` (which ends with `/`).
#[must_use]
pub fn concept_url(source_url: &str, id: &str) -> String {
    format!("{}concepts/{}/", ensure_trailing_slash(source_url), id)
}

pub(crate) fn ensure_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    }
}

/// A mapping between two concepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMapping {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    pub map_type: String,
    #[serde(default)]
    pub from_concept_url: Option<String>,
    #[serde(default)]
    pub to_concept_url: Option<String>,
    #[serde(default)]
    pub to_concept_code: Option<String>,
    #[serde(default)]
    pub to_concept_name: Option<String>,
    #[serde(default)]
    pub to_source_url: Option<String>,
    #[serde(default)]
    pub retired: bool,
}

/// Outcome of one expression sent to the add-references endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceResult {
    #[serde(default)]
    pub added: bool,
    pub expression: String,
    #[serde(default)]
    pub message: serde_json::Value,
}

/// One page of a listing plus the URL of the following page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Value of the `next` response header; `None` on the last page
    pub next: Option<String>,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next: None,
        }
    }
}

/// Search parameters for dictionary listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub q: String,
    pub limit: u32,
    pub page: u32,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            q: String::new(),
            limit: 20,
            page: 1,
        }
    }
}

mod locales {
    //! `supported_locales` arrives as a list on reads but older servers echo the
    //! comma-joined string that was written.

    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Locales {
        List(Vec<String>),
        Joined(String),
        Missing,
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Locales>::deserialize(deserializer)? {
            Some(Locales::List(list)) => list,
            Some(Locales::Joined(joined)) => joined
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            Some(Locales::Missing) | None => Vec::new(),
        })
    }
}
