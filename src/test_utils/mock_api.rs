//! In-memory [`ResourceApi`] that records every call.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::api::types::ensure_trailing_slash;
use crate::api::{
    ApiCollection, ApiDictionary, ApiDictionaryVersion, ApiMapping, ApiSource,
    EditableContainerFields, ListQuery, NewCollection, NewDictionary, NewSource, Page,
    ReferenceResult, ResourceApi, concept_url,
};
use crate::core::{ApiResult, OclError};
use crate::resolver::concept_id_from_url;

/// Endpoint a call was made to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    CreateSource,
    CreateCollection,
    CreateDictionary,
    UpdateSource,
    UpdateCollection,
    UpdateDictionary,
    RetrieveDictionary,
    RetrieveSource,
    RetrieveCollection,
    RetrieveVersions,
    ListDictionaries,
    ListMappings,
    AddReferences,
    DeleteReferences,
}

/// One recorded call with its arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    CreateSource { owner_url: String, source: NewSource },
    CreateCollection { owner_url: String, collection: NewCollection },
    CreateDictionary { owner_url: String, dictionary: NewDictionary },
    UpdateSource { url: String, fields: EditableContainerFields },
    UpdateCollection { url: String, fields: EditableContainerFields },
    UpdateDictionary { url: String, fields: EditableContainerFields },
    RetrieveDictionary { url: String },
    RetrieveSource { url: String },
    RetrieveCollection { url: String },
    RetrieveVersions { url: String },
    ListDictionaries { url: String, query: ListQuery },
    ListMappings { concept_url: String, page: u32 },
    AddReferences { collection_url: String, expressions: Vec<String> },
    DeleteReferences { collection_url: String, expressions: Vec<String> },
}

impl ApiCall {
    #[must_use]
    pub const fn endpoint(&self) -> Endpoint {
        match self {
            Self::CreateSource { .. } => Endpoint::CreateSource,
            Self::CreateCollection { .. } => Endpoint::CreateCollection,
            Self::CreateDictionary { .. } => Endpoint::CreateDictionary,
            Self::UpdateSource { .. } => Endpoint::UpdateSource,
            Self::UpdateCollection { .. } => Endpoint::UpdateCollection,
            Self::UpdateDictionary { .. } => Endpoint::UpdateDictionary,
            Self::RetrieveDictionary { .. } => Endpoint::RetrieveDictionary,
            Self::RetrieveSource { .. } => Endpoint::RetrieveSource,
            Self::RetrieveCollection { .. } => Endpoint::RetrieveCollection,
            Self::RetrieveVersions { .. } => Endpoint::RetrieveVersions,
            Self::ListDictionaries { .. } => Endpoint::ListDictionaries,
            Self::ListMappings { .. } => Endpoint::ListMappings,
            Self::AddReferences { .. } => Endpoint::AddReferences,
            Self::DeleteReferences { .. } => Endpoint::DeleteReferences,
        }
    }

    /// URL the call targeted (the owner URL for creations).
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::CreateSource { owner_url, .. }
            | Self::CreateCollection { owner_url, .. }
            | Self::CreateDictionary { owner_url, .. } => owner_url,
            Self::UpdateSource { url, .. }
            | Self::UpdateCollection { url, .. }
            | Self::UpdateDictionary { url, .. }
            | Self::RetrieveDictionary { url }
            | Self::RetrieveSource { url }
            | Self::RetrieveCollection { url }
            | Self::RetrieveVersions { url }
            | Self::ListDictionaries { url, .. } => url,
            Self::ListMappings { concept_url, .. } => concept_url,
            Self::AddReferences { collection_url, .. }
            | Self::DeleteReferences { collection_url, .. } => collection_url,
        }
    }
}

#[derive(Default)]
struct MockState {
    calls: Vec<ApiCall>,
    endpoint_failures: HashMap<Endpoint, OclError>,
    url_failures: HashMap<String, OclError>,
    mappings: HashMap<String, Vec<ApiMapping>>,
    dictionaries: HashMap<String, ApiDictionary>,
    sources: HashMap<String, ApiSource>,
    collections: HashMap<String, ApiCollection>,
    versions: HashMap<String, Vec<ApiDictionaryVersion>>,
    listings: HashMap<String, Vec<ApiDictionary>>,
}

/// Test double for the terminology server.
///
/// Creations succeed and echo the payload back as the server would; retrievals serve
/// what was seeded with the `with_*` builders or created earlier; everything else
/// answers 404. Failures can be injected per endpoint or per URL, and the call is
/// still recorded before it fails.
///
/// ```rust,no_run
/// use ocl_dict::test_utils::{Endpoint, MockApi};
/// use ocl_dict::core::OclError;
///
/// let api = MockApi::new().fail(Endpoint::CreateCollection, OclError::Other {
///     message: "boom".into(),
/// });
/// ```
pub struct MockApi {
    state: Mutex<MockState>,
    mapping_page_size: usize,
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockApi {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState::default()),
            mapping_page_size: 100,
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every call to `endpoint` fails with `error`.
    #[must_use]
    pub fn fail(self, endpoint: Endpoint, error: OclError) -> Self {
        self.state().endpoint_failures.insert(endpoint, error);
        self
    }

    /// Every call targeting `url` fails with `error`.
    #[must_use]
    pub fn fail_url(self, url: &str, error: OclError) -> Self {
        self.state().url_failures.insert(url.to_string(), error);
        self
    }

    /// Serve `mapping` among the mappings of its `from_concept_url`.
    #[must_use]
    pub fn with_mapping(self, mapping: ApiMapping) -> Self {
        let from = mapping.from_concept_url.clone().unwrap_or_default();
        self.with_mapping_for(&from, mapping)
    }

    /// Serve `mapping` among the mappings of `concept_url`.
    #[must_use]
    pub fn with_mapping_for(self, concept_url: &str, mapping: ApiMapping) -> Self {
        self.state()
            .mappings
            .entry(ensure_trailing_slash(concept_url))
            .or_default()
            .push(mapping);
        self
    }

    #[must_use]
    pub const fn with_mapping_page_size(mut self, size: usize) -> Self {
        self.mapping_page_size = size;
        self
    }

    #[must_use]
    pub fn with_dictionary(self, dictionary: ApiDictionary) -> Self {
        self.state().dictionaries.insert(dictionary.url.clone(), dictionary);
        self
    }

    #[must_use]
    pub fn with_source(self, source: ApiSource) -> Self {
        self.state().sources.insert(source.url.clone(), source);
        self
    }

    #[must_use]
    pub fn with_collection(self, collection: ApiCollection) -> Self {
        self.state().collections.insert(collection.url.clone(), collection);
        self
    }

    #[must_use]
    pub fn with_versions(self, dictionary_url: &str, versions: Vec<ApiDictionaryVersion>) -> Self {
        self.state().versions.insert(dictionary_url.to_string(), versions);
        self
    }

    /// Dictionaries listed under `collections_url`.
    #[must_use]
    pub fn with_listing(self, collections_url: &str, dictionaries: Vec<ApiDictionary>) -> Self {
        self.state().listings.insert(collections_url.to_string(), dictionaries);
        self
    }

    #[must_use]
    pub fn calls(&self) -> Vec<ApiCall> {
        self.state().calls.clone()
    }

    #[must_use]
    pub fn endpoints(&self) -> Vec<Endpoint> {
        self.state().calls.iter().map(ApiCall::endpoint).collect()
    }

    #[must_use]
    pub fn count(&self, endpoint: Endpoint) -> usize {
        self.state().calls.iter().filter(|call| call.endpoint() == endpoint).count()
    }

    /// Concepts whose mappings were requested, one entry per traversal (first page only).
    #[must_use]
    pub fn mapping_fetches(&self) -> Vec<String> {
        self.state()
            .calls
            .iter()
            .filter_map(|call| match call {
                ApiCall::ListMappings {
                    concept_url,
                    page: 1,
                } => Some(concept_url.clone()),
                _ => None,
            })
            .collect()
    }

    /// Record `call`, then return the injected failure for it, if any.
    fn record(&self, call: ApiCall) -> ApiResult<()> {
        let mut state = self.state();
        let failure = state
            .endpoint_failures
            .get(&call.endpoint())
            .or_else(|| state.url_failures.get(call.url()))
            .cloned();
        state.calls.push(call);
        failure.map_or(Ok(()), Err)
    }
}

fn not_found(url: &str) -> OclError {
    OclError::ApiStatus {
        status: 404,
        url: url.to_string(),
        payload: Some(serde_json::json!({"detail": "Not found."})),
    }
}

fn split_locales(locales: &str) -> Vec<String> {
    locales.split(',').filter(|l| !l.is_empty()).map(str::to_string).collect()
}

fn last_segment(url: &str) -> String {
    concept_id_from_url(url).unwrap_or_default().to_string()
}

#[async_trait]
impl ResourceApi for MockApi {
    async fn create_source(&self, owner_url: &str, source: &NewSource) -> ApiResult<ApiSource> {
        self.record(ApiCall::CreateSource {
            owner_url: owner_url.to_string(),
            source: source.clone(),
        })?;
        let created = ApiSource {
            id: source.id.clone(),
            url: format!("{}sources/{}/", ensure_trailing_slash(owner_url), source.id),
            short_code: Some(source.short_code.clone()),
            name: source.name.clone(),
            source_type: Some(source.source_type.clone()),
            public_access: Some(source.public_access),
        };
        self.state().sources.insert(created.url.clone(), created.clone());
        Ok(created)
    }

    async fn create_collection(
        &self,
        owner_url: &str,
        collection: &NewCollection,
    ) -> ApiResult<ApiCollection> {
        self.record(ApiCall::CreateCollection {
            owner_url: owner_url.to_string(),
            collection: collection.clone(),
        })?;
        let created = ApiCollection {
            id: collection.id.clone(),
            url: format!("{}collections/{}/", ensure_trailing_slash(owner_url), collection.id),
            short_code: Some(collection.short_code.clone()),
            name: collection.name.clone(),
            collection_type: Some(collection.collection_type.clone()),
            public_access: Some(collection.public_access),
        };
        self.state().collections.insert(created.url.clone(), created.clone());
        Ok(created)
    }

    async fn create_dictionary(
        &self,
        owner_url: &str,
        dictionary: &NewDictionary,
    ) -> ApiResult<ApiDictionary> {
        self.record(ApiCall::CreateDictionary {
            owner_url: owner_url.to_string(),
            dictionary: dictionary.clone(),
        })?;
        let created = ApiDictionary {
            id: dictionary.id.clone(),
            url: format!("{}collections/{}/", ensure_trailing_slash(owner_url), dictionary.id),
            short_code: Some(dictionary.short_code.clone()),
            name: dictionary.name.clone(),
            description: Some(dictionary.description.clone()),
            default_locale: Some(dictionary.default_locale.clone()),
            supported_locales: split_locales(&dictionary.supported_locales),
            owner_url: Some(owner_url.to_string()),
            preferred_source: Some(dictionary.preferred_source.clone()),
            public_access: Some(dictionary.public_access),
            extras: Some(dictionary.extras.clone()),
        };
        self.state().dictionaries.insert(created.url.clone(), created.clone());
        Ok(created)
    }

    async fn update_source(
        &self,
        source_url: &str,
        fields: &EditableContainerFields,
    ) -> ApiResult<ApiSource> {
        self.record(ApiCall::UpdateSource {
            url: source_url.to_string(),
            fields: fields.clone(),
        })?;
        Ok(ApiSource {
            id: last_segment(source_url),
            url: source_url.to_string(),
            short_code: None,
            name: fields.name.clone(),
            source_type: None,
            public_access: fields.public_access,
        })
    }

    async fn update_collection(
        &self,
        collection_url: &str,
        fields: &EditableContainerFields,
    ) -> ApiResult<ApiCollection> {
        self.record(ApiCall::UpdateCollection {
            url: collection_url.to_string(),
            fields: fields.clone(),
        })?;
        Ok(ApiCollection {
            id: last_segment(collection_url),
            url: collection_url.to_string(),
            short_code: None,
            name: fields.name.clone(),
            collection_type: None,
            public_access: fields.public_access,
        })
    }

    async fn update_dictionary(
        &self,
        dictionary_url: &str,
        fields: &EditableContainerFields,
    ) -> ApiResult<ApiDictionary> {
        self.record(ApiCall::UpdateDictionary {
            url: dictionary_url.to_string(),
            fields: fields.clone(),
        })?;
        let mut state = self.state();
        let updated = match state.dictionaries.get(dictionary_url) {
            Some(stored) => ApiDictionary {
                name: fields.name.clone(),
                description: Some(fields.description.clone()),
                default_locale: Some(fields.default_locale.clone()),
                supported_locales: split_locales(&fields.supported_locales),
                preferred_source: Some(fields.preferred_source.clone()),
                public_access: fields.public_access.or(stored.public_access),
                ..stored.clone()
            },
            None => ApiDictionary {
                id: last_segment(dictionary_url),
                url: dictionary_url.to_string(),
                short_code: None,
                name: fields.name.clone(),
                description: Some(fields.description.clone()),
                default_locale: Some(fields.default_locale.clone()),
                supported_locales: split_locales(&fields.supported_locales),
                owner_url: None,
                preferred_source: Some(fields.preferred_source.clone()),
                public_access: fields.public_access,
                extras: None,
            },
        };
        state.dictionaries.insert(dictionary_url.to_string(), updated.clone());
        Ok(updated)
    }

    async fn retrieve_dictionary(&self, dictionary_url: &str) -> ApiResult<ApiDictionary> {
        self.record(ApiCall::RetrieveDictionary {
            url: dictionary_url.to_string(),
        })?;
        self.state().dictionaries.get(dictionary_url).cloned().ok_or_else(|| not_found(dictionary_url))
    }

    async fn retrieve_source(&self, source_url: &str) -> ApiResult<ApiSource> {
        self.record(ApiCall::RetrieveSource {
            url: source_url.to_string(),
        })?;
        self.state().sources.get(source_url).cloned().ok_or_else(|| not_found(source_url))
    }

    async fn retrieve_collection(&self, collection_url: &str) -> ApiResult<ApiCollection> {
        self.record(ApiCall::RetrieveCollection {
            url: collection_url.to_string(),
        })?;
        self.state().collections.get(collection_url).cloned().ok_or_else(|| not_found(collection_url))
    }

    async fn retrieve_dictionary_versions(
        &self,
        dictionary_url: &str,
    ) -> ApiResult<Vec<ApiDictionaryVersion>> {
        self.record(ApiCall::RetrieveVersions {
            url: dictionary_url.to_string(),
        })?;
        Ok(self.state().versions.get(dictionary_url).cloned().unwrap_or_default())
    }

    async fn list_dictionaries(
        &self,
        collections_url: &str,
        query: &ListQuery,
    ) -> ApiResult<Page<ApiDictionary>> {
        self.record(ApiCall::ListDictionaries {
            url: collections_url.to_string(),
            query: query.clone(),
        })?;
        let listed = self.state().listings.get(collections_url).cloned().unwrap_or_default();
        Ok(Page::last(listed))
    }

    async fn list_mappings_from(&self, concept_url: &str, page: u32) -> ApiResult<Page<ApiMapping>> {
        self.record(ApiCall::ListMappings {
            concept_url: concept_url.to_string(),
            page,
        })?;
        let all = self.state().mappings.get(concept_url).cloned().unwrap_or_default();
        let start = (page.saturating_sub(1) as usize).saturating_mul(self.mapping_page_size);
        let items: Vec<ApiMapping> =
            all.iter().skip(start).take(self.mapping_page_size).cloned().collect();
        let next = (start + items.len() < all.len())
            .then(|| format!("{concept_url}mappings/?page={}", page + 1));
        Ok(Page {
            items,
            next,
        })
    }

    async fn add_references(
        &self,
        collection_url: &str,
        expressions: &[String],
    ) -> ApiResult<Vec<ReferenceResult>> {
        self.record(ApiCall::AddReferences {
            collection_url: collection_url.to_string(),
            expressions: expressions.to_vec(),
        })?;
        Ok(expressions
            .iter()
            .map(|expression| ReferenceResult {
                added: true,
                expression: expression.clone(),
                message: serde_json::Value::Null,
            })
            .collect())
    }

    async fn delete_references(
        &self,
        collection_url: &str,
        expressions: &[String],
    ) -> ApiResult<()> {
        self.record(ApiCall::DeleteReferences {
            collection_url: collection_url.to_string(),
            expressions: expressions.to_vec(),
        })
    }
}

/// Non-retired mapping between two concepts of `source_url`.
#[must_use]
pub fn internal_mapping(source_url: &str, from_id: &str, to_id: &str, map_type: &str) -> ApiMapping {
    ApiMapping {
        id: None,
        url: None,
        map_type: map_type.to_string(),
        from_concept_url: Some(concept_url(source_url, from_id)),
        to_concept_url: Some(concept_url(source_url, to_id)),
        to_concept_code: Some(to_id.to_string()),
        to_concept_name: None,
        to_source_url: Some(ensure_trailing_slash(source_url)),
        retired: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_call_even_when_failing() {
        let api = MockApi::new().fail(
            Endpoint::CreateSource,
            OclError::Other {
                message: "boom".to_string(),
            },
        );
        let source = NewSource {
            id: "MCSource".to_string(),
            short_code: "MCSource".to_string(),
            name: "MC Source".to_string(),
            full_name: "MC Source".to_string(),
            description: String::new(),
            default_locale: "en".to_string(),
            supported_locales: "en".to_string(),
            public_access: crate::api::Visibility::None,
            source_type: "OCL Client Source".to_string(),
            custom_validation_schema: "OpenMRS".to_string(),
            external_id: "x".to_string(),
            website: String::new(),
        };

        assert!(api.create_source("/users/a/", &source).await.is_err());
        assert_eq!(api.endpoints(), vec![Endpoint::CreateSource]);
    }

    #[tokio::test]
    async fn test_mapping_pages() {
        let source = "/orgs/CIEL/sources/CIEL/";
        let api = MockApi::new()
            .with_mapping_page_size(1)
            .with_mapping(internal_mapping(source, "1", "2", "Q-AND-A"))
            .with_mapping(internal_mapping(source, "1", "3", "Q-AND-A"));
        let from = concept_url(source, "1");

        let first = api.list_mappings_from(&from, 1).await.unwrap();
        assert_eq!(first.items.len(), 1);
        assert!(first.next.is_some());

        let second = api.list_mappings_from(&from, 2).await.unwrap();
        assert_eq!(second.items.len(), 1);
        assert!(second.next.is_none());
    }

    #[tokio::test]
    async fn test_unknown_dictionary_is_not_found() {
        let api = MockApi::new();
        let error = api.retrieve_dictionary("/users/a/collections/X/").await.unwrap_err();
        assert_eq!(error.status(), Some(404));
    }
}
