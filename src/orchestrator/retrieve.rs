//! Loading dictionaries into the store.

use tracing::{debug, warn};

use super::DictionaryOrchestrator;
use crate::api::{ApiDictionary, ListQuery};
use crate::core::ApiResult;
use crate::store::{ActionKey, ActionType, Listing};

/// One dictionary listing to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRequest {
    /// `{owner_url}collections/`
    pub collections_url: String,
    pub query: ListQuery,
}

impl ListingRequest {
    #[must_use]
    pub fn new(collections_url: impl Into<String>) -> Self {
        Self {
            collections_url: collections_url.into(),
            query: ListQuery::default(),
        }
    }

    #[must_use]
    pub fn with_query(mut self, query: ListQuery) -> Self {
        self.query = query;
        self
    }
}

impl Listing {
    /// Fixed index of this listing's `RetrieveDictionaries` action.
    const fn action_index(self) -> usize {
        match self {
            Self::Personal => 0,
            Self::Organisation => 1,
        }
    }
}

impl DictionaryOrchestrator {
    /// Load a dictionary and, when it has linked resources, its versions, source and
    /// collection.
    ///
    /// Returns the dictionary when it could be retrieved, even if loading one of its
    /// details failed.
    pub async fn retrieve_dictionary_and_details(&self, dictionary_url: &str) -> Option<ApiDictionary> {
        let key = ActionKey::single(ActionType::RetrieveDictionary);
        self.state.start(key);
        let result = self.api.retrieve_dictionary(dictionary_url).await;
        let dictionary = result.as_ref().ok().cloned();
        if let Some(dictionary) = &dictionary {
            self.state.cache_dictionary(dictionary.clone());
        }
        self.finish(key, result);

        let dictionary = dictionary?;
        let Some(extras) = dictionary.extras.clone() else {
            debug!("{} has no linked resources; skipping details", dictionary.url);
            return Some(dictionary);
        };

        self.retrieve_versions(dictionary_url).await;

        if let Some(source_url) = extras.source {
            match self.api.retrieve_source(&source_url).await {
                Ok(source) => self.state.cache_source(source),
                Err(error) => warn!("Could not load linked source {}: {}", source_url, error),
            }
        }
        if let Some(collection_url) = extras.collection {
            match self.api.retrieve_collection(&collection_url).await {
                Ok(collection) => self.state.cache_collection(collection),
                Err(error) => warn!("Could not load linked collection {}: {}", collection_url, error),
            }
        }

        Some(dictionary)
    }

    async fn retrieve_versions(&self, dictionary_url: &str) -> bool {
        let key = ActionKey::single(ActionType::RetrieveDictionaryVersions);
        self.state.start(key);
        let result = self.api.retrieve_dictionary_versions(dictionary_url).await;
        if let Ok(versions) = &result {
            self.state.set_versions(dictionary_url, versions.clone());
        }
        self.finish(key, result)
    }

    /// Load the personal and then the organisation dictionary listings.
    ///
    /// The two listings are requested one after the other: the server mixes up the
    /// results of concurrent listing requests.
    pub async fn retrieve_dictionaries(
        &self,
        personal: &ListingRequest,
        organisation: &ListingRequest,
    ) -> bool {
        let personal_ok = self.retrieve_listing(Listing::Personal, personal).await;
        let organisation_ok = self.retrieve_listing(Listing::Organisation, organisation).await;
        personal_ok && organisation_ok
    }

    async fn retrieve_listing(&self, listing: Listing, request: &ListingRequest) -> bool {
        let key = ActionKey::new(ActionType::RetrieveDictionaries, listing.action_index());
        self.state.start(key);
        let result: ApiResult<_> =
            self.api.list_dictionaries(&request.collections_url, &request.query).await;
        if let Ok(page) = &result {
            self.state.set_listing(listing, page.items.clone());
        }
        self.finish(key, result)
    }
}
