//! Creating and editing a dictionary with its backing source and collection.

use tracing::debug;

use super::DictionaryOrchestrator;
use crate::api::{
    ApiDictionary, Dictionary, EditableContainerFields, NewCollection, NewDictionary, NewSource,
};
use crate::core::{ApiResult, OclError};
use crate::store::{ActionKey, ActionType};

/// URLs of the source and collection backing a dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedResources {
    pub source: String,
    pub collection: String,
}

impl LinkedResources {
    /// Read the linked URLs from a stored dictionary's `extras`.
    ///
    /// # Errors
    ///
    /// [`OclError::MissingLinkedResource`] when either URL is absent.
    pub fn from_dictionary(dictionary: &ApiDictionary) -> ApiResult<Self> {
        let extras = dictionary.extras.clone().unwrap_or_default();
        let missing = |field: &str| OclError::MissingLinkedResource {
            dictionary: dictionary.url.clone(),
            field: field.to_string(),
        };
        Ok(Self {
            source: extras.source.ok_or_else(|| missing("source"))?,
            collection: extras.collection.ok_or_else(|| missing("collection"))?,
        })
    }
}

impl DictionaryOrchestrator {
    /// Create the source, collection and dictionary for `data` under `owner_url`.
    ///
    /// Stops at the first failing step; resources created before it are kept.
    pub async fn create_dictionary(&self, owner_url: &str, data: &Dictionary) -> bool {
        let key = self.begin(ActionType::CreateSourceCollectionDictionary);
        let result = self.create_steps(key, owner_url, data).await;
        self.finish(key, result)
    }

    async fn create_steps(
        &self,
        key: ActionKey,
        owner_url: &str,
        data: &Dictionary,
    ) -> ApiResult<ApiDictionary> {
        self.state.progress(key, "Creating source...");
        let source = self.api.create_source(owner_url, &NewSource::for_dictionary(data)).await?;
        debug!("Created source {}", source.url);
        let source_url = source.url.clone();
        self.state.cache_source(source);

        self.state.progress(key, "Creating collection...");
        let collection =
            self.api.create_collection(owner_url, &NewCollection::for_dictionary(data)).await?;
        debug!("Created collection {}", collection.url);
        let collection_url = collection.url.clone();
        self.state.cache_collection(collection);

        self.state.progress(key, "Creating dictionary...");
        let payload = NewDictionary::for_dictionary(data, &source_url, &collection_url);
        let dictionary = self.api.create_dictionary(owner_url, &payload).await?;
        debug!("Created dictionary {}", dictionary.url);
        self.state.cache_dictionary(dictionary.clone());

        Ok(dictionary)
    }

    /// Apply `data` to the dictionary at `dictionary_url` and its linked resources.
    ///
    /// Visibility only changes on the dictionary; the source and collection stay private.
    pub async fn edit_dictionary(
        &self,
        dictionary_url: &str,
        data: &Dictionary,
        linked: &LinkedResources,
    ) -> bool {
        let key = self.begin(ActionType::EditSourceCollectionDictionary);
        let result = self.edit_steps(key, dictionary_url, data, linked).await;
        self.finish(key, result)
    }

    async fn edit_steps(
        &self,
        key: ActionKey,
        dictionary_url: &str,
        data: &Dictionary,
        linked: &LinkedResources,
    ) -> ApiResult<ApiDictionary> {
        let backing = EditableContainerFields::for_linked_resource(data);

        self.state.progress(key, "Editing source...");
        let source = self.api.update_source(&linked.source, &backing).await?;
        self.state.cache_source(source);

        self.state.progress(key, "Editing collection...");
        let collection = self.api.update_collection(&linked.collection, &backing).await?;
        self.state.cache_collection(collection);

        self.state.progress(key, "Editing dictionary...");
        let dictionary = self
            .api
            .update_dictionary(dictionary_url, &EditableContainerFields::for_dictionary(data))
            .await?;
        self.state.cache_dictionary(dictionary.clone());

        Ok(dictionary)
    }
}
