//! Remote resource API
//!
//! [`ResourceApi`] is the seam between the orchestrated flows and the terminology
//! server. Every endpoint returns an [`ApiResult`] with a concrete response type, so
//! callers handle a typed failure variant rather than checking whether a response
//! "looks" successful.
//!
//! # Implementations
//!
//! - [`HttpApi`] - `reqwest` client against a live server
//! - [`MockApi`](crate::test_utils::MockApi) - in-memory double that records every call
//!   (available with the `test-utils` feature)
//!
//! # URLs
//!
//! Resource URLs are server-relative (`/users/admin/collections/MC/`), exactly as the
//! server returns them in `url` fields. Implementations resolve them against their base
//! URL.

pub mod http;
pub mod types;

use async_trait::async_trait;
use tracing::warn;

use crate::constants::MAX_MAPPING_PAGES;
use crate::core::{ApiResult, OclError};

pub use http::HttpApi;
pub use types::{
    ApiCollection, ApiDictionary, ApiDictionaryVersion, ApiMapping, ApiSource, ConceptRef,
    Dictionary, DictionaryExtras, EditableContainerFields, ListQuery, NewCollection,
    NewDictionary, NewSource, Page, ReferenceResult, Visibility, concept_url,
};

/// Create/retrieve/update/delete operations against the terminology server.
#[async_trait]
pub trait ResourceApi: Send + Sync {
    /// POST `{owner_url}sources/`
    async fn create_source(&self, owner_url: &str, source: &NewSource) -> ApiResult<ApiSource>;

    /// POST `{owner_url}collections/`
    async fn create_collection(
        &self,
        owner_url: &str,
        collection: &NewCollection,
    ) -> ApiResult<ApiCollection>;

    /// POST `{owner_url}collections/` (a dictionary is a collection)
    async fn create_dictionary(
        &self,
        owner_url: &str,
        dictionary: &NewDictionary,
    ) -> ApiResult<ApiDictionary>;

    /// PUT `source_url`
    async fn update_source(
        &self,
        source_url: &str,
        fields: &EditableContainerFields,
    ) -> ApiResult<ApiSource>;

    /// PUT `collection_url`
    async fn update_collection(
        &self,
        collection_url: &str,
        fields: &EditableContainerFields,
    ) -> ApiResult<ApiCollection>;

    /// PUT `dictionary_url`
    async fn update_dictionary(
        &self,
        dictionary_url: &str,
        fields: &EditableContainerFields,
    ) -> ApiResult<ApiDictionary>;

    /// GET `dictionary_url`
    async fn retrieve_dictionary(&self, dictionary_url: &str) -> ApiResult<ApiDictionary>;

    /// GET `source_url`
    async fn retrieve_source(&self, source_url: &str) -> ApiResult<ApiSource>;

    /// GET `collection_url`
    async fn retrieve_collection(&self, collection_url: &str) -> ApiResult<ApiCollection>;

    /// GET `{dictionary_url}versions/`
    async fn retrieve_dictionary_versions(
        &self,
        dictionary_url: &str,
    ) -> ApiResult<Vec<ApiDictionaryVersion>>;

    /// GET `collections_url` filtered by `query`
    async fn list_dictionaries(
        &self,
        collections_url: &str,
        query: &ListQuery,
    ) -> ApiResult<Page<ApiDictionary>>;

    /// GET one page of `{concept_url}mappings/`
    async fn list_mappings_from(&self, concept_url: &str, page: u32) -> ApiResult<Page<ApiMapping>>;

    /// PUT `{collection_url}references/`
    async fn add_references(
        &self,
        collection_url: &str,
        expressions: &[String],
    ) -> ApiResult<Vec<ReferenceResult>>;

    /// DELETE `{collection_url}references/`
    async fn delete_references(&self, collection_url: &str, expressions: &[String])
    -> ApiResult<()>;

    /// Every mapping of `concept_url`, following `next` until the last page.
    ///
    /// Fails rather than returning a partial list when the server is still
    /// offering pages after [`MAX_MAPPING_PAGES`].
    async fn all_mappings_from(&self, concept_url: &str) -> ApiResult<Vec<ApiMapping>> {
        let mut mappings = Vec::new();
        let mut page = 1;
        loop {
            let current = self.list_mappings_from(concept_url, page).await?;
            mappings.extend(current.items);
            if current.next.is_none() {
                return Ok(mappings);
            }
            if page >= MAX_MAPPING_PAGES {
                warn!(concept_url, pages = page, "Mapping listing exceeds page limit");
                return Err(OclError::Other {
                    message: format!(
                        "Mappings of {concept_url} span more than {MAX_MAPPING_PAGES} pages"
                    ),
                });
            }
            page += 1;
        }
    }
}

/// Map a front-end dictionary path to the API path.
///
/// Dictionaries are shown under `/dictionaries/` but stored as collections.
#[must_use]
pub fn dictionary_api_url(path: &str) -> String {
    types::ensure_trailing_slash(&path.replace("/dictionaries/", "/collections/"))
}
