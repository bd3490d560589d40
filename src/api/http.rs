//! `reqwest` implementation of [`ResourceApi`].
//!
//! Reads are retried on transient failures with exponential backoff; writes are sent
//! exactly once, since a retried POST could create a second resource.

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tokio_retry::RetryIf;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::{debug, warn};

use super::types::{
    ApiCollection, ApiDictionary, ApiDictionaryVersion, ApiMapping, ApiSource,
    EditableContainerFields, ListQuery, NewCollection, NewDictionary, NewSource, Page,
    ReferenceResult, ensure_trailing_slash,
};
use super::ResourceApi;
use crate::config::GlobalConfig;
use crate::constants::{
    CUSTOM_VALIDATION_SCHEMA, DEFAULT_PAGE_LIMIT, DEFAULT_RETRY_ATTEMPTS, MAX_BACKOFF_DELAY_MS,
    STARTING_BACKOFF_DELAY_MS, default_request_timeout,
};
use crate::core::{ApiResult, OclError};

/// Terminology server client over HTTP.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
    token: Option<String>,
    page_limit: u32,
    retry_attempts: u32,
}

impl HttpApi {
    /// Client for `base_url` with default timeout, page size and retries.
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> ApiResult<Self> {
        Self::with_timeout(base_url, token, default_request_timeout())
    }

    /// Client whose every request times out after `timeout`.
    pub fn with_timeout(
        base_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> ApiResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let client = Client::builder().default_headers(headers).timeout(timeout).build().map_err(
            |e| OclError::ConfigError {
                message: format!("Failed to create HTTP client: {e}"),
            },
        )?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
            page_limit: DEFAULT_PAGE_LIMIT,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
        })
    }

    /// Client configured from the global config file.
    pub fn from_config(config: &GlobalConfig) -> ApiResult<Self> {
        Ok(Self::with_timeout(
            config.api_url.clone(),
            config.token.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )?
        .with_page_limit(config.page_limit)
        .with_retry_attempts(config.retry_attempts))
    }

    #[must_use]
    pub const fn with_page_limit(mut self, page_limit: u32) -> Self {
        self.page_limit = page_limit;
        self
    }

    #[must_use]
    pub const fn with_retry_attempts(mut self, retry_attempts: u32) -> Self {
        self.retry_attempts = retry_attempts;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a server-relative resource path.
    fn resolve(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.header(header::AUTHORIZATION, format!("Token {token}")),
            None => builder,
        }
    }

    async fn check_status(url: &str, response: Response) -> ApiResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let payload = response.json::<serde_json::Value>().await.ok();
        warn!(%url, status = status.as_u16(), "Request failed");
        Err(OclError::ApiStatus {
            status: status.as_u16(),
            url: url.to_string(),
            payload,
        })
    }

    async fn decode<T: DeserializeOwned>(url: &str, response: Response) -> ApiResult<T> {
        response.json::<T>().await.map_err(|e| OclError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    fn network_error(url: &str, error: &reqwest::Error) -> OclError {
        OclError::Network {
            url: url.to_string(),
            reason: error.to_string(),
        }
    }

    /// GET with retries; returns the decoded body and the `next` header.
    async fn get<T: DeserializeOwned + Send>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<(T, Option<String>)> {
        let url = self.resolve(path);
        // from_millis(2) doubles each attempt; factor scales the first delay
        let strategy = ExponentialBackoff::from_millis(2)
            .factor(STARTING_BACKOFF_DELAY_MS / 2)
            .max_delay(Duration::from_millis(MAX_BACKOFF_DELAY_MS))
            .take(self.retry_attempts as usize);

        let url_ref = url.as_str();
        RetryIf::start(
            strategy,
            || async move {
                debug!(url = url_ref, "GET");
                let response = self
                    .request(Method::GET, url_ref)
                    .query(query)
                    .send()
                    .await
                    .map_err(|e| Self::network_error(url_ref, &e))?;
                let response = Self::check_status(url_ref, response).await?;
                let next = next_page_header(response.headers());
                let body = Self::decode::<T>(url_ref, response).await?;
                Ok((body, next))
            },
            |e: &OclError| {
                if e.is_transient() {
                    debug!(%url, error = %e, "Retrying GET");
                }
                e.is_transient()
            },
        )
        .await
    }

    /// Single-shot write with a JSON body.
    async fn write<B, T>(&self, method: Method, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned + Send,
    {
        let url = self.resolve(path);
        debug!(%url, %method, "Write");
        let response = self
            .request(method, &url)
            .json(body)
            .send()
            .await
            .map_err(|e| Self::network_error(&url, &e))?;
        let response = Self::check_status(&url, response).await?;
        Self::decode(&url, response).await
    }
}

/// The server paginates with a `next` header holding the following page URL.
///
/// Some deployments send the literal string `None` on the last page.
fn next_page_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get("next")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty() && *value != "None")
        .map(str::to_string)
}

#[async_trait]
impl ResourceApi for HttpApi {
    async fn create_source(&self, owner_url: &str, source: &NewSource) -> ApiResult<ApiSource> {
        let path = format!("{}sources/", ensure_trailing_slash(owner_url));
        self.write(Method::POST, &path, source).await
    }

    async fn create_collection(
        &self,
        owner_url: &str,
        collection: &NewCollection,
    ) -> ApiResult<ApiCollection> {
        let path = format!("{}collections/", ensure_trailing_slash(owner_url));
        self.write(Method::POST, &path, collection).await
    }

    async fn create_dictionary(
        &self,
        owner_url: &str,
        dictionary: &NewDictionary,
    ) -> ApiResult<ApiDictionary> {
        let path = format!("{}collections/", ensure_trailing_slash(owner_url));
        self.write(Method::POST, &path, dictionary).await
    }

    async fn update_source(
        &self,
        source_url: &str,
        fields: &EditableContainerFields,
    ) -> ApiResult<ApiSource> {
        self.write(Method::PUT, source_url, fields).await
    }

    async fn update_collection(
        &self,
        collection_url: &str,
        fields: &EditableContainerFields,
    ) -> ApiResult<ApiCollection> {
        self.write(Method::PUT, collection_url, fields).await
    }

    async fn update_dictionary(
        &self,
        dictionary_url: &str,
        fields: &EditableContainerFields,
    ) -> ApiResult<ApiDictionary> {
        self.write(Method::PUT, dictionary_url, fields).await
    }

    async fn retrieve_dictionary(&self, dictionary_url: &str) -> ApiResult<ApiDictionary> {
        let query = [("verbose", "true".to_string())];
        self.get(dictionary_url, &query).await.map(|(body, _)| body)
    }

    async fn retrieve_source(&self, source_url: &str) -> ApiResult<ApiSource> {
        self.get(source_url, &[]).await.map(|(body, _)| body)
    }

    async fn retrieve_collection(&self, collection_url: &str) -> ApiResult<ApiCollection> {
        self.get(collection_url, &[]).await.map(|(body, _)| body)
    }

    async fn retrieve_dictionary_versions(
        &self,
        dictionary_url: &str,
    ) -> ApiResult<Vec<ApiDictionaryVersion>> {
        let path = format!("{}versions/", ensure_trailing_slash(dictionary_url));
        let query = [("verbose", "true".to_string())];
        self.get(&path, &query).await.map(|(body, _)| body)
    }

    async fn list_dictionaries(
        &self,
        collections_url: &str,
        query: &ListQuery,
    ) -> ApiResult<Page<ApiDictionary>> {
        let params = [
            ("q", query.q.clone()),
            ("limit", query.limit.to_string()),
            ("page", query.page.to_string()),
            ("customValidationSchema", CUSTOM_VALIDATION_SCHEMA.to_string()),
            ("verbose", "true".to_string()),
        ];
        let (items, next) = self.get(collections_url, &params).await?;
        Ok(Page {
            items,
            next,
        })
    }

    async fn list_mappings_from(&self, concept_url: &str, page: u32) -> ApiResult<Page<ApiMapping>> {
        let path = format!("{}mappings/", ensure_trailing_slash(concept_url));
        let params = [("limit", self.page_limit.to_string()), ("page", page.to_string())];
        let (items, next) = self.get(&path, &params).await?;
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
        let path = format!("{}references/", ensure_trailing_slash(collection_url));
        let body = json!({ "data": { "expressions": expressions } });
        self.write(Method::PUT, &path, &body).await
    }

    async fn delete_references(
        &self,
        collection_url: &str,
        expressions: &[String],
    ) -> ApiResult<()> {
        let path = format!("{}references/", ensure_trailing_slash(collection_url));
        let url = self.resolve(&path);
        debug!(%url, count = expressions.len(), "DELETE references");
        let response = self
            .request(Method::DELETE, &url)
            .json(&json!({ "references": expressions }))
            .send()
            .await
            .map_err(|e| Self::network_error(&url, &e))?;
        Self::check_status(&url, response).await?;
        Ok(())
    }
}
