//! Global constants used throughout the ocl-dict codebase.
//!
//! API defaults, resource type labels written into created containers, and
//! retry parameters live here so the magic strings the server keys on are
//! discoverable in one place.

use std::time::Duration;

/// Default terminology server when no configuration overrides it.
pub const DEFAULT_API_URL: &str = "https://api.openconceptlab.org";

/// Source that bulk-added concept identifiers are looked up in.
///
/// The CIEL source is the reference dictionary most OpenMRS implementations
/// draw from, so raw identifiers are resolved against it unless configured
/// otherwise.
pub const CIEL_SOURCE_URL: &str = "/orgs/CIEL/sources/CIEL/";

/// Validation schema stamped on every container this client creates.
pub const CUSTOM_VALIDATION_SCHEMA: &str = "OpenMRS";

/// `source_type` of the private source backing a dictionary.
pub const OCL_SOURCE_TYPE: &str = "OCL Client Source";

/// `collection_type` of the private collection backing a dictionary.
pub const OCL_COLLECTION_TYPE: &str = "OCL Client Collection";

/// `collection_type` of the dictionary itself.
pub const OCL_DICTIONARY_TYPE: &str = "OCL Client Dictionary";

/// Default page size for paginated listings.
pub const DEFAULT_PAGE_LIMIT: u32 = 100;

/// Upper bound on pages followed for a single mapping listing.
///
/// Guards against a server that keeps returning a `next` header.
pub const MAX_MAPPING_PAGES: u32 = 50;

/// Default number of retries for idempotent GET requests.
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

/// Starting delay for exponential backoff on GET retries (100ms).
pub const STARTING_BACKOFF_DELAY_MS: u64 = 100;

/// Maximum backoff delay between GET retries (2s).
pub const MAX_BACKOFF_DELAY_MS: u64 = 2_000;

/// Default transport timeout for a single request (30 seconds).
pub fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}
