//! Test utilities for ocl-dict
//!
//! Shared by unit tests and the integration suite (enable the `test-utils` feature):
//!
//! - [`MockApi`]: in-memory terminology server recording every call in order, with
//!   per-endpoint and per-URL failure injection
//! - Fixtures for dictionaries and mappings
//! - Once-only logging initialisation
//!
//! # Example
//!
//! ```rust,no_run
//! use ocl_dict::test_utils::{Endpoint, MockApi};
//!
//! let api = MockApi::new();
//! // run an operation against `api`, then
//! assert!(api.endpoints().iter().all(|e| *e != Endpoint::DeleteReferences));
//! ```

mod mock_api;

pub use mock_api::{ApiCall, Endpoint, MockApi, internal_mapping};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::api::{ApiDictionary, Dictionary, DictionaryExtras, Visibility};

static INIT_LOGGING: Once = Once::new();

/// Initialise logging for tests, once per process.
///
/// Uses `level` when given, otherwise `RUST_LOG`; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=ocl_dict=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

/// Owner used by the fixtures.
pub const TEST_OWNER_URL: &str = "/users/admin/";

/// Form values for a public "Malaria Clinic" dictionary owned by [`TEST_OWNER_URL`].
#[must_use]
pub fn sample_dictionary() -> Dictionary {
    Dictionary {
        name: "Malaria Clinic".to_string(),
        short_code: "MC".to_string(),
        description: "Concepts used at the malaria clinic".to_string(),
        default_locale: "en".to_string(),
        supported_locales: vec!["en".to_string(), "fr".to_string()],
        owner_url: TEST_OWNER_URL.to_string(),
        preferred_source: "CIEL".to_string(),
        public_access: Visibility::View,
    }
}

/// Stored dictionary `code` with linked `{code}Source` and `{code}Collection`.
#[must_use]
pub fn stored_dictionary(code: &str) -> ApiDictionary {
    ApiDictionary {
        id: code.to_string(),
        url: format!("{TEST_OWNER_URL}collections/{code}/"),
        short_code: Some(code.to_string()),
        name: format!("{code} Dictionary"),
        description: None,
        default_locale: Some("en".to_string()),
        supported_locales: vec!["en".to_string()],
        owner_url: Some(TEST_OWNER_URL.to_string()),
        preferred_source: Some("CIEL".to_string()),
        public_access: Some(Visibility::View),
        extras: Some(DictionaryExtras {
            source: Some(format!("{TEST_OWNER_URL}sources/{code}Source/")),
            collection: Some(format!("{TEST_OWNER_URL}collections/{code}Collection/")),
        }),
    }
}
