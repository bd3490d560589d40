//! Configuration management for ocl-dict
//!
//! Settings come from three layers, later layers winning:
//!
//! 1. **Global configuration** (`~/.ocl/config.toml`, or `%LOCALAPPDATA%\ocl\config.toml`
//!    on Windows; `--config` / `OCL_CONFIG` point elsewhere)
//! 2. **Environment** (`OCL_API_URL`, `OCL_API_TOKEN`)
//! 3. **Command-line flags** (`--api-url`, `--token`)
//!
//! # Example
//!
//! ```toml
//! api_url = "https://api.openconceptlab.org"
//! token = "0123456789abcdef"
//! concepts_source_url = "/orgs/CIEL/sources/CIEL/"
//! dependency_map_types = ["Q-AND-A", "CONCEPT-SET"]
//! ```
//!
//! The file holds an API token, so it is written with owner-only permissions on Unix
//! and must never be committed.

pub mod global;

pub use global::{ENV_API_TOKEN, ENV_API_URL, ENV_CONFIG, GlobalConfig};
