//! ocl-dict - a client for building terminology dictionaries on Open Concept Lab
//!
//! A dictionary is a curated set of concept references kept in a collection, backed
//! by a private source and a private collection of its own. This crate creates and
//! edits those three resources as one operation, and adds concepts to a dictionary
//! together with every concept they depend on.
//!
//! # Architecture Overview
//!
//! - **API layer**: [`api::ResourceApi`] is the seam to the server; [`api::HttpApi`]
//!   talks HTTP with `reqwest`.
//! - **Store**: [`store::AppState`] records, per action, a loading flag, an ordered
//!   progress log and the failure (if any), and broadcasts every change.
//! - **Resolver**: [`resolver::DependentConceptResolver`] walks mappings breadth-first
//!   to find the transitive dependents of a set of concepts.
//! - **Orchestrator**: [`orchestrator::DictionaryOrchestrator`] runs the multi-step
//!   flows (create, edit, add concepts, retrieve) and reports into the store.
//! - **CLI**: [`cli`] wires configuration, the orchestrator and a progress spinner.
//!
//! # Core Modules
//!
//! - [`api`] - Resource API trait, HTTP client and wire types
//! - [`cli`] - Command-line interface
//! - [`config`] - Global configuration (`~/.ocl/config.toml`)
//! - [`constants`] - Server defaults and resource type names
//! - [`core`] - Error types and user-facing error rendering
//! - [`orchestrator`] - Container creation, editing and reference flows
//! - [`resolver`] - Dependent-concept resolution
//! - [`store`] - Per-action status store
//! - [`utils`] - Progress reporting
//!
//! # Example
//!
//! ```rust,no_run
//! use ocl_dict::api::{ConceptRef, HttpApi};
//! use ocl_dict::config::GlobalConfig;
//! use ocl_dict::orchestrator::DictionaryOrchestrator;
//! use ocl_dict::resolver::ResolverOptions;
//! use ocl_dict::store::AppState;
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = GlobalConfig::load().await?;
//! let api = Arc::new(HttpApi::from_config(&config)?);
//! let orchestrator =
//!     DictionaryOrchestrator::new(api, AppState::shared(), ResolverOptions::from_config(&config));
//!
//! let concepts = [ConceptRef::from_id(&config.concepts_source_url, "1234")];
//! let added = orchestrator
//!     .add_concepts_to_collection("/users/admin/collections/MC/", &concepts, false)
//!     .await;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod orchestrator;
pub mod resolver;
pub mod store;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
