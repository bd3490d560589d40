//! Integration test suite for ocl-dict
//!
//! End-to-end tests of the public API and the `ocl-dict` binary. Server behaviour is
//! simulated either with the in-memory `MockApi` (from the `test-utils` feature) or
//! with a `wiremock` HTTP server.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **cli**: The binary's argument handling, config commands and error output
//! - **concepts**: Adding concepts with their dependents, concurrent additions
//! - **dictionaries**: Create, retrieve and edit flows through the store
//! - **http**: The orchestrator over a real HTTP client against a mock server

mod cli;
mod concepts;
mod dictionaries;
mod http;
