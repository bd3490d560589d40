//! Core types and error handling for ocl-dict
//!
//! This module holds the pieces every other module depends on: the [`OclError`] type
//! returned across the API seam, the [`ErrorContext`] wrapper used for CLI reporting,
//! and [`user_friendly_error`] which maps any `anyhow::Error` to a colored message with
//! a suggestion.

pub mod error;

pub use error::{ApiResult, ErrorContext, OclError, user_friendly_error};
