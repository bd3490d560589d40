//! Error handling for ocl-dict
//!
//! This module provides the error type shared by the API client, the resolver and the
//! orchestrated flows, plus user-friendly error reporting for the CLI. The design follows
//! two principles:
//! 1. **Strongly-typed errors** at the API seam, so callers match on a failure variant
//!    instead of probing a response for truthiness
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`OclError`] - Enumerated error types for every failure case
//! - [`ErrorContext`] - Wrapper that adds user-friendly details and suggestions
//! - [`ApiResult`] - Result alias returned by every [`ResourceApi`](crate::api::ResourceApi)
//!   endpoint
//!
//! # Error Categories
//!
//! - **Remote API**: [`OclError::ApiStatus`], [`OclError::Network`], [`OclError::Decode`]
//! - **Dictionary state**: [`OclError::MissingLinkedResource`]
//! - **Input**: [`OclError::NoConceptIds`]
//! - **Configuration**: [`OclError::ConfigError`], [`OclError::TomlError`]
//!
//! # Examples
//!
//! ```rust,no_run
//! use ocl_dict::core::{OclError, ErrorContext, user_friendly_error};
//!
//! let error = OclError::Network {
//!     url: "https://api.openconceptlab.org/users/admin/".to_string(),
//!     reason: "connection refused".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display(); // Shows colored error with suggestions
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// Result type returned by remote API endpoints.
pub type ApiResult<T> = Result<T, OclError>;

/// The main error type for ocl-dict operations
///
/// Each variant carries enough context (URL, HTTP status, remote payload) for the
/// orchestrator to record a meaningful failure in the store and for the CLI to
/// suggest a fix.
#[derive(Error, Debug)]
pub enum OclError {
    /// The server answered with a non-2xx status
    ///
    /// # Fields
    /// - `status`: HTTP status code
    /// - `url`: The request URL
    /// - `payload`: Decoded error body, when the server sent JSON
    #[error("Request to {url} failed with HTTP {status}")]
    ApiStatus {
        /// HTTP status code returned by the server
        status: u16,
        /// The request URL
        url: String,
        /// Error body returned by the server, if it was JSON
        payload: Option<serde_json::Value>,
    },

    /// The request never produced a response (DNS, connect, TLS, timeout)
    #[error("Network error contacting {url}: {reason}")]
    Network {
        /// The request URL
        url: String,
        /// Transport error description
        reason: String,
    },

    /// The response body did not match the expected shape
    #[error("Unexpected response from {url}: {reason}")]
    Decode {
        /// The request URL
        url: String,
        /// Decoder error description
        reason: String,
    },

    /// A dictionary is missing the URL of one of its backing resources
    ///
    /// Dictionaries record their private source and collection in `extras`. Editing a
    /// dictionary created outside this client (or by an older version) fails with this
    /// error because there is nothing to update.
    #[error("Dictionary {dictionary} has no linked {field} in its extras")]
    MissingLinkedResource {
        /// URL of the dictionary
        dictionary: String,
        /// Missing extras field (`source` or `collection`)
        field: String,
    },

    /// No concept identifiers were supplied
    #[error("No concept identifiers were provided")]
    NoConceptIds,

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
    },
}

impl OclError {
    /// HTTP status of the failure, if the server answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::ApiStatus {
                status,
                ..
            } => Some(*status),
            _ => None,
        }
    }

    /// Remote error payload, if the server sent one.
    #[must_use]
    pub const fn payload(&self) -> Option<&serde_json::Value> {
        match self {
            Self::ApiStatus {
                payload,
                ..
            } => payload.as_ref(),
            _ => None,
        }
    }

    /// URL of the request that failed, for transport and server failures.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::ApiStatus {
                url,
                ..
            }
            | Self::Network {
                url,
                ..
            }
            | Self::Decode {
                url,
                ..
            } => Some(url),
            _ => None,
        }
    }

    /// Whether retrying the same request could succeed.
    ///
    /// Only transport failures and 5xx answers qualify.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Network {
                ..
            } => true,
            Self::ApiStatus {
                status,
                ..
            } => *status >= 500,
            _ => false,
        }
    }
}

impl Clone for OclError {
    fn clone(&self) -> Self {
        match self {
            Self::ApiStatus {
                status,
                url,
                payload,
            } => Self::ApiStatus {
                status: *status,
                url: url.clone(),
                payload: payload.clone(),
            },
            Self::Network {
                url,
                reason,
            } => Self::Network {
                url: url.clone(),
                reason: reason.clone(),
            },
            Self::Decode {
                url,
                reason,
            } => Self::Decode {
                url: url.clone(),
                reason: reason.clone(),
            },
            Self::MissingLinkedResource {
                dictionary,
                field,
            } => Self::MissingLinkedResource {
                dictionary: dictionary.clone(),
                field: field.clone(),
            },
            Self::NoConceptIds => Self::NoConceptIds,
            Self::ConfigError {
                message,
            } => Self::ConfigError {
                message: message.clone(),
            },
            // io::Error and toml errors are not Clone; keep their message
            Self::IoError(e) => Self::Other {
                message: format!("IO error: {e}"),
            },
            Self::TomlError(e) => Self::Other {
                message: format!("TOML parsing error: {e}"),
            },
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

/// Error context wrapper that provides user-friendly error information
///
/// Pairs an [`OclError`] with optional details (why it happened) and a suggestion
/// (what to do about it). Rendered with colors by [`display`](Self::display).
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: OclError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: OclError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    ///
    /// - Error message: Red and bold
    /// - Details: Yellow
    /// - Suggestion: Green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into a user-friendly [`ErrorContext`]
///
/// Known [`OclError`] variants get tailored suggestions; IO and TOML errors are mapped
/// onto configuration problems; anything else is reported with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(ocl_error) = error.downcast_ref::<OclError>() {
        return create_error_context(ocl_error.clone());
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(OclError::ConfigError {
            message: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax of your config file, or regenerate it with 'ocl-dict config init --force'")
        .with_details("The configuration file could not be parsed");
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        if io_error.kind() == std::io::ErrorKind::PermissionDenied {
            return ErrorContext::new(OclError::ConfigError {
                message: io_error.to_string(),
            })
            .with_suggestion("Check the ownership and permissions of ~/.ocl/config.toml")
            .with_details("ocl-dict could not read or write its configuration file");
        }
    }

    // Generic error - include the full error chain for better diagnostics
    let mut message = error.to_string();

    let chain: Vec<String> = error
        .chain()
        .skip(1) // Skip the root cause which is already in to_string()
        .map(std::string::ToString::to_string)
        .collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(OclError::Other {
        message,
    })
}

fn create_error_context(error: OclError) -> ErrorContext {
    match &error {
        OclError::ApiStatus {
            status,
            payload,
            ..
        } => {
            let suggestion = match status {
                401 => "Set an API token with '--token', OCL_API_TOKEN, or the 'token' field in ~/.ocl/config.toml",
                403 => "Your account does not have permission for this resource. Check the owner URL and your organisation membership",
                404 => "Check the resource URL. Dictionary URLs look like /users/<user>/collections/<code>/",
                409 => "A resource with this short code already exists under the owner. Choose a different short code",
                s if *s >= 500 => "The terminology server failed. Try again later",
                _ => "Check the values you supplied against the server's validation rules",
            };
            let ctx = ErrorContext::new(error.clone()).with_suggestion(suggestion);
            match payload {
                Some(payload) => ctx.with_details(format!("Server response: {payload}")),
                None => ctx,
            }
        }

        OclError::Network {
            ..
        } => ErrorContext::new(error.clone())
            .with_suggestion("Check your internet connection and the configured api_url ('ocl-dict config show')")
            .with_details("The request did not reach the terminology server or timed out"),

        OclError::MissingLinkedResource {
            ..
        } => ErrorContext::new(error.clone())
            .with_suggestion("Only dictionaries created with ocl-dict can be edited; their extras record the backing source and collection")
            .with_details("Editing updates the dictionary's private source and collection before the dictionary itself"),

        OclError::NoConceptIds => ErrorContext::new(error.clone())
            .with_suggestion("Pass concept IDs as arguments or with --file; IDs may be separated by spaces, commas or new lines"),

        _ => ErrorContext::new(error),
    }
}
