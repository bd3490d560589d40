//! Global configuration file handling.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::constants::{
    CIEL_SOURCE_URL, DEFAULT_API_URL, DEFAULT_PAGE_LIMIT, DEFAULT_RETRY_ATTEMPTS,
    default_request_timeout,
};

/// Environment variable overriding the config file location.
pub const ENV_CONFIG: &str = "OCL_CONFIG";
/// Environment variable overriding `api_url`.
pub const ENV_API_URL: &str = "OCL_API_URL";
/// Environment variable overriding `token`.
pub const ENV_API_TOKEN: &str = "OCL_API_TOKEN";

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_concepts_source_url() -> String {
    CIEL_SOURCE_URL.to_string()
}

const fn default_page_limit() -> u32 {
    DEFAULT_PAGE_LIMIT
}

const fn default_retry_attempts() -> u32 {
    DEFAULT_RETRY_ATTEMPTS
}

fn default_request_timeout_secs() -> u64 {
    default_request_timeout().as_secs()
}

/// User-wide settings for talking to a terminology server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Base URL of the terminology server
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// API token sent as `Authorization: Token <token>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Source that bare concept identifiers belong to
    #[serde(default = "default_concepts_source_url")]
    pub concepts_source_url: String,

    /// Map types that make the target concept a dependency; empty means all
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependency_map_types: Vec<String>,

    /// Follow retired mappings when resolving dependencies
    #[serde(default)]
    pub include_retired_mappings: bool,

    /// Page size for listings
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,

    /// Retries for idempotent GET requests
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Transport timeout per request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token: None,
            concepts_source_url: default_concepts_source_url(),
            dependency_map_types: Vec::new(),
            include_retired_mappings: false,
            page_limit: default_page_limit(),
            retry_attempts: default_retry_attempts(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl GlobalConfig {
    /// Load from the default location, or defaults when the file does not exist.
    pub async fn load() -> Result<Self> {
        Self::load_with_optional(None).await
    }

    /// Load from `path` when given, otherwise from `OCL_CONFIG` or the default location.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => Self::resolve_path()?,
        };
        if path.exists() {
            Self::load_from(&path).await
        } else {
            Ok(Self::default())
        }
    }

    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        // Owner read/write only: the file holds an API token
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let mut perms = fs::metadata(path)
                .await
                .with_context(|| format!("Failed to read permissions for {}", path.display()))?
                .permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms).await.with_context(|| {
                format!("Failed to set secure permissions on {}", path.display())
            })?;
        }

        Ok(())
    }

    /// `~/.ocl/config.toml`, or `%LOCALAPPDATA%\ocl\config.toml` on Windows.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("ocl")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(".ocl")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// `OCL_CONFIG` when set, otherwise [`default_path`](Self::default_path).
    pub fn resolve_path() -> Result<PathBuf> {
        match std::env::var_os(ENV_CONFIG) {
            Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
            _ => Self::default_path(),
        }
    }

    /// Apply `OCL_API_URL` and `OCL_API_TOKEN`.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(
            std::env::var(ENV_API_URL).ok(),
            std::env::var(ENV_API_TOKEN).ok(),
        )
    }

    /// Replace `api_url` and `token` with the given values when present and non-empty.
    #[must_use]
    pub fn with_overrides(mut self, api_url: Option<String>, token: Option<String>) -> Self {
        if let Some(api_url) = api_url.filter(|v| !v.trim().is_empty()) {
            self.api_url = api_url;
        }
        if let Some(token) = token.filter(|v| !v.trim().is_empty()) {
            self.token = Some(token);
        }
        self
    }

    /// Example written by `ocl-dict config init`.
    #[must_use]
    pub fn init_example() -> Self {
        Self {
            token: Some("YOUR_API_TOKEN".to_string()),
            ..Self::default()
        }
    }

    /// Copy safe to print: the token is masked.
    #[must_use]
    pub fn redacted(&self) -> Self {
        Self {
            token: self.token.as_ref().map(|token| mask_token(token)),
            ..self.clone()
        }
    }
}

fn mask_token(token: &str) -> String {
    let visible: String = token.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
    if token.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("****{visible}")
    }
}
