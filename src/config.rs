//! Configuration file parser for ~/.config/newsman/config.toml.
//!
//! The config file is optional: a missing file yields `Config::default()`.
//! Unknown keys are accepted by serde but logged as warnings, since they are
//! usually typos. Environment variables override file values.
use crate::api::DEFAULT_PROCESS_PATH;
use crate::browser::DEFAULT_PAGE_SIZE;
use crate::util::{validate_base_url, UrlValidationError};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Backend used when nothing else is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000";

pub const ENV_API_BASE_URL: &str = "NEWSMAN_API_BASE_URL";
pub const ENV_AUTH_URL: &str = "NEWSMAN_AUTH_URL";
pub const ENV_AUTH_ANON_KEY: &str = "NEWSMAN_AUTH_ANON_KEY";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level application configuration.
///
/// Every field has a default, so any subset of keys may be given.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the news backend.
    pub api_base_url: String,

    /// Articles per page in the browser.
    pub articles_per_page: usize,

    /// Per-request timeout for backend and identity calls.
    pub request_timeout_secs: u64,

    /// Route prefix that triggers category processing.
    pub process_path: String,

    /// Theme variant name ("dark" or "light").
    pub theme: String,

    /// Identity service settings. Auth is disabled unless both are set.
    pub auth: AuthConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            articles_per_page: DEFAULT_PAGE_SIZE,
            request_timeout_secs: 30,
            process_path: DEFAULT_PROCESS_PATH.to_string(),
            theme: "dark".to_string(),
            auth: AuthConfig::default(),
        }
    }
}

/// `[auth]` table.
///
/// Custom Debug masks `anon_key` so it never reaches logs.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub url: Option<String>,
    pub anon_key: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("url", &self.url)
            .field("anon_key", &self.anon_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl AuthConfig {
    pub fn is_configured(&self) -> bool {
        self.url.as_deref().is_some_and(|u| !u.trim().is_empty())
            && self.anon_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 6] = [
        "api_base_url",
        "articles_per_page",
        "request_timeout_secs",
        "process_path",
        "theme",
        "auth",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing or blank file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)`
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(path = %path.display(), api = %config.api_base_url, "Loaded configuration");
        Ok(config)
    }

    /// Apply environment overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup. Empty values are ignored.
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_API_BASE_URL) {
            tracing::debug!(url = %url, "API base URL from environment");
            self.api_base_url = url;
        }
        if let Some(url) = get(ENV_AUTH_URL) {
            self.auth.url = Some(url);
        }
        if let Some(key) = get(ENV_AUTH_ANON_KEY) {
            self.auth.anon_key = Some(key);
        }
        self
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.articles_per_page == 0 {
            return Err(ConfigError::Invalid {
                key: "articles_per_page",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "request_timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        self.api_url()
            .map_err(|e| ConfigError::Invalid {
                key: "api_base_url",
                reason: e.to_string(),
            })?;
        Ok(())
    }

    pub fn api_url(&self) -> Result<Url, UrlValidationError> {
        validate_base_url(&self.api_base_url)
    }

    /// Identity service URL, or `None` when auth is not configured.
    pub fn auth_url(&self) -> Option<Result<Url, UrlValidationError>> {
        if !self.auth.is_configured() {
            return None;
        }
        self.auth.url.as_deref().map(validate_base_url)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// ============================================================================
// Tests
// ============================================================================
