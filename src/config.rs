//! Connection configuration

use serde::{Deserialize, Serialize};

/// Environment variable overriding the store URL.
pub const URL_ENV: &str = "REDIS_URL";

/// Address the facade connects to when nothing else is configured.
pub const DEFAULT_URL: &str = "redis://127.0.0.1:6379/";

/// Store connection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
        }
    }
}

impl StoreConfig {
    /// Configuration pointing at `url`.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Read the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(URL_ENV) {
            Some(url) if !url.trim().is_empty() => Self::with_url(url.trim()),
            _ => Self::default(),
        }
    }
}
