//! Fetcher configuration

use std::env;
use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::DataError;

/// Default backend address for relative request paths
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Load a `.env` file if present
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    env_opt(key).unwrap_or_else(|| default.to_string())
}

/// HTTP settings shared by the data fetcher and the page client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Prefix for relative request paths such as `/api/core/page/1`
    pub base_url: String,

    pub timeout_secs: u64,

    /// Sent with every request; per-binding headers win on conflict
    #[serde(default)]
    pub default_headers: IndexMap<String, String>,

    /// Sent as `Authorization: Bearer <token>` when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            default_headers: IndexMap::new(),
            auth_token: None,
        }
    }
}

impl FetcherConfig {
    /// Read `DASH_API_BASE_URL`, `DASH_API_TIMEOUT_SECS` and `DASH_API_TOKEN`
    pub fn from_env() -> Result<Self, DataError> {
        let timeout_secs = match env_opt("DASH_API_TIMEOUT_SECS") {
            Some(raw) => raw.parse().map_err(|_| {
                DataError::Config(format!("DASH_API_TIMEOUT_SECS must be a whole number of seconds, got {raw:?}"))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let config = Self {
            base_url: env_or("DASH_API_BASE_URL", DEFAULT_BASE_URL),
            timeout_secs,
            default_headers: IndexMap::new(),
            auth_token: env_opt("DASH_API_TOKEN"),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check the base URL and timeout
    pub fn validate(&self) -> Result<(), DataError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(DataError::InvalidUrl(self.base_url.clone()));
        }
        if self.timeout_secs == 0 {
            return Err(DataError::Config("timeout must be at least one second".to_string()));
        }
        Ok(())
    }

    /// Resolve `url` against the base URL; absolute URLs pass through
    pub fn resolve_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            return url.to_string();
        }

        let base = self.base_url.trim_end_matches('/');
        if url.starts_with('/') {
            format!("{base}{url}")
        } else {
            format!("{base}/{url}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_url() {
        let config = FetcherConfig::default().with_base_url("https://api.example.com/");
        assert_eq!(
            config.resolve_url("/api/core/page/7"),
            "https://api.example.com/api/core/page/7"
        );
        assert_eq!(config.resolve_url("metrics"), "https://api.example.com/metrics");
        assert_eq!(
            config.resolve_url("http://other.host/x"),
            "http://other.host/x"
        );
    }

    #[test]
    fn test_validate() {
        assert!(FetcherConfig::default().validate().is_ok());
        assert!(matches!(
            FetcherConfig::default().with_base_url("localhost:8000").validate(),
            Err(DataError::InvalidUrl(_))
        ));

        let config = FetcherConfig {
            timeout_secs: 0,
            ..FetcherConfig::default()
        };
        assert!(matches!(config.validate(), Err(DataError::Config(_))));
    }
}
