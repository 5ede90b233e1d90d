//! Engine configuration.
//!
//! Every setting has a default; environment variables (or any key/value
//! map) override them one key at a time:
//!
//! | key                    | default                     |
//! |------------------------|-----------------------------|
//! | `API_BASE_URL`         | `http://localhost:8000/api` |
//! | `API_TOKEN`            | unset                       |
//! | `DB_PATH`              | `estate_match.db`           |
//! | `CACHE_ENABLED`        | `true`                      |
//! | `CACHE_TTL_SECS`       | `300`                       |
//! | `REQUEST_TIMEOUT_SECS` | `10`                        |
//! | `MAX_RESULTS`          | `3`                         |
//! | `DEFAULT_THRESHOLD`    | `40`                        |
//! | `DEFAULT_STRATEGY`     | `comprehensive`             |

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use crate::core::{AcceptanceThreshold, RetrievalStrategy};
use crate::error::{EngineError, Result};

const KEYS: [&str; 9] = [
    "API_BASE_URL",
    "API_TOKEN",
    "DB_PATH",
    "CACHE_ENABLED",
    "CACHE_TTL_SECS",
    "REQUEST_TIMEOUT_SECS",
    "MAX_RESULTS",
    "DEFAULT_THRESHOLD",
    "DEFAULT_STRATEGY",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Marketplace backend, e.g. `http://localhost:8000/api`
    pub api_base_url: String,

    /// Bearer token for the backend
    pub api_token: Option<String>,

    /// SQLite candidate cache path (`:memory:` allowed)
    pub db_path: String,

    pub cache_enabled: bool,

    /// Cached candidate lists older than this are re-fetched
    pub cache_ttl_secs: u64,

    /// Backend request timeout
    pub request_timeout_secs: u64,

    /// Upper bound on returned similar listings
    pub max_results: usize,

    pub default_threshold: AcceptanceThreshold,
    pub default_strategy: RetrievalStrategy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000/api".to_string(),
            api_token: None,
            db_path: "estate_match.db".to_string(),
            cache_enabled: true,
            cache_ttl_secs: 300,
            request_timeout_secs: 10,
            max_results: 3,
            default_threshold: AcceptanceThreshold::default(),
            default_strategy: RetrievalStrategy::default(),
        }
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| EngineError::Config(format!("{}={:?}: {}", key, value, e)))
}

impl EngineConfig {
    /// Build from a key/value map, falling back to defaults per key
    pub fn from_map(values: &HashMap<String, String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(v) = values.get("API_BASE_URL") {
            config.api_base_url = v.trim().to_string();
        }
        if let Some(v) = values.get("API_TOKEN") {
            config.api_token = Some(v.trim().to_string()).filter(|t| !t.is_empty());
        }
        if let Some(v) = values.get("DB_PATH") {
            config.db_path = v.trim().to_string();
        }
        if let Some(v) = values.get("CACHE_ENABLED") {
            config.cache_enabled = parse_value("CACHE_ENABLED", v)?;
        }
        if let Some(v) = values.get("CACHE_TTL_SECS") {
            config.cache_ttl_secs = parse_value("CACHE_TTL_SECS", v)?;
        }
        if let Some(v) = values.get("REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = parse_value("REQUEST_TIMEOUT_SECS", v)?;
        }
        if let Some(v) = values.get("MAX_RESULTS") {
            config.max_results = parse_value("MAX_RESULTS", v)?;
        }
        if let Some(v) = values.get("DEFAULT_THRESHOLD") {
            let raw: u8 = parse_value("DEFAULT_THRESHOLD", v)?;
            config.default_threshold = AcceptanceThreshold::try_from(raw)?;
        }
        if let Some(v) = values.get("DEFAULT_STRATEGY") {
            config.default_strategy = v.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Build from process environment variables
    pub fn from_env() -> Result<Self> {
        let values: HashMap<String, String> = KEYS
            .iter()
            .filter_map(|key| std::env::var(key).ok().map(|v| (key.to_string(), v)))
            .collect();

        Self::from_map(&values)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_results == 0 {
            return Err(EngineError::Config("MAX_RESULTS must be at least 1".to_string()));
        }
        if self.api_base_url.is_empty() {
            return Err(EngineError::Config("API_BASE_URL must not be empty".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(EngineError::Config("REQUEST_TIMEOUT_SECS must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl std::fmt::Display for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "api={}, cache={} ({}s ttl), timeout={}s, max_results={}, threshold={}, strategy={}",
            self.api_base_url,
            if self.cache_enabled { self.db_path.as_str() } else { "off" },
            self.cache_ttl_secs,
            self.request_timeout_secs,
            self.max_results,
            self.default_threshold,
            self.default_strategy
        )
    }
}
