//! Configuration module

use std::env;

pub const DEFAULT_OTX_BASE_URL: &str = "https://otx.alienvault.com";
pub const DEFAULT_GENERATION_API_URL: &str = "https://api-inference.huggingface.co/models/gpt2";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: Option<String>,

    /// Max pooled database connections
    pub database_max_connections: u32,

    /// Server port
    pub port: u16,

    /// OTX feed API key
    pub otx_api_key: Option<String>,

    /// OTX API base URL
    pub otx_base_url: String,

    /// Text generation API key
    pub generation_api_key: Option<String>,

    /// Text generation endpoint
    pub generation_api_url: String,

    /// Max records returned by a tag match
    pub match_limit: i64,

    /// Timeout for upstream HTTP calls, none when unset
    pub upstream_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            database_max_connections: 10,
            port: 8080,
            otx_api_key: None,
            otx_base_url: DEFAULT_OTX_BASE_URL.to_string(),
            generation_api_key: None,
            generation_api_url: DEFAULT_GENERATION_API_URL.to_string(),
            match_limit: 5,
            upstream_timeout_secs: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            database_url: secret("DATABASE_URL"),

            database_max_connections: parsed("DATABASE_MAX_CONNECTIONS")
                .unwrap_or(defaults.database_max_connections),

            port: parsed("PORT").unwrap_or(defaults.port),

            otx_api_key: secret("OTX_API_KEY"),

            otx_base_url: env::var("OTX_BASE_URL").unwrap_or(defaults.otx_base_url),

            generation_api_key: secret("GENERATION_API_KEY"),

            generation_api_url: env::var("GENERATION_API_URL")
                .unwrap_or(defaults.generation_api_url),

            match_limit: parsed::<i64>("MATCH_LIMIT")
                .filter(|limit| *limit > 0)
                .unwrap_or(defaults.match_limit),

            upstream_timeout_secs: parsed("UPSTREAM_TIMEOUT_SECS"),
        }
    }

    /// Database URL with credentials stripped, for logging
    pub fn redacted_database_url(&self) -> &str {
        self.database_url
            .as_deref()
            .and_then(|url| url.split('@').last())
            .unwrap_or("***")
    }
}

/// Read a credential; blank values count as absent
fn secret(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
