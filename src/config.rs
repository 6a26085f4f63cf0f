//! Configuration module for the episode harvester
//!
//! Handles loading environment variables and application configuration.

use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Base URL of the structured metadata API (primary source)
    pub metadata_api_url: String,
    /// API key for the structured metadata API, when configured
    pub metadata_api_key: Option<String>,
    /// Base URL of the enrichment API (secondary source)
    pub enrichment_api_url: String,
    /// API key for the enrichment API, when configured
    pub enrichment_api_key: Option<String>,
    /// Host of the content site the scrape adapter accepts URLs for
    pub content_host: String,
    /// Per-request timeout for network-bound adapter calls, in seconds
    pub request_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// API keys are opaque strings; the pipeline only distinguishes
    /// present from absent and never validates their format.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("PORT must be a valid number"),
            metadata_api_url: env::var("METADATA_API_URL")
                .unwrap_or_else(|_| "https://api.themoviedb.org/3".to_string()),
            metadata_api_key: env::var("METADATA_API_KEY").ok().filter(|k| !k.is_empty()),
            enrichment_api_url: env::var("ENRICHMENT_API_URL")
                .unwrap_or_else(|_| "https://www.omdbapi.com".to_string()),
            enrichment_api_key: env::var("ENRICHMENT_API_KEY").ok().filter(|k| !k.is_empty()),
            content_host: env::var("CONTENT_HOST")
                .unwrap_or_else(|_| "www.mxplayer.in".to_string()),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            metadata_api_url: "https://api.themoviedb.org/3".to_string(),
            metadata_api_key: None,
            enrichment_api_url: "https://www.omdbapi.com".to_string(),
            enrichment_api_key: None,
            content_host: "www.mxplayer.in".to_string(),
            request_timeout_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.metadata_api_key.is_none());
        assert!(config.enrichment_api_key.is_none());
    }
}
