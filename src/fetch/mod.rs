//! HTTP fetch module shared by the network-bound source adapters
//!
//! Provides a client with explicit timeouts, retry with exponential
//! backoff on transient upstream failures, and browser-like headers for
//! content-page fetches. All expected failure modes surface as structured
//! [`AdapterError`] values rather than bare exceptions.

use rand::Rng;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;

/// Errors a source adapter can fail with.
///
/// Individual adapter failures are absorbed by the orchestrator and
/// logged with tier identity; they never abort the overall pipeline.
#[derive(Error, Debug)]
pub enum AdapterError {
    /// The requested resource does not exist upstream
    #[error("Resource not found upstream")]
    NotFound,

    /// Rate limited by the upstream service
    #[error("Rate limited, retry after delay")]
    RateLimited,

    /// The response arrived but could not be decoded into the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Network-level failure (connection refused, DNS, non-success status)
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The request did not complete within the configured timeout
    #[error("Request timed out after {0}s")]
    Timeout(u64),
}

/// Configuration for the fetch client
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Total per-request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum retries on transient failures (429, 5xx)
    pub max_retries: u32,
    /// Base delay for exponential backoff in milliseconds
    pub backoff_base_ms: u64,
    /// Whether to rotate user agents on content-page fetches
    pub rotate_user_agent: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 3,
            backoff_base_ms: 1000,
            rotate_user_agent: true,
        }
    }
}

/// Realistic user agents for content-page fetches
const USER_AGENTS: &[&str] = &[
    // Chrome on Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    // Chrome on macOS
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    // Firefox on Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    // Safari on macOS
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
];

/// HTTP client shared by the primary, secondary, and scrape adapters
#[derive(Debug)]
pub struct FetchClient {
    client: Client,
    config: FetchConfig,
}

impl Default for FetchClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchClient {
    /// Create a new client with default configuration
    pub fn new() -> Self {
        Self::with_config(FetchConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: FetchConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        Self { client, config }
    }

    /// The configured per-request timeout in seconds
    pub fn timeout_secs(&self) -> u64 {
        self.config.timeout_secs
    }

    /// Pick a user agent for a content-page fetch
    fn get_user_agent(&self) -> &'static str {
        if self.config.rotate_user_agent {
            let idx = rand::thread_rng().gen_range(0..USER_AGENTS.len());
            USER_AGENTS[idx]
        } else {
            USER_AGENTS[0]
        }
    }

    /// Apply exponential backoff delay with jitter
    async fn apply_backoff(&self, attempt: u32) {
        let delay = self.config.backoff_base_ms * 2u64.pow(attempt);
        let jitter = rand::thread_rng().gen_range(0..500);
        sleep(Duration::from_millis(delay + jitter)).await;
    }

    /// Fetch a JSON document, retrying transient upstream failures
    pub async fn fetch_json(&self, url: &str) -> Result<serde_json::Value, AdapterError> {
        let body = self.fetch_with_retries(url, false).await?;
        serde_json::from_str(&body).map_err(|e| AdapterError::MalformedResponse(e.to_string()))
    }

    /// Fetch an HTML page with browser-like headers, retrying transient
    /// upstream failures
    pub async fn fetch_html(&self, url: &str) -> Result<String, AdapterError> {
        self.fetch_with_retries(url, true).await
    }

    async fn fetch_with_retries(&self, url: &str, as_browser: bool) -> Result<String, AdapterError> {
        let mut last_error = None;

        for attempt in 0..self.config.max_retries {
            if attempt > 0 {
                self.apply_backoff(attempt).await;
            }

            match self.do_fetch(url, as_browser).await {
                Ok(body) => return Ok(body),
                Err(AdapterError::RateLimited) => {
                    tracing::warn!("Rate limited on attempt {}, backing off...", attempt + 1);
                    last_error = Some(AdapterError::RateLimited);
                    continue;
                }
                Err(AdapterError::NetworkError(msg)) if msg.starts_with("Server returned status 5") => {
                    tracing::warn!("{} on attempt {}, retrying...", msg, attempt + 1);
                    last_error = Some(AdapterError::NetworkError(msg));
                    continue;
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error
            .unwrap_or_else(|| AdapterError::NetworkError("Max retries exceeded".to_string())))
    }

    async fn do_fetch(&self, url: &str, as_browser: bool) -> Result<String, AdapterError> {
        let mut request = self.client.get(url);

        if as_browser {
            request = request
                .header("User-Agent", self.get_user_agent())
                .header(
                    "Accept",
                    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
                )
                .header("Accept-Language", "en-US,en;q=0.9,hi;q=0.8")
                .header("Upgrade-Insecure-Requests", "1");
        } else {
            request = request.header("Accept", "application/json");
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                AdapterError::Timeout(self.config.timeout_secs)
            } else if e.is_connect() {
                AdapterError::NetworkError("Failed to connect to server".to_string())
            } else {
                AdapterError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status();
        match status {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => return Err(AdapterError::NotFound),
            StatusCode::TOO_MANY_REQUESTS => return Err(AdapterError::RateLimited),
            _ => {
                return Err(AdapterError::NetworkError(format!(
                    "Server returned status {}",
                    status.as_u16()
                )))
            }
        }

        response
            .text()
            .await
            .map_err(|e| AdapterError::MalformedResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = FetchClient::new();
        assert_eq!(client.timeout_secs(), 30);
    }

    #[test]
    fn test_client_with_config() {
        let config = FetchConfig {
            timeout_secs: 10,
            max_retries: 5,
            backoff_base_ms: 2000,
            rotate_user_agent: false,
        };
        let client = FetchClient::with_config(config);
        assert_eq!(client.timeout_secs(), 10);
        assert_eq!(client.config.max_retries, 5);
    }

    #[test]
    fn test_user_agent_comes_from_list() {
        let client = FetchClient::new();
        assert!(USER_AGENTS.contains(&client.get_user_agent()));
    }

    #[test]
    fn test_fixed_user_agent_without_rotation() {
        let client = FetchClient::with_config(FetchConfig {
            rotate_user_agent: false,
            ..FetchConfig::default()
        });
        assert_eq!(client.get_user_agent(), USER_AGENTS[0]);
    }

    #[test]
    fn test_default_config() {
        let config = FetchConfig::default();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.max_retries, 3);
        assert!(config.rotate_user_agent);
    }

    #[test]
    fn test_adapter_error_display() {
        assert_eq!(
            format!("{}", AdapterError::Timeout(30)),
            "Request timed out after 30s"
        );
        assert_eq!(
            format!("{}", AdapterError::NotFound),
            "Resource not found upstream"
        );
    }
}
