//! Data models for the episode harvester
//!
//! This module contains the canonical episode entities produced by the
//! pipeline, the request/response wrappers used by the HTTP surface, and
//! the raw intermediate shapes passed between adapters and the normalizer.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Untyped record as produced by a source adapter, before normalization.
///
/// The same logical field may appear under several key spellings depending
/// on which adapter produced the record; the normalizer resolves them
/// through its alias tables. Created per adapter invocation, consumed
/// immediately, never persisted.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Which tier supplied an episode's description.
///
/// Display and debugging only; never used as a sort key.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum DescriptionSource {
    /// Structured metadata API (season payload)
    Primary,
    /// Enrichment API, joined in by episode number
    Secondary,
    /// Scraped from a content page
    Tertiary,
    /// Pasted by the user
    Manual,
}

/// Canonical episode record, the output unit of the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    /// Season this episode belongs to (1-based)
    pub season_number: u32,
    /// Episode number within the season (1-based); the assembler's sort
    /// and dedup key
    pub episode_number: u32,
    /// Episode title; defaults to "Episode {episodeNumber}" when absent
    pub title: String,
    /// Episode description; may be empty, never null
    pub overview: String,
    /// Air date as an ISO calendar date, when one could be parsed
    pub air_date: Option<NaiveDate>,
    /// Runtime in whole minutes; the assembler fills missing values with
    /// the season average
    pub runtime_minutes: Option<u32>,
    /// Which tier supplied the description
    pub description_source: DescriptionSource,
}

impl Episode {
    /// The default title used when a source provides none.
    pub fn default_title(episode_number: u32) -> String {
        format!("Episode {}", episode_number)
    }
}

/// The season-scoped, sorted, deduplicated result handed to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeSet {
    /// Season number the episodes belong to
    pub season_number: u32,
    /// Episodes sorted ascending by episode number, unique per number
    pub episodes: Vec<Episode>,
    /// Number of episodes after deduplication
    pub episode_count: usize,
    /// Non-fatal problems encountered while building the set (dropped
    /// duplicates, unparsable dates/runtimes)
    pub warnings: Vec<String>,
}

/// Which adapter chain the orchestrator should run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    /// Structured metadata API, with optional enrichment backfill
    Api,
    /// Content-page HTML extraction
    Scrape,
    /// User-pasted text
    Manual,
}

impl SourceMode {
    /// Whether this mode supports secondary enrichment of blank
    /// descriptions.
    pub fn supports_enrichment(&self) -> bool {
        matches!(self, SourceMode::Api)
    }
}

/// What an adapter should fetch or parse.
///
/// Owned by the caller, passed by reference, never mutated by the
/// pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocator {
    /// Numeric or opaque content identifier for an API adapter
    ContentId(String),
    /// Fully-qualified content-page URL for the scrape adapter
    Url(String),
    /// Raw pasted text for the manual adapter
    Text(String),
}

impl SourceLocator {
    /// The raw string behind the locator, whatever its variant.
    pub fn as_str(&self) -> &str {
        match self {
            SourceLocator::ContentId(s) | SourceLocator::Url(s) | SourceLocator::Text(s) => s,
        }
    }
}

/// Request body for the episode fetch endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FetchRequest {
    /// Adapter chain to run
    pub mode: SourceMode,
    /// Content id, content-page URL, or pasted text depending on mode
    pub locator: String,
    /// Season to fetch (1-based)
    pub season: u32,
    /// External cross-reference id for enrichment (api mode only)
    pub enrichment_id: Option<String>,
}

/// Generic API response wrapper for successful responses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    /// Whether the operation was successful (always true for this type)
    pub success: bool,
    /// The response payload
    pub data: T,
    /// ISO timestamp of when data was fetched
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    /// Create a new successful API response with the current timestamp
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    /// Create a new successful API response with a custom timestamp
    pub fn with_timestamp(data: T, timestamp: DateTime<Utc>) -> Self {
        Self {
            success: true,
            data,
            timestamp: timestamp.to_rfc3339(),
        }
    }
}

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Whether the operation was successful (always false for errors)
    pub success: bool,
    /// Error message describing what went wrong
    pub error: String,
    /// ISO timestamp of when the error occurred
    pub timestamp: String,
}

impl ApiError {
    /// Create a new API error response with the current timestamp
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_episode_serialization_camel_case() {
        let episode = Episode {
            season_number: 1,
            episode_number: 3,
            title: "The Message".to_string(),
            overview: "A letter arrives.".to_string(),
            air_date: NaiveDate::from_ymd_opt(2019, 4, 23),
            runtime_minutes: Some(22),
            description_source: DescriptionSource::Primary,
        };

        let json = serde_json::to_string(&episode).unwrap();
        assert!(json.contains("\"seasonNumber\":1"));
        assert!(json.contains("\"episodeNumber\":3"));
        assert!(json.contains("\"airDate\":\"2019-04-23\""));
        assert!(json.contains("\"runtimeMinutes\":22"));
        assert!(json.contains("\"descriptionSource\":\"PRIMARY\""));
    }

    #[test]
    fn test_description_source_uppercase_values() {
        assert_eq!(
            serde_json::to_string(&DescriptionSource::Secondary).unwrap(),
            "\"SECONDARY\""
        );
        assert_eq!(
            serde_json::to_string(&DescriptionSource::Tertiary).unwrap(),
            "\"TERTIARY\""
        );
        assert_eq!(
            serde_json::to_string(&DescriptionSource::Manual).unwrap(),
            "\"MANUAL\""
        );
    }

    #[test]
    fn test_source_mode_roundtrip() {
        for mode in [SourceMode::Api, SourceMode::Scrape, SourceMode::Manual] {
            let json = serde_json::to_string(&mode).unwrap();
            let back: SourceMode = serde_json::from_str(&json).unwrap();
            assert_eq!(mode, back);
        }
    }

    #[test]
    fn test_only_api_mode_supports_enrichment() {
        assert!(SourceMode::Api.supports_enrichment());
        assert!(!SourceMode::Scrape.supports_enrichment());
        assert!(!SourceMode::Manual.supports_enrichment());
    }

    #[test]
    fn test_default_title() {
        assert_eq!(Episode::default_title(7), "Episode 7");
    }

    #[test]
    fn test_fetch_request_deserialization() {
        let body = r#"{"mode":"api","locator":"12345","season":2,"enrichmentId":"tt0903747"}"#;
        let request: FetchRequest = serde_json::from_str(body).unwrap();
        assert_eq!(request.mode, SourceMode::Api);
        assert_eq!(request.locator, "12345");
        assert_eq!(request.season, 2);
        assert_eq!(request.enrichment_id.as_deref(), Some("tt0903747"));
    }

    #[test]
    fn test_fetch_request_enrichment_id_optional() {
        let body = r#"{"mode":"manual","locator":"1. Pilot","season":1}"#;
        let request: FetchRequest = serde_json::from_str(body).unwrap();
        assert!(request.enrichment_id.is_none());
    }

    #[test]
    fn test_api_response_wraps_payload() {
        let response = ApiResponse::new(vec![1, 2, 3]);
        assert!(response.success);
        assert_eq!(response.data, vec![1, 2, 3]);
    }
}
