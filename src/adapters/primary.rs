//! Primary source adapter: structured metadata API
//!
//! Fetches a season payload once per configured locale variant and keeps
//! the variant whose episode array carries the most non-empty
//! descriptions. Some locales return season payloads with blank overview
//! fields, so coverage decides, not locale preference; ties go to the
//! earlier entry in the locale list, which makes the selection
//! deterministic regardless of completion order.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::constants::{endpoints, locales};
use crate::fetch::{AdapterError, FetchClient};
use crate::models::{RawRecord, SourceLocator};
use crate::normalizer::{aliases, lookup};

use super::{SourceAdapter, SourceTier};

/// Adapter for the structured metadata API
pub struct PrimaryAdapter {
    client: FetchClient,
    base_url: String,
    api_key: String,
}

impl PrimaryAdapter {
    pub fn new(client: FetchClient, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

/// Pull the episode array out of a season payload.
///
/// The API spells the wrapper key `episodes`; one legacy payload shape
/// uses `Episodes`. Entries that are not objects are skipped.
pub fn extract_episode_array(payload: &Value) -> Option<Vec<RawRecord>> {
    let array = payload
        .get("episodes")
        .or_else(|| payload.get("Episodes"))?
        .as_array()?;

    Some(
        array
            .iter()
            .filter_map(|entry| entry.as_object().cloned())
            .collect(),
    )
}

/// Count records whose description field (under any alias) is non-empty.
pub fn count_described(records: &[RawRecord]) -> usize {
    records
        .iter()
        .filter(|record| {
            lookup(record, aliases::OVERVIEW)
                .and_then(Value::as_str)
                .map(|s| !s.trim().is_empty())
                .unwrap_or(false)
        })
        .count()
}

#[async_trait]
impl SourceAdapter for PrimaryAdapter {
    fn tier(&self) -> SourceTier {
        SourceTier::Primary
    }

    async fn fetch_raw(
        &self,
        locator: &SourceLocator,
        season: u32,
    ) -> Result<Vec<RawRecord>, AdapterError> {
        let series_id = locator.as_str();

        let mut best: Vec<RawRecord> = Vec::new();
        let mut best_coverage = 0usize;
        let mut last_error: Option<AdapterError> = None;
        let mut any_succeeded = false;

        for locale in locales::DESCRIPTION_LOCALES {
            let url = endpoints::season(&self.base_url, &self.api_key, series_id, season, locale);
            let payload = match self.client.fetch_json(&url).await {
                Ok(payload) => payload,
                Err(e) => {
                    warn!(locale, "Season fetch failed for locale variant: {}", e);
                    last_error = Some(e);
                    continue;
                }
            };

            let records = match extract_episode_array(&payload) {
                Some(records) => records,
                None => {
                    warn!(locale, "Season payload carried no episode array");
                    last_error = Some(AdapterError::MalformedResponse(
                        "season payload carried no episode array".to_string(),
                    ));
                    continue;
                }
            };

            any_succeeded = true;
            let coverage = count_described(&records);
            debug!(
                locale,
                episodes = records.len(),
                described = coverage,
                "Fetched season variant"
            );

            // Strictly-greater keeps the earliest locale on ties
            if coverage > best_coverage || best.is_empty() {
                best_coverage = coverage;
                best = records;
            }
        }

        if !any_succeeded {
            return Err(last_error
                .unwrap_or_else(|| AdapterError::NetworkError("no locale variant succeeded".into())));
        }

        Ok(best)
    }
}
