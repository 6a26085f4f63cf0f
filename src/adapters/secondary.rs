//! Secondary source adapter: enrichment API
//!
//! Keyed by an external cross-reference id rather than the primary
//! content id. Used only to backfill fields (chiefly descriptions) the
//! primary source left blank; its season payload is a join table, not a
//! standalone season list. This API marks absent text fields with the
//! literal string "N/A".

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::constants::endpoints;
use crate::fetch::{AdapterError, FetchClient};
use crate::models::{RawRecord, SourceLocator};
use crate::normalizer::{aliases, lookup, parse_episode_number};

use super::{SourceAdapter, SourceTier};

/// Adapter for the enrichment API
pub struct SecondaryAdapter {
    client: FetchClient,
    base_url: String,
    api_key: String,
}

impl SecondaryAdapter {
    pub fn new(client: FetchClient, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

/// Build an episode-number → description index from enrichment records,
/// for join-style lookup against the primary result.
///
/// Records without a usable episode number or with an empty/"N/A"
/// description are skipped; on duplicate numbers the first record wins.
pub fn index_by_episode(records: &[RawRecord]) -> HashMap<u32, String> {
    let mut index = HashMap::new();

    for record in records {
        let number = match lookup(record, aliases::EPISODE_NUMBER).and_then(parse_episode_number) {
            Some(number) => number,
            None => continue,
        };

        let description = match lookup(record, aliases::OVERVIEW).and_then(Value::as_str) {
            Some(text) => text.trim(),
            None => continue,
        };
        if description.is_empty() || description.eq_ignore_ascii_case("N/A") {
            continue;
        }

        index.entry(number).or_insert_with(|| description.to_string());
    }

    index
}

#[async_trait]
impl SourceAdapter for SecondaryAdapter {
    fn tier(&self) -> SourceTier {
        SourceTier::Secondary
    }

    async fn fetch_raw(
        &self,
        locator: &SourceLocator,
        season: u32,
    ) -> Result<Vec<RawRecord>, AdapterError> {
        let external_id = locator.as_str();
        let url = endpoints::enrichment_season(&self.base_url, &self.api_key, external_id, season);

        let payload = self.client.fetch_json(&url).await?;

        // This API reports failures in-band with a 200 status
        if payload.get("Response").and_then(Value::as_str) == Some("False") {
            return Err(AdapterError::NotFound);
        }

        let episodes = payload
            .get("Episodes")
            .or_else(|| payload.get("episodes"))
            .and_then(Value::as_array)
            .ok_or_else(|| {
                AdapterError::MalformedResponse(
                    "enrichment payload carried no episode array".to_string(),
                )
            })?;

        Ok(episodes
            .iter()
            .filter_map(|entry| entry.as_object().cloned())
            .collect())
    }
}
