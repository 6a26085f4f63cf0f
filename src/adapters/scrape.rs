//! Scrape source adapter: content-page HTML extraction
//!
//! Content pages have no API contract, so extraction runs three tiers of
//! descending reliability, each independently testable against canned
//! HTML, with early return at the first tier that yields records:
//!
//! 1. embedded-JSON scan: pages usually ship their episode list inside a
//!    `<script>` state payload; any array whose first element has
//!    episode-like keys is taken verbatim.
//! 2. DOM query: a descending-specificity list of container selectors,
//!    rejecting implausibly large candidate sets.
//! 3. regex scan: "S<season> E<episode>" textual anchors in the
//!    tag-stripped page text, paired with a following capitalized run.

use async_trait::async_trait;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::constants::scraping::{EPISODE_CONTAINER_SELECTORS, MAX_CANDIDATE_CONTAINERS};
use crate::fetch::{AdapterError, FetchClient};
use crate::models::{RawRecord, SourceLocator};
use crate::normalizer::{aliases, extract_season_episode, lookup};

use super::{SourceAdapter, SourceTier};

/// The scrape adapter's internal extraction tiers, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapeTier {
    EmbeddedJson,
    DomQuery,
    RegexScan,
}

impl ScrapeTier {
    pub const ALL: &'static [ScrapeTier] =
        &[ScrapeTier::EmbeddedJson, ScrapeTier::DomQuery, ScrapeTier::RegexScan];

    /// Stable name used in logs and the NoEpisodesFound error context.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScrapeTier::EmbeddedJson => "embedded-json",
            ScrapeTier::DomQuery => "dom-query",
            ScrapeTier::RegexScan => "regex-scan",
        }
    }
}

/// Adapter for content-page HTML extraction
pub struct ScrapeAdapter {
    client: FetchClient,
}

impl ScrapeAdapter {
    pub fn new(client: FetchClient) -> Self {
        Self { client }
    }
}

/// Whether a JSON object carries episode-like keys: an episode number
/// under some alias, plus a title or description under some alias.
fn looks_like_episode(object: &RawRecord) -> bool {
    lookup(object, aliases::EPISODE_NUMBER).is_some()
        && (lookup(object, aliases::TITLE).is_some() || lookup(object, aliases::OVERVIEW).is_some())
}

/// Depth-first search for the first array whose first element looks like
/// an episode record.
fn find_episode_array(value: &Value) -> Option<Vec<RawRecord>> {
    match value {
        Value::Array(entries) => {
            if let Some(first) = entries.first().and_then(Value::as_object) {
                if looks_like_episode(first) {
                    return Some(
                        entries
                            .iter()
                            .filter_map(|entry| entry.as_object().cloned())
                            .collect(),
                    );
                }
            }
            entries.iter().find_map(find_episode_array)
        }
        Value::Object(fields) => fields.values().find_map(find_episode_array),
        _ => None,
    }
}

/// Candidate JSON texts inside a script body: the body itself, and the
/// value part of a `window.X = {...};` style assignment.
fn json_candidates(script: &str) -> Vec<&str> {
    let trimmed = script.trim();
    let mut candidates = vec![trimmed];

    let start = trimmed.find(['{', '[']);
    let end = trimmed.rfind(['}', ']']);
    if let (Some(start), Some(end)) = (start, end) {
        if start < end {
            candidates.push(&trimmed[start..=end]);
        }
    }

    candidates
}

/// Tier 1: scan `<script>` payloads for an embedded episode array.
pub fn tier_embedded_json(html: &str) -> Vec<RawRecord> {
    let document = Html::parse_document(html);
    let script_selector = Selector::parse("script").unwrap();

    for script in document.select(&script_selector) {
        let body = script.text().collect::<String>();
        for candidate in json_candidates(&body) {
            let Ok(payload) = serde_json::from_str::<Value>(candidate) else {
                continue;
            };
            if let Some(records) = find_episode_array(&payload) {
                return records;
            }
        }
    }

    Vec::new()
}

/// Tier 2: query the rendered DOM for episode containers.
pub fn tier_dom_query(html: &str) -> Vec<RawRecord> {
    let document = Html::parse_document(html);
    let title_selector = Selector::parse("h1, h2, h3, h4, h5, [class*=\"title\"]").unwrap();
    let description_selector = Selector::parse("p").unwrap();

    for pattern in EPISODE_CONTAINER_SELECTORS {
        let container_selector = Selector::parse(pattern).unwrap();
        let candidates: Vec<_> = document.select(&container_selector).collect();

        if candidates.is_empty() {
            continue;
        }
        if candidates.len() > MAX_CANDIDATE_CONTAINERS {
            warn!(
                pattern,
                matches = candidates.len(),
                "Selector matched implausibly many elements, skipping"
            );
            continue;
        }

        let mut records = Vec::new();
        for candidate in &candidates {
            let full_text = candidate.text().collect::<String>();

            let mut record = RawRecord::new();
            if let Some((_, episode)) = extract_season_episode(&full_text) {
                record.insert("number".to_string(), json!(episode));
            }

            if let Some(title) = candidate
                .select(&title_selector)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
                .filter(|s| !s.is_empty())
            {
                record.insert("title".to_string(), json!(title));
            }

            if let Some(description) = candidate
                .select(&description_selector)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
                .filter(|s| !s.is_empty())
            {
                record.insert("description".to_string(), json!(description));
            }

            if !record.is_empty() {
                records.push(record);
            }
        }

        if !records.is_empty() {
            return records;
        }
    }

    Vec::new()
}

/// Tier 3: regex-scan the tag-stripped page text for "S<n> E<n>" anchors
/// belonging to the requested season, taking the capitalized run after
/// each anchor as the title.
pub fn tier_regex_scan(html: &str, season: u32) -> Vec<RawRecord> {
    let document = Html::parse_document(html);
    let text = document
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ");

    let anchor = Regex::new(r"(?i)\bS\s*(\d{1,2})\s*[\-,:.]?\s*E\s*(\d{1,4})\b").unwrap();
    let title_run = Regex::new(r"^[\s:\-.]*([A-Z][A-Za-z0-9' ,&\-]{2,60})").unwrap();

    // Two passes: anchors first, then the title from the text window
    // between each anchor and the next, so a title run never swallows a
    // following anchor.
    let anchors: Vec<_> = anchor.captures_iter(&text).collect();

    let mut records = Vec::new();
    for (i, captures) in anchors.iter().enumerate() {
        let Ok(anchor_season) = captures[1].parse::<u32>() else {
            continue;
        };
        let Ok(episode) = captures[2].parse::<u32>() else {
            continue;
        };
        if anchor_season != season || episode < 1 {
            continue;
        }

        let window_start = captures.get(0).unwrap().end();
        let window_end = anchors
            .get(i + 1)
            .map(|next| next.get(0).unwrap().start())
            .unwrap_or(text.len());

        let mut record = RawRecord::new();
        record.insert("number".to_string(), json!(episode));
        if let Some(title) = title_run
            .captures(&text[window_start..window_end])
            .map(|c| c[1].trim().to_string())
            .filter(|t| !t.is_empty())
        {
            record.insert("title".to_string(), json!(title));
        }
        records.push(record);
    }

    records
}

/// Run the extraction tiers against one page, stopping at the first tier
/// that yields records.
pub fn extract_episodes(html: &str, season: u32) -> Vec<RawRecord> {
    for tier in ScrapeTier::ALL {
        let records = match tier {
            ScrapeTier::EmbeddedJson => tier_embedded_json(html),
            ScrapeTier::DomQuery => tier_dom_query(html),
            ScrapeTier::RegexScan => tier_regex_scan(html, season),
        };
        if !records.is_empty() {
            debug!(tier = tier.as_str(), records = records.len(), "Scrape tier succeeded");
            return records;
        }
        debug!(tier = tier.as_str(), "Scrape tier yielded no records");
    }

    Vec::new()
}

#[async_trait]
impl SourceAdapter for ScrapeAdapter {
    fn tier(&self) -> SourceTier {
        SourceTier::Scrape
    }

    async fn fetch_raw(
        &self,
        locator: &SourceLocator,
        season: u32,
    ) -> Result<Vec<RawRecord>, AdapterError> {
        let html = self.client.fetch_html(locator.as_str()).await?;
        Ok(extract_episodes(&html, season))
    }
}
