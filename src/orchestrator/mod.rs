//! Fallback orchestration module
//!
//! Drives the source adapters for the chosen mode, absorbs individual
//! adapter failures, enriches blank descriptions from the secondary
//! source, and hands the normalized records to the assembler. Only total
//! exhaustion (every tier of the chosen mode yielding zero records)
//! surfaces to the caller, as a single `NoEpisodesFound` error naming the
//! attempted tiers.

use std::time::Duration;

use tracing::{info, warn};
use url::Url;

use crate::adapters::{
    manual::ManualStrategy, scrape::ScrapeTier, ManualAdapter, PrimaryAdapter, ScrapeAdapter,
    SecondaryAdapter, SourceAdapter,
};
use crate::assembler::assemble;
use crate::config::Config;
use crate::constants::locator::ACCEPTED_PATH_SEGMENTS;
use crate::error::{AppError, AppResult};
use crate::fetch::{FetchClient, FetchConfig};
use crate::models::{
    DescriptionSource, Episode, EpisodeSet, RawRecord, SourceLocator, SourceMode,
};
use crate::normalizer::{normalize, NormalizationWarning};

/// Where a fetch currently stands. Terminal states are `Done` and
/// `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    PrimaryFetch,
    SecondaryEnrich,
    Assembled,
    Done,
    Failed,
}

/// Drives adapters in priority order and owns the result under
/// construction until it is handed to the caller.
pub struct FallbackOrchestrator {
    primary: Option<Box<dyn SourceAdapter>>,
    secondary: Option<Box<dyn SourceAdapter>>,
    scrape: Box<dyn SourceAdapter>,
    manual: Box<dyn SourceAdapter>,
    content_host: String,
    call_timeout_secs: u64,
    state: FetchState,
}

impl FallbackOrchestrator {
    /// Build the adapter chain from application configuration. Adapters
    /// whose API key is absent are left unconfigured; selecting a mode
    /// that needs them fails with a validation error.
    pub fn from_config(config: &Config) -> Self {
        let fetch_config = FetchConfig {
            timeout_secs: config.request_timeout_secs,
            ..FetchConfig::default()
        };

        let primary = config.metadata_api_key.as_ref().map(|key| {
            Box::new(PrimaryAdapter::new(
                FetchClient::with_config(fetch_config.clone()),
                config.metadata_api_url.clone(),
                key.clone(),
            )) as Box<dyn SourceAdapter>
        });

        let secondary = config.enrichment_api_key.as_ref().map(|key| {
            Box::new(SecondaryAdapter::new(
                FetchClient::with_config(fetch_config.clone()),
                config.enrichment_api_url.clone(),
                key.clone(),
            )) as Box<dyn SourceAdapter>
        });

        Self {
            primary,
            secondary,
            scrape: Box::new(ScrapeAdapter::new(FetchClient::with_config(fetch_config))),
            manual: Box::new(ManualAdapter::new()),
            content_host: config.content_host.clone(),
            call_timeout_secs: config.request_timeout_secs,
            state: FetchState::Idle,
        }
    }

    /// Build an orchestrator from explicit adapters. Used by tests to
    /// substitute canned adapters for the network-bound ones.
    pub fn with_adapters(
        primary: Option<Box<dyn SourceAdapter>>,
        secondary: Option<Box<dyn SourceAdapter>>,
        scrape: Box<dyn SourceAdapter>,
        manual: Box<dyn SourceAdapter>,
        content_host: impl Into<String>,
        call_timeout_secs: u64,
    ) -> Self {
        Self {
            primary,
            secondary,
            scrape,
            manual,
            content_host: content_host.into(),
            call_timeout_secs,
            state: FetchState::Idle,
        }
    }

    /// Current position in the fetch state machine.
    pub fn state(&self) -> FetchState {
        self.state
    }

    /// Classify and validate a locator for the chosen mode. Fails fast,
    /// before any network I/O.
    pub fn resolve_locator(&self, mode: SourceMode, input: &str) -> AppResult<SourceLocator> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(AppError::validation("Locator must not be empty"));
        }

        match mode {
            SourceMode::Api => Ok(SourceLocator::ContentId(trimmed.to_string())),
            SourceMode::Manual => Ok(SourceLocator::Text(input.to_string())),
            SourceMode::Scrape => {
                let url = Url::parse(trimmed)
                    .map_err(|_| AppError::invalid_locator("not a well-formed URL"))?;

                if !matches!(url.scheme(), "http" | "https") {
                    return Err(AppError::invalid_locator("only http(s) URLs are accepted"));
                }

                let host = url.host_str().unwrap_or("");
                if !host_matches(host, &self.content_host) {
                    return Err(AppError::invalid_locator(format!(
                        "host \"{}\" is not the configured content site",
                        host
                    )));
                }

                let is_content_path = url
                    .path_segments()
                    .map(|segments| {
                        segments
                            .filter(|s| !s.is_empty())
                            .any(|s| ACCEPTED_PATH_SEGMENTS.contains(&s))
                    })
                    .unwrap_or(false);
                if !is_content_path {
                    return Err(AppError::invalid_locator(format!(
                        "path \"{}\" does not look like a content page",
                        url.path()
                    )));
                }

                Ok(SourceLocator::Url(trimmed.to_string()))
            }
        }
    }

    /// Fetch, normalize, enrich, and assemble one season.
    pub async fn fetch_episodes(
        &mut self,
        locator_input: &str,
        season: u32,
        mode: SourceMode,
        enrichment_id: Option<&str>,
    ) -> AppResult<EpisodeSet> {
        if season < 1 {
            return Err(AppError::validation("Season must be at least 1"));
        }
        let locator = self.resolve_locator(mode, locator_input)?;

        self.state = FetchState::PrimaryFetch;

        let (records, provenance, attempted) = match mode {
            SourceMode::Api => {
                let Some(primary) = self.primary.as_deref() else {
                    self.state = FetchState::Failed;
                    return Err(AppError::validation(
                        "Metadata API key is not configured; use scrape or manual mode",
                    ));
                };
                let records = self.run_adapter(primary, &locator, season).await;
                (records, DescriptionSource::Primary, vec!["primary-api".to_string()])
            }
            SourceMode::Scrape => {
                let records = self.run_adapter(self.scrape.as_ref(), &locator, season).await;
                let attempted = ScrapeTier::ALL.iter().map(|t| t.as_str().to_string()).collect();
                (records, DescriptionSource::Tertiary, attempted)
            }
            SourceMode::Manual => {
                let records = self.run_adapter(self.manual.as_ref(), &locator, season).await;
                let attempted = ManualStrategy::ALL.iter().map(|s| s.as_str().to_string()).collect();
                (records, DescriptionSource::Manual, attempted)
            }
        };

        if records.is_empty() {
            self.state = FetchState::Failed;
            return Err(AppError::NoEpisodesFound { attempted });
        }

        let mut episodes = Vec::with_capacity(records.len());
        let mut warnings: Vec<NormalizationWarning> = Vec::new();
        for (index, record) in records.iter().enumerate() {
            let normalized = normalize(record, index, season, provenance);
            episodes.push(normalized.episode);
            warnings.extend(normalized.warnings);
        }

        if let Some(id) = enrichment_id {
            if self.should_enrich(mode, &episodes, enrichment_id) {
                self.state = FetchState::SecondaryEnrich;
                self.enrich_descriptions(&mut episodes, id, season).await;
            }
        }

        self.state = FetchState::Assembled;
        let mut set = assemble(season, episodes);
        set.warnings.extend(warnings.iter().map(|w| w.to_string()));

        self.state = FetchState::Done;
        info!(
            season,
            episodes = set.episode_count,
            warnings = set.warnings.len(),
            "Episode fetch complete"
        );
        Ok(set)
    }

    /// Whether the secondary enrichment step should run: the mode
    /// supports it, at least one record has a blank description, and an
    /// enrichment key plus a configured secondary adapter are available.
    fn should_enrich(
        &self,
        mode: SourceMode,
        episodes: &[Episode],
        enrichment_id: Option<&str>,
    ) -> bool {
        mode.supports_enrichment()
            && self.secondary.is_some()
            && enrichment_id.map(|id| !id.trim().is_empty()).unwrap_or(false)
            && episodes.iter().any(|e| e.overview.is_empty())
    }

    /// Backfill blank descriptions from the secondary source. Records
    /// with no match in the enrichment index are left as-is; enrichment
    /// failures degrade to no-ops.
    async fn enrich_descriptions(&self, episodes: &mut [Episode], enrichment_id: &str, season: u32) {
        let secondary = match self.secondary.as_deref() {
            Some(adapter) => adapter,
            None => return,
        };

        let locator = SourceLocator::ContentId(enrichment_id.trim().to_string());
        let records = self.run_adapter(secondary, &locator, season).await;
        if records.is_empty() {
            return;
        }

        let index = crate::adapters::secondary::index_by_episode(&records);
        let mut filled = 0usize;
        for episode in episodes.iter_mut() {
            if !episode.overview.is_empty() {
                continue;
            }
            if let Some(description) = index.get(&episode.episode_number) {
                episode.overview = description.clone();
                episode.description_source = DescriptionSource::Secondary;
                filled += 1;
            }
        }
        info!(filled, "Secondary enrichment pass complete");
    }

    /// Run one adapter with the configured call timeout, absorbing its
    /// failures into an empty record set.
    async fn run_adapter(
        &self,
        adapter: &dyn SourceAdapter,
        locator: &SourceLocator,
        season: u32,
    ) -> Vec<RawRecord> {
        let timeout = Duration::from_secs(self.call_timeout_secs);
        match tokio::time::timeout(timeout, adapter.fetch_raw(locator, season)).await {
            Ok(Ok(records)) => records,
            Ok(Err(e)) => {
                warn!(tier = adapter.tier().as_str(), "Adapter failed: {}", e);
                Vec::new()
            }
            Err(_) => {
                warn!(
                    tier = adapter.tier().as_str(),
                    "Adapter timed out after {}s", self.call_timeout_secs
                );
                Vec::new()
            }
        }
    }
}

/// Host comparison that tolerates a leading "www." on either side.
fn host_matches(host: &str, expected: &str) -> bool {
    let strip = |h: &str| h.strip_prefix("www.").map(str::to_string).unwrap_or_else(|| h.to_string());
    !host.is_empty() && strip(host) == strip(expected)
}
