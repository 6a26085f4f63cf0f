//! Source adapter module
//!
//! One adapter per acquisition strategy. Each adapter's sole job is to
//! turn a locator into a sequence of raw, unnormalized episode-like
//! records, or fail with a structured [`AdapterError`]; interpretation of
//! the records is left entirely to the normalizer.

use async_trait::async_trait;

use crate::fetch::AdapterError;
use crate::models::{RawRecord, SourceLocator};

pub mod manual;
pub mod primary;
pub mod scrape;
pub mod secondary;

pub use manual::ManualAdapter;
pub use primary::PrimaryAdapter;
pub use scrape::ScrapeAdapter;
pub use secondary::SecondaryAdapter;

/// Identity of an acquisition strategy, used for provenance stamping and
/// failure logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceTier {
    /// Structured metadata API
    Primary,
    /// Enrichment API keyed by an external cross-reference id
    Secondary,
    /// Content-page HTML extraction
    Scrape,
    /// User-pasted text
    Manual,
}

impl SourceTier {
    /// Stable name used in logs and error context.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTier::Primary => "primary-api",
            SourceTier::Secondary => "enrichment-api",
            SourceTier::Scrape => "content-scrape",
            SourceTier::Manual => "manual-paste",
        }
    }
}

impl std::fmt::Display for SourceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One concrete strategy for obtaining raw episode data.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Which tier this adapter implements.
    fn tier(&self) -> SourceTier;

    /// Fetch or parse the locator into raw episode-like records.
    ///
    /// An empty vector is a valid result (nothing found, nothing failed);
    /// the orchestrator decides whether that exhausts the pipeline.
    async fn fetch_raw(
        &self,
        locator: &SourceLocator,
        season: u32,
    ) -> Result<Vec<RawRecord>, AdapterError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_names_are_stable() {
        assert_eq!(SourceTier::Primary.as_str(), "primary-api");
        assert_eq!(SourceTier::Secondary.as_str(), "enrichment-api");
        assert_eq!(SourceTier::Scrape.as_str(), "content-scrape");
        assert_eq!(SourceTier::Manual.as_str(), "manual-paste");
    }
}
