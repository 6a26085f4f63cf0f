//! Constants module for the episode harvester
//!
//! Contains endpoint URL builders that use the base URLs from
//! configuration, plus the fixed tables the adapters and normalizer
//! consult (locale variants, selector patterns, language names, accepted
//! locator path shapes).

/// URL builder functions for the upstream APIs
pub mod endpoints {
    /// Season payload URL on the structured metadata API, for one locale
    /// variant. An empty locale omits the language parameter.
    pub fn season(base_url: &str, api_key: &str, series_id: &str, season: u32, locale: &str) -> String {
        let mut url = format!(
            "{}/tv/{}/season/{}?api_key={}",
            base_url,
            urlencoding::encode(series_id),
            season,
            urlencoding::encode(api_key)
        );
        if !locale.is_empty() {
            url.push_str("&language=");
            url.push_str(&urlencoding::encode(locale));
        }
        url
    }

    /// Season lookup URL on the enrichment API, keyed by an external
    /// cross-reference id.
    pub fn enrichment_season(base_url: &str, api_key: &str, external_id: &str, season: u32) -> String {
        format!(
            "{}/?apikey={}&i={}&Season={}",
            base_url,
            urlencoding::encode(api_key),
            urlencoding::encode(external_id),
            season
        )
    }
}

/// Locale variants tried by the primary adapter, in priority order.
///
/// Some locales return season payloads with empty description fields;
/// trying several and keeping the best-covered one maximizes overview
/// coverage. The empty string means "no language parameter" (the API's
/// own default). Ties in coverage are broken by position in this list.
pub mod locales {
    pub const DESCRIPTION_LOCALES: &[&str] = &["en-US", "en-IN", "hi-IN", ""];
}

/// Fixed tables used by the scrape adapter.
pub mod scraping {
    /// Candidate episode-container selectors, most specific first. The
    /// DOM tier walks this list and stops at the first selector that
    /// matches a plausible candidate set.
    pub const EPISODE_CONTAINER_SELECTORS: &[&str] = &[
        "li.episode-item",
        "div.episode-card",
        "div[class*=\"episodeList\"] li",
        "ul[class*=\"episode\"] li",
        "div[class*=\"episode\"]",
    ];

    /// A selector matching more elements than this is assumed to have
    /// caught unrelated UI and its candidate set is rejected.
    pub const MAX_CANDIDATE_CONTAINERS: usize = 50;
}

/// Language names that content sites append to episode titles
/// (e.g. "Kiraaye Ka Kissa - Hindi"). The normalizer strips a trailing
/// " - <name>" suffix matching this list, case-insensitively.
pub mod languages {
    pub const TITLE_SUFFIX_LANGUAGES: &[&str] = &[
        "Hindi",
        "English",
        "Tamil",
        "Telugu",
        "Bengali",
        "Marathi",
        "Kannada",
        "Malayalam",
        "Punjabi",
        "Gujarati",
        "Bhojpuri",
        "Urdu",
    ];
}

/// Accepted locator shapes for the scrape adapter.
pub mod locator {
    /// Path segments a scrape-mode URL must contain to be considered a
    /// content page. Anything else fails fast as an invalid locator,
    /// before any network I/O.
    pub const ACCEPTED_PATH_SEGMENTS: &[&str] =
        &["shows", "show", "webseries", "series", "content"];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_season_endpoint_with_locale() {
        let url = endpoints::season("https://api.example.com/3", "k", "1399", 2, "en-US");
        assert_eq!(
            url,
            "https://api.example.com/3/tv/1399/season/2?api_key=k&language=en-US"
        );
    }

    #[test]
    fn test_season_endpoint_without_locale() {
        let url = endpoints::season("https://api.example.com/3", "k", "1399", 2, "");
        assert_eq!(url, "https://api.example.com/3/tv/1399/season/2?api_key=k");
    }

    #[test]
    fn test_enrichment_endpoint() {
        let url = endpoints::enrichment_season("https://enrich.example.com", "k", "tt0903747", 1);
        assert_eq!(
            url,
            "https://enrich.example.com/?apikey=k&i=tt0903747&Season=1"
        );
    }

    #[test]
    fn test_endpoint_encodes_query_values() {
        let url = endpoints::season("https://api.example.com/3", "a b", "x/y", 1, "");
        assert!(url.contains("tv/x%2Fy/season/1"));
        assert!(url.contains("api_key=a%20b"));
    }

    #[test]
    fn test_locale_list_ends_with_api_default() {
        assert_eq!(locales::DESCRIPTION_LOCALES.last(), Some(&""));
    }

    #[test]
    fn test_selector_list_is_nonempty_and_parseable() {
        assert!(!scraping::EPISODE_CONTAINER_SELECTORS.is_empty());
        for pattern in scraping::EPISODE_CONTAINER_SELECTORS {
            assert!(scraper::Selector::parse(pattern).is_ok(), "bad selector: {}", pattern);
        }
    }
}
