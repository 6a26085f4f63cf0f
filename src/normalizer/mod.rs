//! Record normalization module
//!
//! Converts the untyped [`RawRecord`]s produced by source adapters into
//! canonical [`Episode`] entities. The same logical field arrives under
//! different key spellings depending on the adapter, so every lookup goes
//! through an explicit ordered alias list. Coercion failures degrade to
//! defaults and are recorded as warnings, never thrown.

use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;

use crate::constants::languages::TITLE_SUFFIX_LANGUAGES;
use crate::models::{DescriptionSource, Episode, RawRecord};

/// Ordered alias keys per logical field, tried in fixed priority order.
///
/// Aliases are stored in canonical form (lowercase, alphanumerics only);
/// record keys are canonicalized the same way before comparison, so
/// "Episode Number", "episodeNumber", and "episode_number" all match the
/// "episodenumber" alias.
pub mod aliases {
    pub const EPISODE_NUMBER: &[&str] = &[
        "episodenumber",
        "episode",
        "episodeno",
        "number",
        "epnum",
        "ep",
    ];

    pub const TITLE: &[&str] = &["name", "title", "episodetitle", "episodename", "heading"];

    pub const OVERVIEW: &[&str] = &[
        "overview",
        "description",
        "plot",
        "summary",
        "synopsis",
        "desc",
    ];

    pub const AIR_DATE: &[&str] = &[
        "airdate",
        "released",
        "releasedate",
        "firstaired",
        "premiere",
        "date",
    ];

    pub const RUNTIME: &[&str] = &["runtime", "runtimeminutes", "duration", "length"];
}

/// Sentinel used by one upstream API format for absent text fields.
const ABSENT_SENTINEL: &str = "N/A";

/// A non-fatal problem encountered while normalizing one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizationWarning {
    /// Episode the problem belongs to
    pub episode_number: u32,
    /// Logical field that could not be coerced
    pub field: &'static str,
    /// The offending raw value
    pub detail: String,
}

impl std::fmt::Display for NormalizationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "episode {}: unparsable {} \"{}\"",
            self.episode_number, self.field, self.detail
        )
    }
}

/// One normalized record plus whatever warnings its coercion produced.
#[derive(Debug, Clone)]
pub struct NormalizedRecord {
    pub episode: Episode,
    pub warnings: Vec<NormalizationWarning>,
}

/// Canonicalize a key for alias comparison: lowercase, alphanumerics only.
fn canon_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

/// Look up a logical field in a raw record through its ordered alias list.
///
/// Aliases are tried in priority order; the first alias that matches any
/// record key (after canonicalization) wins.
pub fn lookup<'a>(record: &'a RawRecord, alias_list: &[&str]) -> Option<&'a Value> {
    for alias in alias_list {
        for (key, value) in record {
            if canon_key(key) == *alias && !value.is_null() {
                return Some(value);
            }
        }
    }
    None
}

/// Look up a logical field and coerce it to a trimmed string.
fn lookup_string(record: &RawRecord, alias_list: &[&str]) -> Option<String> {
    match lookup(record, alias_list)? {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Extract season and episode numbers from an "S<n> E<n>" style string.
pub fn extract_season_episode(text: &str) -> Option<(u32, u32)> {
    let pattern = Regex::new(r"(?i)\bS\s*(\d{1,2})\s*[\-,:.]?\s*E\s*(\d{1,4})\b").unwrap();
    let captures = pattern.captures(text)?;
    let season = captures[1].parse().ok()?;
    let episode = captures[2].parse().ok()?;
    Some((season, episode))
}

/// Coerce a raw value into an episode number, if it carries one.
pub fn parse_episode_number(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => {
            let trimmed = s.trim();
            if let Ok(n) = trimmed.parse::<u32>() {
                Some(n)
            } else {
                extract_season_episode(trimmed).map(|(_, episode)| episode)
            }
        }
        _ => None,
    }
    .filter(|&n| n >= 1)
}

/// Coerce a raw value into a runtime in whole minutes.
///
/// Accepts bare integers and strings with a numeric prefix followed by a
/// minute marker ("9m", "24 min", "40 minutes"). Anything else is None.
pub fn parse_runtime(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => {
            let trimmed = s.trim();
            let digits: String = trimmed.chars().take_while(|c| c.is_ascii_digit()).collect();
            if digits.is_empty() {
                return None;
            }
            let minutes: u32 = digits.parse().ok()?;
            let rest = trimmed[digits.len()..].trim_start().to_lowercase();
            if rest.is_empty() || rest.starts_with('m') {
                Some(minutes)
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Parse a textual date in ISO (yyyy-mm-dd) or US (mm/dd/yyyy) form.
pub fn parse_air_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%m/%d/%Y"))
        .ok()
}

/// Strip a trailing " - <LanguageName>" suffix from a title.
///
/// Content sites append the audio language to episode titles; the suffix
/// is only stripped when the tail matches the fixed language-name list,
/// case-insensitively.
pub fn strip_language_suffix(title: &str) -> String {
    if let Some(idx) = title.rfind(" - ") {
        let tail = title[idx + 3..].trim();
        if TITLE_SUFFIX_LANGUAGES
            .iter()
            .any(|lang| lang.eq_ignore_ascii_case(tail))
        {
            return title[..idx].trim_end().to_string();
        }
    }
    title.to_string()
}

/// Strip a redundant leading "Episode N:" / "S<n> E<n>:" prefix from a
/// title.
pub fn strip_episode_prefix(title: &str) -> String {
    let pattern =
        Regex::new(r"(?i)^\s*(?:episode\s*\d{1,4}|s\s*\d{1,2}\s*e\s*\d{1,4})\s*[:\-]\s*").unwrap();
    pattern.replace(title, "").to_string()
}

/// Best-effort check whether a text run is likely English prose.
///
/// Crude word-frequency heuristic: callers deciding whether text needs
/// translation should treat it as a hint, not a verdict. Short strings in
/// particular can go either way.
pub fn is_likely_english(text: &str) -> bool {
    const COMMON_WORDS: &[&str] = &[
        "the", "and", "is", "of", "to", "a", "in", "that", "it", "for", "with", "on", "was", "as",
        "her", "his", "she", "he", "at", "by",
    ];

    let words: Vec<String> = text
        .split_whitespace()
        .map(|w| {
            w.chars()
                .filter(|c| c.is_ascii_alphabetic())
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect();

    if words.is_empty() {
        return false;
    }

    let hits = words
        .iter()
        .filter(|w| COMMON_WORDS.contains(&w.as_str()))
        .count();

    hits as f64 / words.len() as f64 >= 0.15
}

/// Normalize one raw record into a canonical episode.
///
/// `index` is the record's 0-based position in the adapter's raw
/// sequence, used as the episode-number fallback. `provenance` is the
/// tier that supplied the record.
pub fn normalize(
    raw: &RawRecord,
    index: usize,
    season: u32,
    provenance: DescriptionSource,
) -> NormalizedRecord {
    let mut warnings = Vec::new();

    let episode_number = lookup(raw, aliases::EPISODE_NUMBER)
        .and_then(parse_episode_number)
        .unwrap_or(index as u32 + 1);

    let title = match lookup_string(raw, aliases::TITLE) {
        Some(raw_title) if !raw_title.is_empty() => {
            let cleaned = strip_language_suffix(&strip_episode_prefix(&raw_title));
            if cleaned.is_empty() {
                Episode::default_title(episode_number)
            } else {
                cleaned
            }
        }
        _ => Episode::default_title(episode_number),
    };

    let overview = lookup_string(raw, aliases::OVERVIEW)
        .filter(|s| !s.eq_ignore_ascii_case(ABSENT_SENTINEL))
        .unwrap_or_default();

    let air_date = match lookup_string(raw, aliases::AIR_DATE) {
        Some(text) if !text.is_empty() && !text.eq_ignore_ascii_case(ABSENT_SENTINEL) => {
            let parsed = parse_air_date(&text);
            if parsed.is_none() {
                warnings.push(NormalizationWarning {
                    episode_number,
                    field: "air date",
                    detail: text,
                });
            }
            parsed
        }
        _ => None,
    };

    let runtime_minutes = match lookup(raw, aliases::RUNTIME) {
        Some(value) => {
            let parsed = parse_runtime(value);
            if parsed.is_none() {
                warnings.push(NormalizationWarning {
                    episode_number,
                    field: "runtime",
                    detail: value.to_string(),
                });
            }
            parsed
        }
        None => None,
    };

    NormalizedRecord {
        episode: Episode {
            season_number: season,
            episode_number,
            title,
            overview,
            air_date,
            runtime_minutes,
            description_source: provenance,
        },
        warnings,
    }
}
