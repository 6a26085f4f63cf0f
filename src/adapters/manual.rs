//! Manual source adapter: user-pasted text
//!
//! Pasted episode lists arrive in three shapes, tried in fixed order with
//! the first strategy producing at least one record winning:
//!
//! 1. JSON: a bare array, or an object wrapping one under `episodes`,
//!    `Episodes`, or `data`.
//! 2. Delimited rows: comma-separated fields, a header-like first row
//!    detected and used as column keys, quoted fields that may contain
//!    the delimiter.
//! 3. Freeform lines: `<number>. <title> | <runtime> | <description>`
//!    with optional sub-parts.

use async_trait::async_trait;
use regex::Regex;
use serde_json::{json, Value};
use tracing::debug;

use crate::fetch::AdapterError;
use crate::models::{RawRecord, SourceLocator};
use crate::normalizer::{aliases, extract_season_episode};

use super::{SourceAdapter, SourceTier};

/// The manual adapter's parsing strategies, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManualStrategy {
    Json,
    Delimited,
    Freeform,
}

impl ManualStrategy {
    pub const ALL: &'static [ManualStrategy] =
        &[ManualStrategy::Json, ManualStrategy::Delimited, ManualStrategy::Freeform];

    /// Stable name used in logs and the NoEpisodesFound error context.
    pub fn as_str(&self) -> &'static str {
        match self {
            ManualStrategy::Json => "manual-json",
            ManualStrategy::Delimited => "manual-delimited",
            ManualStrategy::Freeform => "manual-freeform",
        }
    }
}

/// Adapter for user-pasted text
#[derive(Debug, Default)]
pub struct ManualAdapter;

impl ManualAdapter {
    pub fn new() -> Self {
        Self
    }
}

/// Strategy 1: the paste is JSON, either a bare array or a wrapped one.
pub fn parse_json_records(text: &str) -> Vec<RawRecord> {
    let Ok(payload) = serde_json::from_str::<Value>(text.trim()) else {
        return Vec::new();
    };

    let array = match &payload {
        Value::Array(entries) => Some(entries),
        Value::Object(fields) => fields
            .get("episodes")
            .or_else(|| fields.get("Episodes"))
            .or_else(|| fields.get("data"))
            .and_then(Value::as_array),
        _ => None,
    };

    array
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| entry.as_object().cloned())
                .collect()
        })
        .unwrap_or_default()
}

/// Split one delimited row into fields, respecting double-quoted fields
/// that may contain the delimiter. A doubled quote inside a quoted field
/// is an escaped quote.
fn split_delimited_row(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(c);
            }
        } else if c == '"' {
            in_quotes = true;
        } else if c == delimiter {
            fields.push(current.trim().to_string());
            current = String::new();
        } else {
            current.push(c);
        }
    }
    fields.push(current.trim().to_string());

    fields
}

/// Whether a first row reads like a header: no cell is a bare number or
/// an "S<n> E<n>" reference, and at least one cell matches a known field
/// alias.
fn is_header_row(cells: &[String]) -> bool {
    let data_like = cells
        .iter()
        .any(|cell| cell.parse::<u32>().is_ok() || extract_season_episode(cell).is_some());
    if data_like {
        return false;
    }

    let known_aliases: Vec<&&str> = aliases::EPISODE_NUMBER
        .iter()
        .chain(aliases::TITLE)
        .chain(aliases::OVERVIEW)
        .chain(aliases::RUNTIME)
        .chain(aliases::AIR_DATE)
        .collect();

    cells.iter().any(|cell| {
        let canon: String = cell
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        known_aliases.iter().any(|alias| ***alias == canon)
    })
}

/// Column keys assumed when no header row is present.
const POSITIONAL_KEYS: &[&str] = &["number", "title", "runtime", "description"];

/// Strategy 2: comma-delimited rows, with header detection.
pub fn parse_delimited_records(text: &str) -> Vec<RawRecord> {
    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    if lines.is_empty() {
        return Vec::new();
    }

    let rows: Vec<Vec<String>> = lines
        .iter()
        .map(|line| split_delimited_row(line, ','))
        .collect();

    // A single column is not a delimited paste
    if !rows.iter().any(|row| row.len() >= 2) {
        return Vec::new();
    }

    let (keys, data_rows): (Vec<String>, &[Vec<String>]) = if is_header_row(&rows[0]) {
        (rows[0].clone(), &rows[1..])
    } else {
        (
            POSITIONAL_KEYS.iter().map(|k| k.to_string()).collect(),
            &rows[..],
        )
    };

    let mut records = Vec::new();
    for row in data_rows {
        if row.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        let mut record = RawRecord::new();
        for (key, cell) in keys.iter().zip(row) {
            if !cell.is_empty() {
                record.insert(key.clone(), json!(cell));
            }
        }
        if !record.is_empty() {
            records.push(record);
        }
    }

    records
}

/// Strategy 3: one episode per line, `<number>. <title>` with optional
/// `| <runtime> | <description>` sub-parts.
pub fn parse_freeform_records(text: &str) -> Vec<RawRecord> {
    let line_pattern = Regex::new(r"^\s*(\d{1,4})[.)]?\s+(.+)$").unwrap();

    let mut records = Vec::new();
    for line in text.lines() {
        let Some(captures) = line_pattern.captures(line) else {
            continue;
        };
        let Ok(number) = captures[1].parse::<u32>() else {
            continue;
        };
        if number < 1 {
            continue;
        }

        let mut record = RawRecord::new();
        record.insert("number".to_string(), json!(number));

        let mut parts = captures[2].split('|').map(str::trim);
        if let Some(title) = parts.next().filter(|s| !s.is_empty()) {
            record.insert("title".to_string(), json!(title));
        }
        if let Some(runtime) = parts.next().filter(|s| !s.is_empty()) {
            record.insert("runtime".to_string(), json!(runtime));
        }
        let description = parts.collect::<Vec<_>>().join(" | ");
        if !description.is_empty() {
            record.insert("description".to_string(), json!(description));
        }

        records.push(record);
    }

    records
}

/// Run the parsing strategies against one paste, stopping at the first
/// strategy that yields records.
pub fn parse_pasted_text(text: &str) -> Vec<RawRecord> {
    for strategy in ManualStrategy::ALL {
        let records = match strategy {
            ManualStrategy::Json => parse_json_records(text),
            ManualStrategy::Delimited => parse_delimited_records(text),
            ManualStrategy::Freeform => parse_freeform_records(text),
        };
        if !records.is_empty() {
            debug!(
                strategy = strategy.as_str(),
                records = records.len(),
                "Manual parsing strategy succeeded"
            );
            return records;
        }
    }

    Vec::new()
}

#[async_trait]
impl SourceAdapter for ManualAdapter {
    fn tier(&self) -> SourceTier {
        SourceTier::Manual
    }

    async fn fetch_raw(
        &self,
        locator: &SourceLocator,
        _season: u32,
    ) -> Result<Vec<RawRecord>, AdapterError> {
        Ok(parse_pasted_text(locator.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_bare_array() {
        let text = r#"[{"episodeNumber":2,"name":"B"},{"episodeNumber":1,"name":"A"}]"#;
        let records = parse_json_records(text);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("name"), Some(&json!("B")));
    }

    #[test]
    fn test_parse_json_wrapped_array() {
        for wrapper in ["episodes", "Episodes", "data"] {
            let text = format!(r#"{{"{}":[{{"episode":1,"title":"Pilot"}}]}}"#, wrapper);
            let records = parse_json_records(&text);
            assert_eq!(records.len(), 1, "wrapper {} failed", wrapper);
        }
    }

    #[test]
    fn test_parse_json_rejects_non_json() {
        assert!(parse_json_records("1. Pilot | 22m").is_empty());
        assert!(parse_json_records(r#"{"count":3}"#).is_empty());
    }

    #[test]
    fn test_split_delimited_row_plain() {
        assert_eq!(
            split_delimited_row("a,b,c", ','),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
    }

    #[test]
    fn test_split_delimited_row_quoted_delimiter() {
        assert_eq!(
            split_delimited_row(r#"1,"Hello, World",9m"#, ','),
            vec!["1".to_string(), "Hello, World".to_string(), "9m".to_string()]
        );
    }

    #[test]
    fn test_split_delimited_row_escaped_quote() {
        assert_eq!(
            split_delimited_row(r#"1,"She said ""hi""",9m"#, ','),
            vec!["1".to_string(), r#"She said "hi""#.to_string(), "9m".to_string()]
        );
    }

    #[test]
    fn test_header_row_detection() {
        let header = split_delimited_row("Episode Number,Title,Runtime,Summary", ',');
        assert!(is_header_row(&header));

        let data = split_delimited_row("S1 E1,Kiraaye Ka Kissa - Hindi,9m,Shreya is muddled", ',');
        assert!(!is_header_row(&data));

        let numbered = split_delimited_row("1,Pilot,22m,Intro", ',');
        assert!(!is_header_row(&numbered));
    }

    #[test]
    fn test_parse_delimited_with_header_maps_columns() {
        let text = "Episode Number,Title,Runtime,Summary\nS1 E1,Kiraaye Ka Kissa - Hindi,9m,Shreya is muddled";
        let records = parse_delimited_records(text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("Episode Number"), Some(&json!("S1 E1")));
        assert_eq!(records[0].get("Title"), Some(&json!("Kiraaye Ka Kissa - Hindi")));
        assert_eq!(records[0].get("Runtime"), Some(&json!("9m")));
        assert_eq!(records[0].get("Summary"), Some(&json!("Shreya is muddled")));
    }

    #[test]
    fn test_parse_delimited_reordered_header() {
        let text = "Title,Episode Number\nPilot,4";
        let records = parse_delimited_records(text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("Episode Number"), Some(&json!("4")));
    }

    #[test]
    fn test_parse_delimited_without_header_uses_positions() {
        let text = "1,Pilot,22m,A stranger knocks\n2,Fallout,24m,The town reacts";
        let records = parse_delimited_records(text);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("number"), Some(&json!("1")));
        assert_eq!(records[1].get("title"), Some(&json!("Fallout")));
    }

    #[test]
    fn test_parse_delimited_rejects_single_column() {
        assert!(parse_delimited_records("just one line of prose").is_empty());
    }

    #[test]
    fn test_parse_freeform_lines() {
        let text = "1. Pilot | 22m | A stranger knocks\n2) Fallout | 24 min\n3. Orphan";
        let records = parse_freeform_records(text);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].get("number"), Some(&json!(1)));
        assert_eq!(records[0].get("title"), Some(&json!("Pilot")));
        assert_eq!(records[0].get("runtime"), Some(&json!("22m")));
        assert_eq!(records[0].get("description"), Some(&json!("A stranger knocks")));
        assert_eq!(records[1].get("runtime"), Some(&json!("24 min")));
        assert!(records[2].get("runtime").is_none());
    }

    #[test]
    fn test_parse_freeform_skips_unnumbered_lines() {
        let text = "Season overview\n1. Pilot";
        let records = parse_freeform_records(text);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_strategy_order_json_first() {
        let text = r#"[{"episode":1,"title":"1. Not freeform"}]"#;
        let records = parse_pasted_text(text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("episode"), Some(&json!(1)));
    }

    #[test]
    fn test_strategy_order_delimited_before_freeform() {
        let text = "1,Pilot,22m,Intro";
        let records = parse_pasted_text(text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("number"), Some(&json!("1")));
        assert_eq!(records[0].get("title"), Some(&json!("Pilot")));
        assert_eq!(records[0].get("runtime"), Some(&json!("22m")));
        assert_eq!(records[0].get("description"), Some(&json!("Intro")));
    }

    #[test]
    fn test_parse_pasted_text_nothing_matches() {
        assert!(parse_pasted_text("no episode data here at all").is_empty());
    }

    #[test]
    fn test_strategy_names_for_error_context() {
        let names: Vec<&str> = ManualStrategy::ALL.iter().map(|s| s.as_str()).collect();
        assert_eq!(names, vec!["manual-json", "manual-delimited", "manual-freeform"]);
    }
}
