//! Encyclopedia page sources.
//!
//! A [`PageSource`] knows two things about one encyclopedia: where a topic's
//! page lives and how to turn that page's HTML into a [`PageRecord`]. Fetching
//! is not its concern; [`crate::fetch::Fetcher`] drives any source.

pub mod grokipedia;
pub mod wikipedia;

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use url::Url;

use crate::page::PageRecord;
use crate::parse::Element;
use crate::{EncyclodiffError, Result};

pub use grokipedia::GrokipediaSource;
pub use wikipedia::WikipediaSource;

/// Section name for content before the first heading.
pub const INTRODUCTION: &str = "Introduction";

/// Title used when a page has no recognizable heading or `<title>`.
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// One encyclopedia: topic addressing plus page parsing.
///
/// Parsing never fails. Markup that does not match the source's heuristics
/// yields empty fields.
pub trait PageSource: Send + Sync {
    /// Display name, e.g. "Wikipedia".
    fn name(&self) -> &str;

    /// The page URL for a topic.
    fn resolve_url(&self, topic: &str) -> Result<Url>;

    /// Extracts a structured record from page HTML.
    fn parse(&self, html: &str, url: &str) -> PageRecord;
}

/// Builds `<base>/wiki/<Topic_with_underscores>`, percent-encoding the topic.
pub(crate) fn wiki_page_url(base: &Url, topic: &str) -> Result<Url> {
    let topic = topic.trim();
    if topic.is_empty() {
        return Err(EncyclodiffError::InvalidUrl("empty topic".to_string()));
    }

    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| EncyclodiffError::InvalidUrl(format!("{base} cannot be a base URL")))?
        .clear()
        .push("wiki")
        .push(&topic.replace(' ', "_"));
    Ok(url)
}

static DAY_MONTH_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2}\s+[[:alpha:]]+\s+\d{4})").expect("valid date regex"));

static MONTH_DAY_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([[:alpha:]]+\s+\d{1,2},\s*\d{4})").expect("valid date regex"));

/// Parses an RFC 3339 timestamp, or a bare `YYYY-MM-DD` date at midnight UTC.
pub(crate) fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok().and_then(midnight_utc)
}

/// Finds a `31 October 2024` date in free text.
pub(crate) fn parse_day_month_year(text: &str) -> Option<DateTime<Utc>> {
    let found = DAY_MONTH_YEAR.captures(text)?.get(1)?.as_str();
    NaiveDate::parse_from_str(&normalize_spaces(found), "%d %B %Y").ok().and_then(midnight_utc)
}

/// Finds an `October 31, 2024` date in free text.
pub(crate) fn parse_month_day_year(text: &str) -> Option<DateTime<Utc>> {
    let found = MONTH_DAY_YEAR.captures(text)?.get(1)?.as_str();
    let normalized = normalize_spaces(&found.replace(',', ", "));
    NaiveDate::parse_from_str(&normalized, "%B %d, %Y").ok().and_then(midnight_utc)
}

fn normalize_spaces(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn midnight_utc(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc())
}

/// Resolves protocol-relative `//host/...` sources to https.
pub(crate) fn absolutize_protocol_relative(src: &str) -> String {
    if src.starts_with("//") { format!("https:{src}") } else { src.to_string() }
}

/// Walks headings and text blocks in document order, collecting sections.
///
/// `heading_title` names a new section from a heading (returning `None` keeps
/// the current name). `keep_text` filters block text. Consecutive blocks are
/// joined with a space, and a heading with nothing before it flushes nothing.
pub(crate) fn collect_sections<'a>(
    blocks: impl IntoIterator<Item = Element<'a>>, is_heading: impl Fn(&Element<'a>) -> bool,
    heading_title: impl Fn(&Element<'a>) -> Option<String>, keep_text: impl Fn(&str) -> bool,
) -> crate::page::Sections {
    let mut sections = crate::page::Sections::new();
    let mut current = INTRODUCTION.to_string();
    let mut content: Vec<String> = Vec::new();

    for block in blocks {
        if is_heading(&block) {
            if !content.is_empty() {
                sections.insert(current.clone(), content.join(" "));
                content.clear();
            }
            if let Some(title) = heading_title(&block) {
                current = title;
            }
        } else {
            let text = block.trimmed_text();
            if !text.is_empty() && keep_text(&text) {
                content.push(text);
            }
        }
    }

    if !content.is_empty() {
        sections.insert(current, content.join(" "));
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_wiki_page_url_encodes_topic() {
        let base = Url::parse("https://en.wikipedia.org").unwrap();
        let url = wiki_page_url(&base, "Albert Einstein").unwrap();
        assert_eq!(url.as_str(), "https://en.wikipedia.org/wiki/Albert_Einstein");

        let url = wiki_page_url(&base, "C++ (language)?").unwrap();
        assert_eq!(url.path(), "/wiki/C++_(language)%3F");
        assert!(url.query().is_none());
    }

    #[test]
    fn test_wiki_page_url_rejects_empty_topic() {
        let base = Url::parse("https://en.wikipedia.org").unwrap();
        assert!(matches!(wiki_page_url(&base, "   "), Err(EncyclodiffError::InvalidUrl(_))));
    }

    #[test]
    fn test_parse_day_month_year() {
        let dt = parse_day_month_year("This page was last edited on 31 October 2024, at 10:00").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 10, 31));
        assert!(parse_day_month_year("no date here").is_none());
        assert!(parse_day_month_year("31 Smarch 2024").is_none());
    }

    #[test]
    fn test_parse_month_day_year() {
        let dt = parse_month_day_year("Updated March 5, 2025").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2025, 3, 5));
    }

    #[test]
    fn test_parse_timestamp() {
        let dt = parse_timestamp("2024-05-01T12:30:00Z").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-05-01T12:30:00+00:00");

        let dt = parse_timestamp("2024-05-01T12:30:00+02:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-05-01T10:30:00+00:00");

        assert!(parse_timestamp("2024-05-01").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_absolutize_protocol_relative() {
        assert_eq!(absolutize_protocol_relative("//upload.example/a.png"), "https://upload.example/a.png");
        assert_eq!(absolutize_protocol_relative("https://x/a.png"), "https://x/a.png");
    }
}
