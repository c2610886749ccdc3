//! The page comparison engine.
//!
//! [`PageComparator::compare`] takes two [`PageRecord`]s and derives every
//! similarity and divergence metric in one pass. It performs no I/O, holds no
//! state between calls and never fails: empty text or empty section maps
//! produce zero or empty metrics.
//!
//! By convention page A is the Grokipedia page and page B the Wikipedia page,
//! but nothing here depends on which sources produced the records.
//!
//! # Example
//!
//! ```rust
//! use encyclodiff_core::compare::{SimilarityCategory, compare};
//! use encyclodiff_core::page::PageRecord;
//!
//! let a = PageRecord::new("Rust", "https://grokipedia.com/wiki/Rust", "Rust is a systems language.");
//! let b = PageRecord::new("Rust", "https://en.wikipedia.org/wiki/Rust", "Rust is a systems language.");
//!
//! let result = compare(&a, &b);
//! assert_eq!(result.text_similarity, 1.0);
//! assert_eq!(result.similarity_category, SimilarityCategory::High);
//! ```

pub mod diff;
pub mod sections;
pub mod similarity;
pub mod summary;

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::page::PageRecord;

pub use diff::{DiffKind, DiffSegment, MAX_DIFF_SEGMENTS, MAX_SEGMENT_CHARS, diff_segments};
pub use sections::{section_overlap, unique_sections};
pub use similarity::{CHAR_ALIGNMENT_LIMIT, LEVENSHTEIN_CHAR_LIMIT, levenshtein_distance, text_similarity};
pub use summary::{SimilarityCategory, categorize, key_differences};

/// Default time allowed for aligning long texts.
pub const DEFAULT_DIFF_DEADLINE: Duration = Duration::from_secs(1);

const FALLBACK_NAME_A: &str = "Source A";
const FALLBACK_NAME_B: &str = "Source B";

/// Configuration for [`PageComparator`].
#[derive(Debug, Clone, PartialEq)]
pub struct ComparatorConfig {
    /// Upper bound on the time spent aligning long texts (default: 1 second).
    ///
    /// Past the deadline the diff settles for coarser segments, and the
    /// similarity ratio stops refining the gaps between its anchor words.
    /// `None` aligns without a time limit.
    pub diff_deadline: Option<Duration>,
}

impl Default for ComparatorConfig {
    fn default() -> Self {
        Self { diff_deadline: Some(DEFAULT_DIFF_DEADLINE) }
    }
}

impl ComparatorConfig {
    /// Creates a new builder for ComparatorConfig.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use encyclodiff_core::compare::ComparatorConfig;
    ///
    /// let config = ComparatorConfig::builder().diff_deadline(Duration::from_secs(5)).build();
    /// assert_eq!(config.diff_deadline, Some(Duration::from_secs(5)));
    /// ```
    pub fn builder() -> ComparatorConfigBuilder {
        ComparatorConfigBuilder::new()
    }
}

/// Builder for ComparatorConfig.
pub struct ComparatorConfigBuilder {
    config: ComparatorConfig,
}

impl ComparatorConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: ComparatorConfig::default() }
    }

    /// Sets the alignment deadline.
    pub fn diff_deadline(mut self, value: Duration) -> Self {
        self.config.diff_deadline = Some(value);
        self
    }

    /// Aligns without a time limit.
    pub fn no_diff_deadline(mut self) -> Self {
        self.config.diff_deadline = None;
        self
    }

    /// Builds the config.
    pub fn build(self) -> ComparatorConfig {
        self.config
    }
}

impl Default for ComparatorConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Every metric derived from one page pair.
///
/// Signed differences are always `A − B`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// Topic key, taken from page A's title.
    pub topic: String,

    /// Display names of the two sides, used in key differences and reports.
    pub source_a: String,
    pub source_b: String,

    pub page_a: PageRecord,
    pub page_b: PageRecord,

    /// Case-insensitive sequence-matching ratio in `[0, 1]`.
    pub text_similarity: f64,

    /// Character edit distance over the first [`LEVENSHTEIN_CHAR_LIMIT`] characters.
    pub levenshtein_distance: usize,

    pub diff_segments: Vec<DiffSegment>,

    pub word_count_diff: i64,

    /// `word_count_diff` as a percentage of page B's word count (0 when B is empty).
    pub word_count_diff_pct: f64,

    /// Jaccard similarity of section titles.
    pub section_overlap: f64,
    pub unique_to_a: Vec<String>,
    pub unique_to_b: Vec<String>,

    pub citation_count_a: usize,
    pub citation_count_b: usize,
    pub citation_diff: i64,

    pub has_infobox_a: bool,
    pub has_infobox_b: bool,

    pub external_links_a: usize,
    pub external_links_b: usize,

    pub last_modified_a: Option<DateTime<Utc>>,
    pub last_modified_b: Option<DateTime<Utc>>,

    pub similarity_category: SimilarityCategory,
    pub key_differences: Vec<String>,

    /// When the comparison was made.
    pub timestamp: DateTime<Utc>,
}

impl ComparisonResult {
    /// Attaches a sampling category to both embedded page records.
    pub fn set_category(&mut self, category: &str) {
        for page in [&mut self.page_a, &mut self.page_b] {
            page.metadata.insert("category".to_string(), category.to_string());
        }
    }

    /// The sampling category attached by the caller, if any.
    pub fn category(&self) -> Option<&str> {
        self.page_a.category()
    }
}

/// Stateless page comparator.
#[derive(Debug, Clone, Default)]
pub struct PageComparator {
    config: ComparatorConfig,
}

impl PageComparator {
    /// Creates a comparator with the default alignment deadline.
    pub fn new() -> Self {
        Self { config: ComparatorConfig::default() }
    }

    pub fn with_config(config: ComparatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ComparatorConfig {
        &self.config
    }

    /// Compares page A against page B.
    pub fn compare(&self, a: &PageRecord, b: &PageRecord) -> ComparisonResult {
        let deadline = self.config.diff_deadline;

        let text_similarity =
            similarity::text_similarity_with_deadline(&a.text_content, &b.text_content, deadline);
        let levenshtein_distance = similarity::levenshtein_distance(&a.text_content, &b.text_content);
        let diff_segments = diff::diff_segments(&a.text_content, &b.text_content, deadline);

        let word_count_diff = a.word_count as i64 - b.word_count as i64;
        let word_count_diff_pct =
            if b.word_count > 0 { word_count_diff as f64 / b.word_count as f64 * 100.0 } else { 0.0 };

        let citation_count_a = a.citations.len();
        let citation_count_b = b.citations.len();

        let mut result = ComparisonResult {
            topic: a.title.clone(),
            source_a: display_name(a, FALLBACK_NAME_A),
            source_b: display_name(b, FALLBACK_NAME_B),
            page_a: a.clone(),
            page_b: b.clone(),
            text_similarity,
            levenshtein_distance,
            diff_segments,
            word_count_diff,
            word_count_diff_pct,
            section_overlap: sections::section_overlap(&a.sections, &b.sections),
            unique_to_a: sections::unique_sections(&a.sections, &b.sections),
            unique_to_b: sections::unique_sections(&b.sections, &a.sections),
            citation_count_a,
            citation_count_b,
            citation_diff: citation_count_a as i64 - citation_count_b as i64,
            has_infobox_a: a.has_infobox(),
            has_infobox_b: b.has_infobox(),
            external_links_a: a.external_links.len(),
            external_links_b: b.external_links.len(),
            last_modified_a: a.last_modified,
            last_modified_b: b.last_modified,
            similarity_category: summary::categorize(text_similarity),
            key_differences: Vec::new(),
            timestamp: Utc::now(),
        };
        result.key_differences = summary::key_differences(&result);

        tracing::debug!(
            topic = %result.topic,
            similarity = result.text_similarity,
            category = %result.similarity_category,
            "compared pages"
        );

        result
    }
}

fn display_name(page: &PageRecord, fallback: &str) -> String {
    if page.source.is_empty() { fallback.to_string() } else { page.source.clone() }
}

/// Compares two pages with the default comparator.
pub fn compare(a: &PageRecord, b: &PageRecord) -> ComparisonResult {
    PageComparator::new().compare(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{Citation, Infobox, Sections};

    fn citations(n: usize) -> Vec<Citation> {
        (1..=n).map(|i| Citation { number: i, id: format!("cite_note-{i}"), text: format!("Reference {i}") }).collect()
    }

    fn sections(titles: &[&str]) -> Sections {
        titles.iter().map(|t| (*t, format!("{t} body"))).collect()
    }

    fn grok(title: &str, text: &str) -> PageRecord {
        PageRecord::new(title, "https://grokipedia.com/wiki/Test", text).with_source("Grokipedia")
    }

    fn wiki(title: &str, text: &str) -> PageRecord {
        PageRecord::new(title, "https://en.wikipedia.org/wiki/Test", text).with_source("Wikipedia")
    }

    #[test]
    fn test_identical_text_different_citations() {
        let text = "This is a test page with some content. ".repeat(10);
        let a = grok("Test Page", &text).with_sections(sections(&["Intro", "Main"])).with_citations(citations(5));
        let b = wiki("Test Page", &text).with_sections(sections(&["Intro", "Main"])).with_citations(citations(10));

        let result = compare(&a, &b);

        assert_eq!(result.text_similarity, 1.0);
        assert_eq!(result.similarity_category, SimilarityCategory::High);
        assert_eq!(result.word_count_diff, 0);
        assert_eq!(result.word_count_diff_pct, 0.0);
        assert_eq!(result.citation_diff, -5);
        assert_eq!(result.levenshtein_distance, 0);
        assert_eq!(result.section_overlap, 1.0);
        assert_eq!(result.diff_segments.len(), 1);
        assert_eq!(result.diff_segments[0].kind, DiffKind::Equal);
        assert_eq!(result.key_differences, vec!["Text similarity: 100.00% (high)"]);
    }

    #[test]
    fn test_section_scenario() {
        let a = grok("Topic", "shared text").with_sections(sections(&["Intro", "Main", "Conclusion"]));
        let b = wiki("Topic", "shared text").with_sections(sections(&["Intro", "Main", "References"]));

        let result = compare(&a, &b);

        assert_eq!(result.section_overlap, 0.5);
        assert_eq!(result.unique_to_a, vec!["Conclusion"]);
        assert_eq!(result.unique_to_b, vec!["References"]);
        assert!(result.key_differences.contains(&"Grokipedia has 1 unique section: Conclusion".to_string()));
        assert!(result.key_differences.contains(&"Wikipedia has 1 unique section: References".to_string()));
    }

    #[test]
    fn test_word_count_sign_and_percentage_base() {
        let a = grok("Topic", "one two three four five six");
        let b = wiki("Topic", "one two three four");

        let result = compare(&a, &b);
        assert_eq!(result.word_count_diff, 2);
        assert!((result.word_count_diff_pct - 50.0).abs() < 1e-9);

        let reversed = compare(&b, &a);
        assert_eq!(reversed.word_count_diff, -2);
        assert!((reversed.word_count_diff_pct - (-2.0 / 6.0 * 100.0)).abs() < 1e-9);
    }

    #[test]
    fn test_zero_word_base_gives_zero_percentage() {
        let result = compare(&grok("Topic", "some words here"), &wiki("Topic", ""));
        assert_eq!(result.word_count_diff, 3);
        assert_eq!(result.word_count_diff_pct, 0.0);
        assert_eq!(result.text_similarity, 0.0);
    }

    #[test]
    fn test_empty_pages_degrade_gracefully() {
        let result = compare(&PageRecord::default(), &PageRecord::default());

        assert_eq!(result.text_similarity, 0.0);
        assert_eq!(result.similarity_category, SimilarityCategory::Low);
        assert_eq!(result.levenshtein_distance, 0);
        assert!(result.diff_segments.is_empty());
        assert_eq!(result.section_overlap, 0.0);
        assert!(result.unique_to_a.is_empty());
        assert_eq!(result.source_a, "Source A");
        assert_eq!(result.source_b, "Source B");
        assert_eq!(result.key_differences, vec!["Text similarity: 0.00% (low)"]);
    }

    #[test]
    fn test_key_differences_order_and_phrasing() {
        let a = grok("Topic", &"alpha beta gamma delta ".repeat(5))
            .with_sections(sections(&["Intro", "Zeta", "Eta", "Theta", "Iota"]))
            .with_citations(citations(2));
        let b = wiki("Topic", &"alpha beta gamma delta ".repeat(10))
            .with_sections(sections(&["Intro", "References"]))
            .with_citations(citations(12))
            .with_infobox(Some(Infobox::from([("Born".to_string(), "1900".to_string())])));

        let result = compare(&a, &b);
        let diffs = &result.key_differences;

        assert!(diffs[0].starts_with("Text similarity: "));
        assert!(diffs[0].ends_with(&format!("({})", result.similarity_category)));
        assert_eq!(diffs[1], "Wikipedia version is 50.0% longer (40 vs 20 words)");
        assert_eq!(diffs[2], "Wikipedia has 10 more citations (12 vs 2)");
        assert_eq!(diffs[3], "Grokipedia has 4 unique sections: Eta, Iota, Theta (and 1 more)");
        assert_eq!(diffs[4], "Wikipedia has 1 unique section: References");
        assert_eq!(diffs[5], "Wikipedia has an infobox, Grokipedia does not");
        assert_eq!(diffs.len(), 6);
    }

    #[test]
    fn test_key_differences_name_side_a_when_larger() {
        let a = grok("Topic", &"word ".repeat(200))
            .with_citations(citations(9))
            .with_infobox(Some(Infobox::new()));
        let b = wiki("Topic", &"word ".repeat(100));

        let diffs = compare(&a, &b).key_differences;
        assert!(diffs.contains(&"Grokipedia version is 100.0% longer (200 vs 100 words)".to_string()));
        assert!(diffs.contains(&"Grokipedia has 9 more citations (9 vs 0)".to_string()));
        assert!(diffs.contains(&"Grokipedia has an infobox, Wikipedia does not".to_string()));
    }

    #[test]
    fn test_thresholds_are_strict() {
        // 25% longer and 5 more citations sit exactly on the thresholds.
        let a = grok("Topic", &"word ".repeat(125)).with_citations(citations(5));
        let b = wiki("Topic", &"word ".repeat(100));

        let diffs = compare(&a, &b).key_differences;
        assert_eq!(diffs.len(), 1);
    }

    #[test]
    fn test_passthrough_fields() {
        let modified = "2024-05-01T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let mut a = grok("Topic", "text").with_last_modified(Some(modified));
        a.external_links = vec!["https://a.example".into(), "https://b.example".into()];
        let b = wiki("Topic", "text");

        let result = compare(&a, &b);
        assert_eq!(result.last_modified_a, Some(modified));
        assert_eq!(result.last_modified_b, None);
        assert_eq!(result.external_links_a, 2);
        assert_eq!(result.external_links_b, 0);
        assert_eq!(result.topic, "Topic");
    }

    #[test]
    fn test_similarity_symmetric_but_diff_labels_swap() {
        let a = grok("Topic", "The cat sat on the mat today");
        let b = wiki("Topic", "The cat sat on the mat");

        let forward = compare(&a, &b);
        let backward = compare(&b, &a);

        assert_eq!(forward.text_similarity, backward.text_similarity);
        assert!(forward.diff_segments.iter().any(|s| s.kind == DiffKind::Insert));
        assert!(backward.diff_segments.iter().any(|s| s.kind == DiffKind::Delete));
    }

    #[test]
    fn test_set_category_marks_both_pages() {
        let mut result = compare(&grok("Topic", "x"), &wiki("Topic", "x"));
        assert_eq!(result.category(), None);
        result.set_category("science");
        assert_eq!(result.page_a.category(), Some("science"));
        assert_eq!(result.page_b.category(), Some("science"));
    }

    #[test]
    fn test_deadline_config() {
        assert_eq!(ComparatorConfig::default().diff_deadline, Some(DEFAULT_DIFF_DEADLINE));
        assert_eq!(ComparatorConfig::builder().no_diff_deadline().build().diff_deadline, None);

        let config = ComparatorConfig::builder().diff_deadline(Duration::from_secs(10)).build();
        let comparator = PageComparator::with_config(config);
        let text = "identical body text";
        let result = comparator.compare(&grok("Topic", text), &wiki("Topic", text));
        assert_eq!(result.text_similarity, 1.0);
    }

    /// A long article and a revision with every tenth word rewritten.
    fn long_revision(words: usize) -> (String, String) {
        let original: Vec<String> = (0..words).map(|i| format!("term{i}")).collect();
        let revised: Vec<String> =
            (0..words).map(|i| if i % 10 == 5 { format!("edit{i}") } else { format!("term{i}") }).collect();
        (original.join(" "), revised.join(" "))
    }

    #[test]
    fn test_short_deadline_keeps_long_pages_high() {
        let (original, revised) = long_revision(2000);
        let comparator =
            PageComparator::with_config(ComparatorConfig::builder().diff_deadline(Duration::from_millis(1)).build());

        let forward = comparator.compare(&grok("Topic", &revised), &wiki("Topic", &original));
        let backward = comparator.compare(&grok("Topic", &original), &wiki("Topic", &revised));

        assert_eq!(forward.similarity_category, SimilarityCategory::High, "similarity={}", forward.text_similarity);
        assert_eq!(backward.similarity_category, SimilarityCategory::High, "similarity={}", backward.text_similarity);
        assert!(forward.key_differences[0].ends_with("(high)"));
    }

    #[test]
    fn test_default_comparison_of_unrelated_long_pages_is_bounded() {
        // Few distinct words, so nothing anchors the alignment.
        let vocabulary = ["river", "stone", "light", "order", "field", "paper", "metal", "voice"];
        let a: Vec<&str> = (0..12_000).map(|i| vocabulary[(i * 3 + i / 7) % vocabulary.len()]).collect();
        let b: Vec<&str> = (0..12_000).map(|i| vocabulary[(i * 5 + i / 3) % vocabulary.len()]).collect();
        let (a, b) = (a.join(" "), b.join(" "));

        let started = std::time::Instant::now();
        let result = compare(&grok("Topic", &a), &wiki("Topic", &b));
        let elapsed = started.elapsed();

        assert!(elapsed < Duration::from_secs(30), "took {:?}", elapsed);
        assert!((0.0..=1.0).contains(&result.text_similarity));
        assert!(!result.diff_segments.is_empty());
    }

    #[test]
    fn test_result_serializes() {
        let result = compare(&grok("Topic", "a b c"), &wiki("Topic", "a b d"));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["similarity_category"], serde_json::json!(result.similarity_category.as_str()));
        assert_eq!(json["page_a"]["source"], "Grokipedia");
    }
}
