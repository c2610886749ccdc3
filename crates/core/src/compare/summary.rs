//! Similarity buckets and the human-readable difference summary.

use serde::{Deserialize, Serialize};

use super::ComparisonResult;

/// Lower bound (inclusive) of the `high` bucket.
pub const HIGH_SIMILARITY: f64 = 0.85;

/// Lower bound (inclusive) of the `medium` bucket.
pub const MEDIUM_SIMILARITY: f64 = 0.60;

/// Word-count percentage difference that must be exceeded to be reported.
pub const WORD_COUNT_PCT_THRESHOLD: f64 = 25.0;

/// Citation-count difference that must be exceeded to be reported.
pub const CITATION_DIFF_THRESHOLD: i64 = 5;

/// Unique section titles named per side in the summary.
pub const MAX_NAMED_SECTIONS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityCategory {
    High,
    Medium,
    Low,
}

impl SimilarityCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimilarityCategory::High => "high",
            SimilarityCategory::Medium => "medium",
            SimilarityCategory::Low => "low",
        }
    }
}

impl std::fmt::Display for SimilarityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Buckets a similarity ratio. Each bucket includes its lower bound.
pub fn categorize(similarity: f64) -> SimilarityCategory {
    if similarity >= HIGH_SIMILARITY {
        SimilarityCategory::High
    } else if similarity >= MEDIUM_SIMILARITY {
        SimilarityCategory::Medium
    } else {
        SimilarityCategory::Low
    }
}

/// Ordered, human-readable notes on how the two pages differ.
///
/// The similarity line always comes first. The remaining notes appear in a
/// fixed order and only when their threshold is strictly exceeded.
pub fn key_differences(result: &ComparisonResult) -> Vec<String> {
    let name_a = result.source_a.as_str();
    let name_b = result.source_b.as_str();

    let mut differences =
        vec![format!("Text similarity: {:.2}% ({})", result.text_similarity * 100.0, result.similarity_category)];

    if result.word_count_diff_pct.abs() > WORD_COUNT_PCT_THRESHOLD {
        let (longer, longer_count, shorter_count) = if result.word_count_diff > 0 {
            (name_a, result.page_a.word_count, result.page_b.word_count)
        } else {
            (name_b, result.page_b.word_count, result.page_a.word_count)
        };
        differences.push(format!(
            "{longer} version is {:.1}% longer ({longer_count} vs {shorter_count} words)",
            result.word_count_diff_pct.abs()
        ));
    }

    if result.citation_diff.abs() > CITATION_DIFF_THRESHOLD {
        let (more, more_count, fewer_count) = if result.citation_diff > 0 {
            (name_a, result.citation_count_a, result.citation_count_b)
        } else {
            (name_b, result.citation_count_b, result.citation_count_a)
        };
        differences.push(format!(
            "{more} has {} more citations ({more_count} vs {fewer_count})",
            result.citation_diff.unsigned_abs()
        ));
    }

    if let Some(line) = unique_sections_line(name_a, &result.unique_to_a) {
        differences.push(line);
    }
    if let Some(line) = unique_sections_line(name_b, &result.unique_to_b) {
        differences.push(line);
    }

    match (result.has_infobox_a, result.has_infobox_b) {
        (true, false) => differences.push(format!("{name_a} has an infobox, {name_b} does not")),
        (false, true) => differences.push(format!("{name_b} has an infobox, {name_a} does not")),
        _ => {}
    }

    differences
}

fn unique_sections_line(source: &str, unique: &[String]) -> Option<String> {
    if unique.is_empty() {
        return None;
    }

    let named = unique.iter().take(MAX_NAMED_SECTIONS).map(String::as_str).collect::<Vec<_>>().join(", ");
    let noun = if unique.len() == 1 { "section" } else { "sections" };
    let mut line = format!("{source} has {} unique {noun}: {named}", unique.len());
    if unique.len() > MAX_NAMED_SECTIONS {
        line.push_str(&format!(" (and {} more)", unique.len() - MAX_NAMED_SECTIONS));
    }
    Some(line)
}
