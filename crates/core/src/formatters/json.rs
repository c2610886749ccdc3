use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::compare::{ComparisonResult, SimilarityCategory};

/// Configuration for JSON output
#[derive(Debug, Clone, Default)]
pub struct JsonConfig {
    /// Pretty print JSON output
    pub pretty: bool,
}

/// Flattened per-topic record written by the report export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub topic: String,
    pub source_a: String,
    pub source_b: String,
    pub text_similarity: f64,
    pub similarity_category: SimilarityCategory,
    pub word_count_a: usize,
    pub word_count_b: usize,
    pub word_count_diff: i64,
    pub word_count_diff_pct: f64,
    pub citation_count_a: usize,
    pub citation_count_b: usize,
    pub section_overlap: f64,
    pub unique_to_a: Vec<String>,
    pub unique_to_b: Vec<String>,
    pub key_differences: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl From<&ComparisonResult> for ExportRecord {
    fn from(result: &ComparisonResult) -> Self {
        Self {
            topic: result.topic.clone(),
            source_a: result.source_a.clone(),
            source_b: result.source_b.clone(),
            text_similarity: result.text_similarity,
            similarity_category: result.similarity_category,
            word_count_a: result.page_a.word_count,
            word_count_b: result.page_b.word_count,
            word_count_diff: result.word_count_diff,
            word_count_diff_pct: result.word_count_diff_pct,
            citation_count_a: result.citation_count_a,
            citation_count_b: result.citation_count_b,
            section_overlap: result.section_overlap,
            unique_to_a: result.unique_to_a.clone(),
            unique_to_b: result.unique_to_b.clone(),
            key_differences: result.key_differences.clone(),
            timestamp: result.timestamp,
        }
    }
}

/// Compact record saved by a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedResult {
    pub topic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub text_similarity: f64,
    pub similarity_category: SimilarityCategory,
    pub word_count_diff: i64,
    pub citation_diff: i64,
    pub section_overlap: f64,
    pub key_differences: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl From<&ComparisonResult> for SavedResult {
    fn from(result: &ComparisonResult) -> Self {
        Self {
            topic: result.topic.clone(),
            category: result.category().map(str::to_string),
            text_similarity: result.text_similarity,
            similarity_category: result.similarity_category,
            word_count_diff: result.word_count_diff,
            citation_diff: result.citation_diff,
            section_overlap: result.section_overlap,
            key_differences: result.key_differences.clone(),
            timestamp: result.timestamp,
        }
    }
}

pub fn export_records(results: &[ComparisonResult]) -> Vec<ExportRecord> {
    results.iter().map(ExportRecord::from).collect()
}

pub fn saved_results(results: &[ComparisonResult]) -> Vec<SavedResult> {
    results.iter().map(SavedResult::from).collect()
}

fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String> {
    if pretty { Ok(serde_json::to_string_pretty(value)?) } else { Ok(serde_json::to_string(value)?) }
}

/// Convert a batch of results to a JSON array of [`ExportRecord`]s
pub fn convert_results_to_json(results: &[ComparisonResult], pretty: bool) -> Result<String> {
    to_json(&export_records(results), pretty)
}

/// Convert a batch of results to a JSON array of [`SavedResult`]s
pub fn convert_saved_results_to_json(results: &[ComparisonResult], pretty: bool) -> Result<String> {
    to_json(&saved_results(results), pretty)
}

/// Full single comparison, pages and diff segments included
pub fn result_to_json(result: &ComparisonResult, pretty: bool) -> Result<String> {
    to_json(result, pretty)
}

/// JSON formatter with configurable options
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    config: JsonConfig,
}

impl JsonFormatter {
    pub fn new(config: JsonConfig) -> Self {
        Self { config }
    }

    pub fn export(&self, results: &[ComparisonResult]) -> Result<String> {
        convert_results_to_json(results, self.config.pretty)
    }

    pub fn saved(&self, results: &[ComparisonResult]) -> Result<String> {
        convert_saved_results_to_json(results, self.config.pretty)
    }

    pub fn result(&self, result: &ComparisonResult) -> Result<String> {
        result_to_json(result, self.config.pretty)
    }
}
