//! Timestamped report files in an output directory.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;

use super::json::convert_results_to_json;
use super::text::TextReportFormatter;
use crate::Result;
use crate::compare::ComparisonResult;

const MAX_TOPIC_CHARS: usize = 50;

/// Writes summary, detailed and JSON reports under one directory.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
    formatter: TextReportFormatter,
}

impl ReportWriter {
    /// Creates the output directory if it does not exist yet.
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        Self::with_formatter(output_dir, TextReportFormatter::default())
    }

    pub fn with_formatter(output_dir: impl Into<PathBuf>, formatter: TextReportFormatter) -> Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir, formatter })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn write_summary(&self, results: &[ComparisonResult]) -> Result<PathBuf> {
        let path = self.output_dir.join(format!("summary_report_{}.txt", timestamp()));
        fs::write(&path, self.formatter.summary_report(results))?;
        tracing::info!(path = %path.display(), "wrote summary report");
        Ok(path)
    }

    pub fn write_detailed(&self, result: &ComparisonResult) -> Result<PathBuf> {
        let name = format!("detailed_{}_{}.txt", safe_file_stem(&result.topic), timestamp());
        let path = self.output_dir.join(name);
        fs::write(&path, self.formatter.detailed_report(result))?;
        tracing::info!(path = %path.display(), topic = %result.topic, "wrote detailed report");
        Ok(path)
    }

    pub fn write_json_export(&self, results: &[ComparisonResult]) -> Result<PathBuf> {
        let path = self.output_dir.join(format!("comparison_results_{}.json", timestamp()));
        fs::write(&path, convert_results_to_json(results, true)?)?;
        tracing::info!(path = %path.display(), "wrote JSON export");
        Ok(path)
    }
}

fn timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Replaces anything but ASCII letters and digits with `_`, keeping 50 chars.
fn safe_file_stem(topic: &str) -> String {
    topic.chars().take(MAX_TOPIC_CHARS).map(|c| if c.is_ascii_alphanumeric() { c } else { '_' }).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::compare;
    use crate::page::PageRecord;

    fn result(topic: &str) -> ComparisonResult {
        compare(&PageRecord::new(topic, "", "some text here"), &PageRecord::new(topic, "", "some other text"))
    }

    #[test]
    fn test_safe_file_stem() {
        assert_eq!(safe_file_stem("C++ (language)"), "C____language_");
        assert_eq!(safe_file_stem(&"x".repeat(80)).len(), 50);
    }

    #[test]
    fn test_creates_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("reports/nested");
        let writer = ReportWriter::new(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(writer.output_dir(), nested);
    }

    #[test]
    fn test_writes_all_reports() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path()).unwrap();
        let results = vec![result("Ada Lovelace")];

        let summary = writer.write_summary(&results).unwrap();
        let detailed = writer.write_detailed(&results[0]).unwrap();
        let export = writer.write_json_export(&results).unwrap();

        let summary_name = summary.file_name().unwrap().to_string_lossy().into_owned();
        assert!(summary_name.starts_with("summary_report_"));
        assert!(summary_name.ends_with(".txt"));
        assert!(fs::read_to_string(&summary).unwrap().contains("Total Pages Analyzed: 1"));

        let detailed_name = detailed.file_name().unwrap().to_string_lossy().into_owned();
        assert!(detailed_name.starts_with("detailed_Ada_Lovelace_"));
        assert!(fs::read_to_string(&detailed).unwrap().contains("DETAILED COMPARISON: Ada Lovelace"));

        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&export).unwrap()).unwrap();
        assert_eq!(json[0]["topic"], "Ada Lovelace");
    }
}
