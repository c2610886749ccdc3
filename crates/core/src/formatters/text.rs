//! Plain-text comparison reports.

use chrono::Local;

use crate::compare::{ComparisonResult, DiffKind, SimilarityCategory};
use crate::metrics::MetricsAnalyzer;
use crate::text::truncate_chars;

const RULE_WIDTH: usize = 80;
const TABLE_WIDTH: usize = 75;
const TOP_N: usize = 10;
const SAMPLE_SEGMENTS: usize = 10;
const SAMPLE_CHARS: usize = 200;

/// Configuration for plain text reports
#[derive(Debug, Clone)]
pub struct TextReportConfig {
    /// Print a "Generated:" line with the local time
    pub include_timestamp: bool,
    /// Append readability and bias tables to detailed reports
    pub include_quality_metrics: bool,
}

impl Default for TextReportConfig {
    fn default() -> Self {
        Self { include_timestamp: true, include_quality_metrics: true }
    }
}

/// Renders batch summaries and single-topic reports
#[derive(Debug, Clone, Default)]
pub struct TextReportFormatter {
    config: TextReportConfig,
    analyzer: MetricsAnalyzer,
}

impl TextReportFormatter {
    pub fn new(config: TextReportConfig) -> Self {
        Self { config, analyzer: MetricsAnalyzer::new() }
    }

    /// Summary of a whole batch of comparisons.
    pub fn summary_report(&self, results: &[ComparisonResult]) -> String {
        let Some(first) = results.first() else {
            return "No comparison results to report.".to_string();
        };
        let (name_a, name_b) = (first.source_a.as_str(), first.source_b.as_str());

        let mut lines = vec![rule()];
        lines.push(format!("{} VS {} COMPARISON REPORT", name_a.to_uppercase(), name_b.to_uppercase()));
        lines.push(rule());
        if self.config.include_timestamp {
            lines.push(format!("Generated: {}", now()));
        }
        lines.push(format!("Total Pages Analyzed: {}", results.len()));
        lines.push(rule());
        lines.push(String::new());

        section(&mut lines, "OVERALL STATISTICS", overall_stats(results));
        section(&mut lines, "SIMILARITY DISTRIBUTION", similarity_distribution(results));
        section(&mut lines, "CONTENT ANALYSIS", content_analysis(results, name_a, name_b));
        section(&mut lines, "NOTABLE DIFFERENCES", notable_differences(results, name_a, name_b));

        let mut by_similarity: Vec<&ComparisonResult> = results.iter().collect();
        by_similarity.sort_by(|a, b| b.text_similarity.total_cmp(&a.text_similarity));
        section(&mut lines, "TOP 10 MOST SIMILAR PAGES", ranked(by_similarity.iter().copied()));
        section(&mut lines, "TOP 10 MOST DIFFERENT PAGES", ranked(by_similarity.iter().rev().copied()));

        lines.push(rule());
        lines.push("END OF REPORT".to_string());
        lines.push(rule());

        lines.join("\n")
    }

    /// Everything known about one comparison.
    pub fn detailed_report(&self, result: &ComparisonResult) -> String {
        let (name_a, name_b) = (result.source_a.as_str(), result.source_b.as_str());

        let mut lines = vec![rule(), format!("DETAILED COMPARISON: {}", result.topic), rule()];
        if self.config.include_timestamp {
            lines.push(format!("Generated: {}", now()));
        }
        if let Some(category) = result.category() {
            lines.push(format!("Category: {category}"));
        }
        lines.push(String::new());

        lines.push("## OVERVIEW".to_string());
        lines.push(format!(
            "Text Similarity: {} ({})",
            percent(result.text_similarity),
            result.similarity_category
        ));
        lines.push(format!("Levenshtein Distance: {}", result.levenshtein_distance));
        lines.push(String::new());

        lines.push("## CONTENT METRICS".to_string());
        lines.push(String::new());
        lines.push(table_row("Metric", name_a, name_b, "Difference"));
        lines.push("-".repeat(TABLE_WIDTH));
        lines.push(table_row(
            "Word Count",
            &result.page_a.word_count.to_string(),
            &result.page_b.word_count.to_string(),
            &result.word_count_diff.to_string(),
        ));
        lines.push(table_row(
            "Citations",
            &result.citation_count_a.to_string(),
            &result.citation_count_b.to_string(),
            &result.citation_diff.to_string(),
        ));
        lines.push(table_row(
            "External Links",
            &result.external_links_a.to_string(),
            &result.external_links_b.to_string(),
            &(result.external_links_a as i64 - result.external_links_b as i64).to_string(),
        ));
        lines.push(table_row("Has Infobox", yes_no(result.has_infobox_a), yes_no(result.has_infobox_b), ""));
        lines.push(table_row("Last Modified", &date(result.last_modified_a), &date(result.last_modified_b), ""));
        lines.push(String::new());

        lines.push("## SECTION ANALYSIS".to_string());
        lines.push(format!("Section Overlap: {}", percent(result.section_overlap)));
        lines.push(String::new());
        for (name, unique) in [(name_a, &result.unique_to_a), (name_b, &result.unique_to_b)] {
            if unique.is_empty() {
                continue;
            }
            lines.push(format!("Sections unique to {name}:"));
            lines.extend(unique.iter().map(|title| format!("  - {title}")));
            lines.push(String::new());
        }

        lines.push("## KEY DIFFERENCES".to_string());
        lines.push(String::new());
        lines.extend(result.key_differences.iter().enumerate().map(|(i, diff)| format!("{}. {diff}", i + 1)));
        lines.push(String::new());

        lines.push("## TEXT DIFFERENCES (Sample)".to_string());
        lines.push(String::new());
        for (i, segment) in result.diff_segments.iter().take(SAMPLE_SEGMENTS).enumerate() {
            if segment.kind == DiffKind::Equal {
                continue;
            }
            lines.push(format!("Diff #{} ({}):", i + 1, segment.kind));
            if !segment.text_a.is_empty() {
                lines.push(format!("  {name_a}: {}...", truncate_chars(&segment.text_a, SAMPLE_CHARS)));
            }
            if !segment.text_b.is_empty() {
                lines.push(format!("  {name_b}: {}...", truncate_chars(&segment.text_b, SAMPLE_CHARS)));
            }
            lines.push(String::new());
        }

        if self.config.include_quality_metrics {
            self.quality_tables(&mut lines, result);
        }

        lines.push(rule());
        lines.join("\n")
    }

    fn quality_tables(&self, lines: &mut Vec<String>, result: &ComparisonResult) {
        let (name_a, name_b) = (result.source_a.as_str(), result.source_b.as_str());
        let analyzer = &self.analyzer;

        let quality_a = analyzer.quality_metrics(&result.page_a.text_content, result.citation_count_a);
        let quality_b = analyzer.quality_metrics(&result.page_b.text_content, result.citation_count_b);
        let quality = analyzer.compare_quality(&quality_a, &quality_b);

        lines.push("## QUALITY METRICS".to_string());
        lines.push(String::new());
        lines.push(table_row("Metric", name_a, name_b, "Difference"));
        lines.push("-".repeat(TABLE_WIDTH));
        for (label, a, b, diff) in [
            ("Readability (Flesch)", quality_a.readability, quality_b.readability, quality.readability_diff),
            (
                "Citations per 1000 Words",
                quality_a.citation_density,
                quality_b.citation_density,
                quality.citation_density_diff,
            ),
            (
                "Avg Sentence Length",
                quality_a.avg_sentence_length,
                quality_b.avg_sentence_length,
                quality.sentence_length_diff,
            ),
            ("Complexity", quality_a.complexity, quality_b.complexity, quality.complexity_diff),
        ] {
            lines.push(table_row(label, &format!("{a:.2}"), &format!("{b:.2}"), &format!("{diff:+.2}")));
        }
        lines.push(String::new());

        let bias_a = analyzer.bias_metrics(&result.page_a.text_content);
        let bias_b = analyzer.bias_metrics(&result.page_b.text_content);
        let bias = analyzer.compare_bias(&bias_a, &bias_b);

        lines.push("## BIAS INDICATORS".to_string());
        lines.push(String::new());
        lines.push(table_row("Metric", name_a, name_b, "Difference"));
        lines.push("-".repeat(TABLE_WIDTH));
        lines.push(table_row(
            "Sentiment Polarity",
            &format!("{:.2}", bias_a.sentiment_polarity),
            &format!("{:.2}", bias_b.sentiment_polarity),
            &format!("{:+.2}", bias.sentiment_diff),
        ));
        lines.push(table_row(
            "Subjectivity",
            &format!("{:.2}", bias_a.subjectivity),
            &format!("{:.2}", bias_b.subjectivity),
            &format!("{:+.2}", bias.subjectivity_diff),
        ));
        for (label, a, b, diff) in [
            ("Loaded Language", bias_a.loaded_language_count, bias_b.loaded_language_count, bias.loaded_language_diff),
            ("First Person", bias_a.first_person_count, bias_b.first_person_count, bias.first_person_diff),
            ("Hedge Words", bias_a.hedge_words_count, bias_b.hedge_words_count, bias.hedge_words_diff),
        ] {
            lines.push(table_row(label, &a.to_string(), &b.to_string(), &format!("{diff:+}")));
        }
        lines.push(String::new());
    }
}

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

fn now() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

fn percent(ratio: f64) -> String {
    format!("{:.2}%", ratio * 100.0)
}

fn yes_no(value: bool) -> &'static str {
    if value { "Yes" } else { "No" }
}

fn date(value: Option<chrono::DateTime<chrono::Utc>>) -> String {
    value.map(|dt| dt.format("%Y-%m-%d").to_string()).unwrap_or_else(|| "-".to_string())
}

fn table_row(label: &str, a: &str, b: &str, diff: &str) -> String {
    format!("{label:<30} {a:<15} {b:<15} {diff:<15}").trim_end().to_string()
}

fn section(lines: &mut Vec<String>, title: &str, body: Vec<String>) {
    lines.push(format!("## {title}"));
    lines.push(String::new());
    lines.extend(body);
    lines.push(String::new());
}

fn overall_stats(results: &[ComparisonResult]) -> Vec<String> {
    let n = results.len() as f64;
    let avg_similarity = results.iter().map(|r| r.text_similarity).sum::<f64>() / n;
    let count = |category: SimilarityCategory| results.iter().filter(|r| r.similarity_category == category).count();
    let avg_word_diff = results.iter().map(|r| r.word_count_diff.unsigned_abs() as f64).sum::<f64>() / n;

    vec![
        format!("Average Similarity: {}", percent(avg_similarity)),
        format!("High Similarity: {} pages", count(SimilarityCategory::High)),
        format!("Medium Similarity: {} pages", count(SimilarityCategory::Medium)),
        format!("Low Similarity: {} pages", count(SimilarityCategory::Low)),
        format!("Average Word Count Difference: {avg_word_diff:.0} words"),
    ]
}

fn similarity_distribution(results: &[ComparisonResult]) -> Vec<String> {
    let mut buckets = [0usize; 10];
    for result in results {
        let bucket = ((result.text_similarity * 10.0) as usize).min(9);
        buckets[bucket] += 1;
    }

    let mut lines = vec!["Similarity Distribution (0.0 to 1.0):".to_string()];
    for (i, count) in buckets.iter().enumerate() {
        lines.push(format!(
            "  {:.1}-{:.1}: {} ({count})",
            i as f64 / 10.0,
            (i + 1) as f64 / 10.0,
            "█".repeat(*count)
        ));
    }
    lines
}

fn content_analysis(results: &[ComparisonResult], name_a: &str, name_b: &str) -> Vec<String> {
    let count = |pred: fn(&ComparisonResult) -> bool| results.iter().filter(|r| pred(r)).count();

    vec![
        format!("Pages longer on {name_a}: {}", count(|r| r.word_count_diff > 0)),
        format!("Pages longer on {name_b}: {}", count(|r| r.word_count_diff < 0)),
        format!("Pages with more citations on {name_a}: {}", count(|r| r.citation_diff > 0)),
        format!("Pages with more citations on {name_b}: {}", count(|r| r.citation_diff < 0)),
    ]
}

fn notable_differences(results: &[ComparisonResult], name_a: &str, name_b: &str) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(biggest) = results.iter().max_by(|a, b| a.word_count_diff_pct.abs().total_cmp(&b.word_count_diff_pct.abs()))
    {
        lines.push(format!("Biggest word count difference: {}", biggest.topic));
        lines.push(format!("  {:.1}% difference", biggest.word_count_diff_pct.abs()));
    }

    let sides: [(&str, fn(&ComparisonResult) -> usize); 2] =
        [(name_a, |r| r.unique_to_a.len()), (name_b, |r| r.unique_to_b.len())];
    for (name, unique) in sides {
        let Some(most) = results.iter().max_by_key(|r| unique(r)) else { continue };
        if unique(most) > 0 {
            lines.push(format!("Most unique sections on {name}: {}", most.topic));
            lines.push(format!("  {} unique sections", unique(most)));
        }
    }

    lines
}

fn ranked<'a>(results: impl Iterator<Item = &'a ComparisonResult>) -> Vec<String> {
    results
        .take(TOP_N)
        .enumerate()
        .map(|(i, r)| format!("{}. {}: {} similarity", i + 1, r.topic, percent(r.text_similarity)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::compare;
    use crate::page::{PageRecord, Sections};

    fn formatter() -> TextReportFormatter {
        TextReportFormatter::new(TextReportConfig { include_timestamp: false, ..Default::default() })
    }

    fn result(topic: &str, text_a: &str, text_b: &str) -> ComparisonResult {
        let a = PageRecord::new(topic, "", text_a).with_source("Grokipedia");
        let b = PageRecord::new(topic, "", text_b).with_source("Wikipedia");
        compare(&a, &b)
    }

    fn batch() -> Vec<ComparisonResult> {
        vec![
            result("Same", "identical words here", "identical words here"),
            result("Longer", "one two three four five six seven eight", "one two three four"),
            result("Different", "apples oranges", "zzz qqq xxx"),
        ]
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(formatter().summary_report(&[]), "No comparison results to report.");
    }

    #[test]
    fn test_summary_sections() {
        let report = formatter().summary_report(&batch());

        assert!(report.starts_with(&"=".repeat(80)));
        assert!(report.contains("GROKIPEDIA VS WIKIPEDIA COMPARISON REPORT"));
        assert!(report.contains("Total Pages Analyzed: 3"));
        assert!(!report.contains("Generated:"));
        for heading in [
            "## OVERALL STATISTICS",
            "## SIMILARITY DISTRIBUTION",
            "## CONTENT ANALYSIS",
            "## NOTABLE DIFFERENCES",
            "## TOP 10 MOST SIMILAR PAGES",
            "## TOP 10 MOST DIFFERENT PAGES",
        ] {
            assert!(report.contains(heading), "missing {heading}");
        }
        assert!(report.trim_end().ends_with(&format!("END OF REPORT\n{}", "=".repeat(80))));
    }

    #[test]
    fn test_summary_statistics() {
        let report = formatter().summary_report(&batch());

        assert!(report.contains("High Similarity: 1 pages"));
        assert!(report.contains("Pages longer on Grokipedia: 1"));
        assert!(report.contains("Pages longer on Wikipedia: 1"));
        assert!(report.contains("Biggest word count difference: Longer\n  100.0% difference"));
        assert!(report.contains("  0.9-1.0: █ (1)"));
    }

    #[test]
    fn test_summary_rankings() {
        let report = formatter().summary_report(&batch());
        let similar = report.split("## TOP 10 MOST SIMILAR PAGES").nth(1).unwrap();
        assert!(similar.trim_start().starts_with("1. Same: 100.00% similarity"));

        let different = report.split("## TOP 10 MOST DIFFERENT PAGES").nth(1).unwrap();
        assert!(different.trim_start().starts_with("1. Different:"));
    }

    #[test]
    fn test_detailed_report() {
        let a = PageRecord::new("Topic", "", "The quick brown fox jumps")
            .with_source("Grokipedia")
            .with_sections([("Intro", "x"), ("Legacy", "y")].into_iter().collect::<Sections>());
        let b = PageRecord::new("Topic", "", "The slow brown dog sleeps")
            .with_source("Wikipedia")
            .with_sections([("Intro", "x")].into_iter().collect::<Sections>());
        let mut result = compare(&a, &b);
        result.set_category("animals");

        let report = formatter().detailed_report(&result);

        assert!(report.contains("DETAILED COMPARISON: Topic"));
        assert!(report.contains("Category: animals"));
        assert!(report.contains("Levenshtein Distance: "));
        assert!(report.contains("Metric                         Grokipedia      Wikipedia       Difference"));
        assert!(report.contains("Word Count                     5               5               0"));
        assert!(report.contains("Sections unique to Grokipedia:\n  - Legacy"));
        assert!(!report.contains("Sections unique to Wikipedia:"));
        assert!(report.contains("1. Text similarity: "));
        assert!(report.contains("(delete):\n  Wikipedia: "));
        assert!(report.contains("(insert):\n  Grokipedia: "));
        assert!(report.contains("## QUALITY METRICS"));
        assert!(report.contains("## BIAS INDICATORS"));
    }

    #[test]
    fn test_detailed_report_without_quality() {
        let formatter = TextReportFormatter::new(TextReportConfig {
            include_timestamp: false,
            include_quality_metrics: false,
        });
        let report = formatter.detailed_report(&result("Topic", "a b", "a c"));
        assert!(!report.contains("## QUALITY METRICS"));
        assert!(report.ends_with(&"=".repeat(80)));
    }

    #[test]
    fn test_sample_text_truncated() {
        let long = "w".repeat(450);
        let report = formatter().detailed_report(&result("Topic", &long, "short"));
        let expected = format!("  Grokipedia: {}...", "w".repeat(SAMPLE_CHARS));
        assert!(report.lines().any(|line| line == expected));
    }
}
