//! Readability and bias heuristics for page text.
//!
//! These are simple lexical measures: word lists and counts, no
//! language model. They are meant for comparing two pages on the same topic,
//! not for scoring a page in isolation.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

const LOADED_WORDS: &[&str] = &[
    "obviously",
    "clearly",
    "undoubtedly",
    "certainly",
    "definitely",
    "notorious",
    "infamous",
    "brilliant",
    "terrible",
    "amazing",
    "incredible",
    "outrageous",
    "shocking",
    "stunning",
    "remarkable",
];

const HEDGE_PHRASES: &[&str] = &[
    "some say",
    "many believe",
    "it is said",
    "allegedly",
    "reportedly",
    "supposedly",
    "arguably",
    "possibly",
    "perhaps",
    "maybe",
    "some people",
    "critics argue",
    "supporters claim",
];

const FIRST_PERSON: &[&str] = &["i", "me", "my", "mine", "we", "us", "our", "ours"];

const POSITIVE_WORDS: &[&str] = &[
    "good",
    "great",
    "excellent",
    "positive",
    "successful",
    "beneficial",
    "important",
    "significant",
    "valuable",
    "notable",
    "remarkable",
    "innovative",
    "leading",
    "prominent",
    "influential",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad",
    "poor",
    "negative",
    "failed",
    "harmful",
    "detrimental",
    "insignificant",
    "minor",
    "controversial",
    "criticized",
    "disputed",
    "questionable",
    "problematic",
    "flawed",
    "inferior",
];

static SENTENCE_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]+").expect("valid sentence regex"));

/// Readability and sourcing measures for one text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// Flesch Reading Ease clamped to `[0, 100]`; higher reads easier.
    pub readability: f64,
    /// Citations per 1000 words.
    pub citation_density: f64,
    /// Mean words per sentence.
    pub avg_sentence_length: f64,
    /// `[0, 1]`, from mean word length and mean sentence length.
    pub complexity: f64,
}

/// Lexical bias indicators for one text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BiasMetrics {
    /// `[-1, 1]`, from positive and negative word counts.
    pub sentiment_polarity: f64,
    /// `[0, 1]`, from loaded, first-person and hedge counts per word.
    pub subjectivity: f64,
    pub loaded_language_count: usize,
    pub first_person_count: usize,
    pub hedge_words_count: usize,
}

/// Field-wise `A − B` differences of [`QualityMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityComparison {
    pub readability_diff: f64,
    pub citation_density_diff: f64,
    pub complexity_diff: f64,
    pub sentence_length_diff: f64,
}

/// Field-wise `A − B` differences of [`BiasMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BiasComparison {
    pub sentiment_diff: f64,
    pub subjectivity_diff: f64,
    pub loaded_language_diff: i64,
    pub first_person_diff: i64,
    pub hedge_words_diff: i64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsAnalyzer;

impl MetricsAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn quality_metrics(&self, text: &str, citation_count: usize) -> QualityMetrics {
        let word_count = text.split_whitespace().count();
        if word_count == 0 {
            return QualityMetrics::default();
        }

        QualityMetrics {
            readability: readability(text),
            citation_density: citation_count as f64 / word_count as f64 * 1000.0,
            avg_sentence_length: avg_sentence_length(text),
            complexity: complexity(text),
        }
    }

    pub fn bias_metrics(&self, text: &str) -> BiasMetrics {
        if text.is_empty() {
            return BiasMetrics::default();
        }

        let lower = text.to_lowercase();
        let words: Vec<&str> = lower.split_whitespace().collect();

        let loaded_language_count = count_phrases(&lower, LOADED_WORDS);
        let hedge_words_count = count_phrases(&lower, HEDGE_PHRASES);
        let first_person_count = words.iter().filter(|w| FIRST_PERSON.contains(w)).count();

        let subjectivity = if words.is_empty() {
            0.0
        } else {
            let indicators = (loaded_language_count + first_person_count + hedge_words_count) as f64;
            (indicators / words.len() as f64 * 10.0).min(1.0)
        };

        BiasMetrics {
            sentiment_polarity: sentiment(&lower),
            subjectivity,
            loaded_language_count,
            first_person_count,
            hedge_words_count,
        }
    }

    pub fn compare_quality(&self, a: &QualityMetrics, b: &QualityMetrics) -> QualityComparison {
        QualityComparison {
            readability_diff: a.readability - b.readability,
            citation_density_diff: a.citation_density - b.citation_density,
            complexity_diff: a.complexity - b.complexity,
            sentence_length_diff: a.avg_sentence_length - b.avg_sentence_length,
        }
    }

    pub fn compare_bias(&self, a: &BiasMetrics, b: &BiasMetrics) -> BiasComparison {
        BiasComparison {
            sentiment_diff: a.sentiment_polarity - b.sentiment_polarity,
            subjectivity_diff: a.subjectivity - b.subjectivity,
            loaded_language_diff: a.loaded_language_count as i64 - b.loaded_language_count as i64,
            first_person_diff: a.first_person_count as i64 - b.first_person_count as i64,
            hedge_words_diff: a.hedge_words_count as i64 - b.hedge_words_count as i64,
        }
    }
}

/// Non-overlapping substring occurrences of every phrase.
fn count_phrases(text: &str, phrases: &[&str]) -> usize {
    phrases.iter().map(|phrase| text.matches(phrase).count()).sum()
}

fn split_sentences(text: &str) -> Vec<&str> {
    SENTENCE_END.split(text).map(str::trim).filter(|s| !s.is_empty()).collect()
}

fn readability(text: &str) -> f64 {
    let sentences = split_sentences(text).len();
    let words: Vec<&str> = text.split_whitespace().collect();
    if sentences == 0 || words.is_empty() {
        return 0.0;
    }

    let syllables: usize = words.iter().map(|w| count_syllables(w)).sum();
    let words_per_sentence = words.len() as f64 / sentences as f64;
    let syllables_per_word = syllables as f64 / words.len() as f64;

    (206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word).clamp(0.0, 100.0)
}

fn avg_sentence_length(text: &str) -> f64 {
    let sentences = split_sentences(text);
    if sentences.is_empty() {
        return 0.0;
    }

    let words: usize = sentences.iter().map(|s| s.split_whitespace().count()).sum();
    words as f64 / sentences.len() as f64
}

fn complexity(text: &str) -> f64 {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return 0.0;
    }

    let avg_word_length = words.iter().map(|w| w.chars().count()).sum::<usize>() as f64 / words.len() as f64;
    let word_complexity = (avg_word_length / 10.0).min(1.0);
    let sentence_complexity = (avg_sentence_length(text) / 30.0).min(1.0);

    (word_complexity + sentence_complexity) / 2.0
}

/// Vowel-group count, minus a trailing silent `e`, at least 1.
fn count_syllables(word: &str) -> usize {
    let word = word.to_lowercase();
    let mut count = 0usize;
    let mut previous_was_vowel = false;

    for c in word.chars() {
        let is_vowel = "aeiouy".contains(c);
        if is_vowel && !previous_was_vowel {
            count += 1;
        }
        previous_was_vowel = is_vowel;
    }

    if word.ends_with('e') {
        count = count.saturating_sub(1);
    }

    count.max(1)
}

fn sentiment(lower: &str) -> f64 {
    let positive = count_phrases(lower, POSITIVE_WORDS) as f64;
    let negative = count_phrases(lower, NEGATIVE_WORDS) as f64;
    let total = positive + negative;

    if total == 0.0 { 0.0 } else { (positive - negative) / total }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("cat", 1)]
    #[case("table", 1)]
    #[case("banana", 3)]
    #[case("the", 1)]
    #[case("rhythm", 1)]
    #[case("beautiful", 3)]
    fn test_count_syllables(#[case] word: &str, #[case] expected: usize) {
        assert_eq!(count_syllables(word), expected);
    }

    #[test]
    fn test_empty_text_gives_zero_metrics() {
        let analyzer = MetricsAnalyzer::new();
        assert_eq!(analyzer.quality_metrics("", 10), QualityMetrics::default());
        assert_eq!(analyzer.bias_metrics(""), BiasMetrics::default());
        assert_eq!(analyzer.quality_metrics("   ", 3), QualityMetrics::default());
    }

    #[test]
    fn test_quality_metrics() {
        let text = "The cat sat. The dog ran far away.";
        let metrics = MetricsAnalyzer::new().quality_metrics(text, 2);

        assert!((metrics.citation_density - 2.0 / 8.0 * 1000.0).abs() < 1e-9);
        assert!((metrics.avg_sentence_length - 4.0).abs() < 1e-9);
        assert!((0.0..=100.0).contains(&metrics.readability));
        assert!((0.0..=1.0).contains(&metrics.complexity));
    }

    #[test]
    fn test_readability_is_clamped() {
        let dense = "Incomprehensibilities characteristically institutionalization".repeat(3);
        assert_eq!(readability(&dense), 0.0);
        assert_eq!(readability("Go. Run. Sit."), 100.0);
    }

    #[test]
    fn test_bias_counts() {
        let text = "Obviously we think it is brilliant. Some say I was wrong, allegedly.";
        let metrics = MetricsAnalyzer::new().bias_metrics(text);

        assert_eq!(metrics.loaded_language_count, 2);
        assert_eq!(metrics.first_person_count, 2);
        assert_eq!(metrics.hedge_words_count, 2);
        assert_eq!(metrics.subjectivity, 1.0);
    }

    #[test]
    fn test_first_person_matches_whole_tokens_only() {
        let metrics = MetricsAnalyzer::new().bias_metrics("Imagine using museums in Ohio.");
        assert_eq!(metrics.first_person_count, 0);
    }

    #[test]
    fn test_sentiment_polarity() {
        let analyzer = MetricsAnalyzer::new();
        assert_eq!(analyzer.bias_metrics("A good and excellent result.").sentiment_polarity, 1.0);
        assert_eq!(analyzer.bias_metrics("A bad, flawed result.").sentiment_polarity, -1.0);
        assert_eq!(analyzer.bias_metrics("A good but flawed result.").sentiment_polarity, 0.0);
        assert_eq!(analyzer.bias_metrics("A neutral result.").sentiment_polarity, 0.0);
    }

    #[test]
    fn test_comparisons_are_a_minus_b() {
        let analyzer = MetricsAnalyzer::new();
        let a = QualityMetrics { readability: 60.0, citation_density: 5.0, avg_sentence_length: 20.0, complexity: 0.5 };
        let b = QualityMetrics { readability: 50.0, citation_density: 8.0, avg_sentence_length: 15.0, complexity: 0.4 };

        let diff = analyzer.compare_quality(&a, &b);
        assert_eq!(diff.readability_diff, 10.0);
        assert_eq!(diff.citation_density_diff, -3.0);
        assert_eq!(diff.sentence_length_diff, 5.0);

        let a = BiasMetrics { loaded_language_count: 1, hedge_words_count: 4, ..Default::default() };
        let b = BiasMetrics { loaded_language_count: 3, hedge_words_count: 1, ..Default::default() };
        let diff = analyzer.compare_bias(&a, &b);
        assert_eq!(diff.loaded_language_diff, -2);
        assert_eq!(diff.hedge_words_diff, 3);
    }
}
