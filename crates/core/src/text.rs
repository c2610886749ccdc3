//! Plain-text helpers shared by page sources and the analyzers.

use scraper::Html;

use crate::preprocess::{PreprocessConfig, preprocess_html};

/// Extract clean text from HTML.
///
/// Script, style and noscript content is dropped and every whitespace run
/// collapses to a single space.
pub fn extract_text_from_html(html: &str) -> String {
    let cleaned = preprocess_html(html, &PreprocessConfig::default());
    let document = Html::parse_fragment(&cleaned);
    let raw = document.root_element().text().collect::<String>();
    collapse_whitespace(&raw)
}

/// Collapse whitespace runs to single spaces and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Count whitespace-delimited tokens.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Returns at most `max_chars` characters of `text`, never splitting a character.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
