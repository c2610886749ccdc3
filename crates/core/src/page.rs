//! Structured page records produced by page sources.
//!
//! A [`PageRecord`] is the input of the comparison engine: everything the
//! scraping layer managed to pull out of one encyclopedia page.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::text::count_words;

/// A single footnote or reference found on a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// 1-based position in the order citations were found.
    pub number: usize,
    /// Anchor id (href without the leading `#`) or a synthesized `ref-N`.
    pub id: String,
    /// Visible citation text.
    pub text: String,
}

/// One titled section of a page body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub body: String,
}

/// Ordered mapping from section title to section body.
///
/// Titles are unique. Inserting a title that already exists replaces its body
/// in place, so document order is the order titles were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sections(Vec<Section>);

impl Sections {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Inserts or replaces a section body.
    pub fn insert(&mut self, title: impl Into<String>, body: impl Into<String>) {
        let title = title.into();
        let body = body.into();
        match self.0.iter_mut().find(|s| s.title == title) {
            Some(existing) => existing.body = body,
            None => self.0.push(Section { title, body }),
        }
    }

    pub fn get(&self, title: &str) -> Option<&str> {
        self.0.iter().find(|s| s.title == title).map(|s| s.body.as_str())
    }

    pub fn contains(&self, title: &str) -> bool {
        self.0.iter().any(|s| s.title == title)
    }

    /// Section titles in document order.
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|s| s.title.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T: Into<String>, B: Into<String>> FromIterator<(T, B)> for Sections {
    fn from_iter<I: IntoIterator<Item = (T, B)>>(iter: I) -> Self {
        let mut sections = Sections::new();
        for (title, body) in iter {
            sections.insert(title, body);
        }
        sections
    }
}

/// Key/value pairs from a page infobox.
pub type Infobox = BTreeMap<String, String>;

/// Structured representation of one fetched encyclopedia page.
///
/// `word_count` always agrees with `text_content` unless a count was supplied
/// explicitly through [`PageRecord::with_word_count`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Page title, used as the topic key of a comparison.
    pub title: String,

    /// URL the page was fetched from (or a placeholder for local files).
    pub url: String,

    /// Display name of the source that produced the record, e.g. "Wikipedia".
    pub source: String,

    /// Plain-text body with markup removed.
    pub text_content: String,

    pub sections: Sections,
    pub citations: Vec<Citation>,

    /// `None` when the page has no infobox at all.
    pub infobox: Option<Infobox>,

    pub images: Vec<String>,
    pub external_links: Vec<String>,
    pub categories: Vec<String>,
    pub last_modified: Option<DateTime<Utc>>,

    /// Whitespace-delimited token count of `text_content`.
    pub word_count: usize,

    /// Free-form annotations; the batch pipeline stores the sampling category here.
    pub metadata: BTreeMap<String, String>,
}

impl PageRecord {
    /// Creates a record with the given text; `word_count` is derived from it.
    pub fn new(title: impl Into<String>, url: impl Into<String>, text_content: impl Into<String>) -> Self {
        let text_content = text_content.into();
        let word_count = count_words(&text_content);
        Self { title: title.into(), url: url.into(), text_content, word_count, ..Default::default() }
    }

    /// Replaces the body text and recomputes the word count.
    pub fn set_text_content(&mut self, text: impl Into<String>) {
        self.text_content = text.into();
        self.word_count = count_words(&self.text_content);
    }

    /// Overrides the derived word count with an independently supplied one.
    pub fn with_word_count(mut self, word_count: usize) -> Self {
        self.word_count = word_count;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_sections(mut self, sections: Sections) -> Self {
        self.sections = sections;
        self
    }

    pub fn with_citations(mut self, citations: Vec<Citation>) -> Self {
        self.citations = citations;
        self
    }

    pub fn with_infobox(mut self, infobox: Option<Infobox>) -> Self {
        self.infobox = infobox;
        self
    }

    pub fn with_external_links(mut self, links: Vec<String>) -> Self {
        self.external_links = links;
        self
    }

    pub fn with_last_modified(mut self, last_modified: Option<DateTime<Utc>>) -> Self {
        self.last_modified = last_modified;
        self
    }

    pub fn has_infobox(&self) -> bool {
        self.infobox.is_some()
    }

    /// The sampling category attached by the batch pipeline, if any.
    pub fn category(&self) -> Option<&str> {
        self.metadata.get("category").map(String::as_str)
    }
}
