//! Grokipedia page parsing.
//!
//! Grokipedia markup is less settled than MediaWiki's, so every field is
//! looked up through a list of candidate selectors tried in order.

use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use url::Url;

use super::{
    PageSource, UNKNOWN_TITLE, absolutize_protocol_relative, collect_sections, parse_day_month_year,
    parse_month_day_year, parse_timestamp, wiki_page_url,
};
use crate::Result;
use crate::page::{Citation, Infobox, PageRecord, Sections};
use crate::parse::{Document, Element};
use crate::text::{extract_text_from_html, truncate_chars};

pub const GROKIPEDIA_BASE_URL: &str = "https://grokipedia.com";

const CONTENT_SELECTORS: &[&str] = &["div#content", "div.content", "main", "article", "div#mw-content-text"];
const TITLE_SELECTORS: &[&str] = &["h1#firstHeading", "h1.title", "h1.page-title", "h1", "title"];
const CITATION_SELECTORS: &[&str] = &["sup.reference", "a.citation", "span.citation"];
const INFOBOX_SELECTORS: &[&str] = &["table.infobox", "div.infobox", "aside.infobox"];
const CATEGORY_CONTAINERS: &[&str] = &["div#categories", "div.categories", "div#mw-normal-catlinks", "footer"];
const SKIPPED_HEADINGS: &[&str] = &["contents", "navigation", "menu"];

/// Paragraphs and lists this short are navigation crumbs, not content.
const MIN_BLOCK_CHARS: usize = 10;

/// Reference-list entries are cut to this many characters.
const MAX_REFERENCE_CHARS: usize = 200;

static TITLE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[-–—]\s*Grokipedia.*$").expect("valid title regex"));
static REFERENCES_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"references|bibliography").expect("valid class regex"));
static INFOBOX_CLASS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"info|fact|summary").expect("valid class regex"));
static DATE_CLASS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"date|time|modified").expect("valid class regex"));
static LINK_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"External [Ll]inks?|References?|Sources?").expect("valid heading regex"));

/// Grokipedia, xAI's generated encyclopedia.
#[derive(Debug, Clone)]
pub struct GrokipediaSource {
    base_url: Url,
}

impl GrokipediaSource {
    pub fn new() -> Self {
        Self::with_base_url(Url::parse(GROKIPEDIA_BASE_URL).expect("valid Grokipedia base URL"))
    }

    pub fn with_base_url(base_url: Url) -> Self {
        Self { base_url }
    }

    /// Base URL without a trailing slash, for prefix checks and joining.
    fn origin(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    fn extract_images(&self, content: Element<'_>) -> Vec<String> {
        content
            .select("img")
            .unwrap_or_default()
            .into_iter()
            .filter_map(|img| {
                let src = img.attr("src").filter(|s| !s.is_empty()).or_else(|| img.attr("data-src"))?;
                if src.is_empty() {
                    return None;
                }
                let src = if src.starts_with("//") {
                    absolutize_protocol_relative(src)
                } else if src.starts_with('/') {
                    format!("{}{src}", self.origin())
                } else {
                    src.to_string()
                };
                (!src.ends_with(".svg") && !src.to_lowercase().contains("icon")).then_some(src)
            })
            .collect()
    }

    fn extract_external_links(&self, doc: &Document) -> Vec<String> {
        let mut links = Vec::new();

        for heading in doc.select("h2, h3, h4").unwrap_or_default() {
            if !LINK_HEADING.is_match(&heading.text()) {
                continue;
            }
            let next = heading.next_sibling_elements().find(|el| matches!(el.tag_name().as_str(), "ul" | "ol" | "div"));
            let Some(list) = next else {
                continue;
            };
            links.extend(
                list.select("a[href]")
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|link| link.attr("href"))
                    .filter(|href| href.starts_with("http") && !href.contains(self.origin()))
                    .map(str::to_string),
            );
        }

        links
    }
}

impl Default for GrokipediaSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PageSource for GrokipediaSource {
    fn name(&self) -> &str {
        "Grokipedia"
    }

    fn resolve_url(&self, topic: &str) -> Result<Url> {
        wiki_page_url(&self.base_url, topic)
    }

    fn parse(&self, html: &str, url: &str) -> PageRecord {
        let doc = Document::parse(html);
        let content = doc.select_first_of(CONTENT_SELECTORS);

        if content.is_none() {
            tracing::debug!(url, "no Grokipedia content container found");
        }

        let text_content = content.map(|c| extract_text_from_html(&c.outer_html())).unwrap_or_default();

        let mut record = PageRecord::new(extract_title(&doc), url, text_content)
            .with_source(self.name())
            .with_sections(content.map(extract_sections).unwrap_or_default())
            .with_citations(content.map(extract_citations).unwrap_or_default())
            .with_infobox(extract_infobox(&doc))
            .with_external_links(self.extract_external_links(&doc))
            .with_last_modified(extract_last_modified(&doc));
        record.images = content.map(|c| self.extract_images(c)).unwrap_or_default();
        record.categories = extract_categories(&doc);
        record
    }
}

fn extract_title(doc: &Document) -> String {
    TITLE_SELECTORS
        .iter()
        .filter_map(|sel| doc.select_first(sel))
        .map(|el| TITLE_SUFFIX.replace(el.trimmed_text().as_str(), "").into_owned())
        .find(|title| !title.is_empty())
        .unwrap_or_else(|| UNKNOWN_TITLE.to_string())
}

fn extract_sections(content: Element<'_>) -> Sections {
    let blocks = content.select("h1, h2, h3, h4, p, ul, ol").unwrap_or_default();
    collect_sections(
        blocks,
        |el| matches!(el.tag_name().as_str(), "h1" | "h2" | "h3" | "h4"),
        |heading| {
            let title = heading.trimmed_text();
            if title.is_empty() || SKIPPED_HEADINGS.contains(&title.to_lowercase().as_str()) {
                Some(super::INTRODUCTION.to_string())
            } else {
                Some(title)
            }
        },
        |text| text.chars().count() > MIN_BLOCK_CHARS,
    )
}

fn extract_citations(content: Element<'_>) -> Vec<Citation> {
    let mut citations = Vec::new();

    for selector in CITATION_SELECTORS {
        for reference in content.select(selector).unwrap_or_default() {
            let number = citations.len() + 1;
            let id = match reference.select_first("a").and_then(|link| link.attr("href")) {
                Some(href) => href.replace('#', ""),
                None => format!("ref-{number}"),
            };
            citations.push(Citation { number, id, text: reference.trimmed_text() });
        }
    }

    let reference_list = content
        .select("div, section")
        .unwrap_or_default()
        .into_iter()
        .find(|el| REFERENCES_CLASS.is_match(el.class_attr()));

    if let Some(list) = reference_list {
        let first = citations.len() + 1;
        for (offset, item) in list.select("li, p").unwrap_or_default().into_iter().enumerate() {
            let text = item.trimmed_text();
            if text.is_empty() {
                continue;
            }
            let number = first + offset;
            citations.push(Citation {
                number,
                id: format!("ref-{number}"),
                text: truncate_chars(&text, MAX_REFERENCE_CHARS).to_string(),
            });
        }
    }

    citations
}

fn extract_infobox(doc: &Document) -> Option<Infobox> {
    let table = doc.select_first_of(INFOBOX_SELECTORS).or_else(|| {
        doc.select("table[class]").unwrap_or_default().into_iter().find(|t| INFOBOX_CLASS.is_match(t.class_attr()))
    })?;

    let mut data = Infobox::new();
    for row in table.select("tr").unwrap_or_default() {
        if let (Some(header), Some(value)) = (row.select_first("th, dt"), row.select_first("td, dd")) {
            let key = header.trimmed_text();
            let value = value.trimmed_text();
            if !key.is_empty() && !value.is_empty() {
                data.insert(key, value);
            }
        }
    }

    (!data.is_empty()).then_some(data)
}

fn extract_categories(doc: &Document) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut categories = Vec::new();

    for container in CATEGORY_CONTAINERS.iter().filter_map(|sel| doc.select_first(sel)) {
        for link in container.select("a").unwrap_or_default() {
            let text = link.trimmed_text();
            let lowered = text.to_lowercase();
            if text.is_empty() || lowered == "category" || lowered == "categories" {
                continue;
            }
            if seen.insert(text.clone()) {
                categories.push(text);
            }
        }
    }

    categories
}

fn extract_last_modified(doc: &Document) -> Option<DateTime<Utc>> {
    let by_class = |tag: &str| {
        doc.select(&format!("{tag}[class]"))
            .unwrap_or_default()
            .into_iter()
            .find(|el| DATE_CLASS.is_match(el.class_attr()))
    };

    let candidates = [
        doc.select_first("time"),
        by_class("span"),
        by_class("div"),
        doc.select_first(r#"meta[property="article:modified_time"]"#),
        doc.select_first("li#footer-info-lastmod"),
    ];

    candidates.into_iter().flatten().find_map(|el| date_from_element(&el))
}

fn date_from_element(el: &Element<'_>) -> Option<DateTime<Utc>> {
    ["datetime", "content"]
        .iter()
        .filter_map(|attr| el.attr(attr))
        .find_map(parse_timestamp)
        .or_else(|| {
            let text = el.text();
            parse_day_month_year(&text).or_else(|| parse_month_day_year(&text))
        })
}
