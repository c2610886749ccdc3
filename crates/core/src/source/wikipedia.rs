//! Wikipedia page parsing.

use chrono::{DateTime, Utc};
use url::Url;

use super::{
    PageSource, UNKNOWN_TITLE, absolutize_protocol_relative, collect_sections, parse_day_month_year, wiki_page_url,
};
use crate::Result;
use crate::page::{Citation, Infobox, PageRecord, Sections};
use crate::parse::{Document, Element};
use crate::text::extract_text_from_html;

pub const WIKIPEDIA_BASE_URL: &str = "https://en.wikipedia.org";

/// English Wikipedia (or any MediaWiki site with the same skin).
#[derive(Debug, Clone)]
pub struct WikipediaSource {
    base_url: Url,
}

impl WikipediaSource {
    pub fn new() -> Self {
        Self::with_base_url(Url::parse(WIKIPEDIA_BASE_URL).expect("valid Wikipedia base URL"))
    }

    /// Points the source at another MediaWiki host, e.g. a local mirror.
    pub fn with_base_url(base_url: Url) -> Self {
        Self { base_url }
    }
}

impl Default for WikipediaSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PageSource for WikipediaSource {
    fn name(&self) -> &str {
        "Wikipedia"
    }

    fn resolve_url(&self, topic: &str) -> Result<Url> {
        wiki_page_url(&self.base_url, topic)
    }

    fn parse(&self, html: &str, url: &str) -> PageRecord {
        let doc = Document::parse(html);
        let content = doc.select_first_of(&["div#mw-content-text", "div.mw-parser-output"]);

        if content.is_none() {
            tracing::debug!(url, "no Wikipedia content container found");
        }

        let text_content = content.map(|c| extract_text_from_html(&c.outer_html())).unwrap_or_default();

        let mut record = PageRecord::new(extract_title(&doc), url, text_content)
            .with_source(self.name())
            .with_sections(content.map(extract_sections).unwrap_or_default())
            .with_citations(content.map(extract_citations).unwrap_or_default())
            .with_infobox(extract_infobox(&doc))
            .with_external_links(extract_external_links(&doc))
            .with_last_modified(extract_last_modified(&doc));
        record.images = content.map(extract_images).unwrap_or_default();
        record.categories = extract_categories(&doc);
        record
    }
}

fn extract_title(doc: &Document) -> String {
    if let Some(heading) = doc.select_first("h1#firstHeading") {
        return heading.trimmed_text();
    }
    match doc.title() {
        Some(title) => title.replace(" - Wikipedia", "").trim().to_string(),
        None => UNKNOWN_TITLE.to_string(),
    }
}

fn extract_sections(content: Element<'_>) -> Sections {
    let blocks = content.select("h2, h3, p, ul, ol").unwrap_or_default();
    collect_sections(
        blocks,
        |el| matches!(el.tag_name().as_str(), "h2" | "h3"),
        |heading| {
            let title = match heading.select_first("span.mw-headline") {
                Some(headline) => headline.trimmed_text(),
                None => heading.trimmed_text(),
            };
            (!title.is_empty()).then_some(title)
        },
        |_| true,
    )
}

fn extract_citations(content: Element<'_>) -> Vec<Citation> {
    content
        .select("sup.reference")
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .filter_map(|(i, reference)| {
            let link = reference.select_first("a")?;
            Some(Citation {
                number: i + 1,
                id: link.attr("href").unwrap_or("").replace('#', ""),
                text: reference.trimmed_text(),
            })
        })
        .collect()
}

fn extract_infobox(doc: &Document) -> Option<Infobox> {
    let table = doc.select_first("table.infobox")?;
    let mut data = Infobox::new();

    for row in table.select("tr").unwrap_or_default() {
        if let (Some(header), Some(value)) = (row.select_first("th"), row.select_first("td")) {
            data.insert(header.trimmed_text(), value.trimmed_text());
        }
    }

    (!data.is_empty()).then_some(data)
}

fn extract_images(content: Element<'_>) -> Vec<String> {
    content
        .select("img[src]")
        .unwrap_or_default()
        .into_iter()
        .filter_map(|img| img.attr("src"))
        .filter(|src| !src.is_empty() && !src.ends_with(".svg"))
        .map(absolutize_protocol_relative)
        .collect()
}

fn extract_categories(doc: &Document) -> Vec<String> {
    let Some(catlinks) = doc.select_first("div#mw-normal-catlinks") else {
        return Vec::new();
    };

    catlinks
        .select("a")
        .unwrap_or_default()
        .into_iter()
        .map(|link| link.text())
        .filter(|text| text != "Categories")
        .map(|text| text.trim().to_string())
        .collect()
}

/// Links in the first list after the "External links" heading.
///
/// Handles both the legacy `<h2><span id="External_links">` markup and the
/// current `<div class="mw-heading"><h2 id="External_links">` wrapper.
fn extract_external_links(doc: &Document) -> Vec<String> {
    let Some(marker) = doc.select_first("#External_links") else {
        return Vec::new();
    };

    let heading = if matches!(marker.tag_name().as_str(), "h2" | "h3") {
        Some(marker)
    } else {
        marker.ancestors().find(|el| matches!(el.tag_name().as_str(), "h2" | "h3"))
    };
    let Some(heading) = heading else {
        return Vec::new();
    };

    let anchor = match heading.parent() {
        Some(wrapper) if wrapper.has_class("mw-heading") => wrapper,
        _ => heading,
    };

    let Some(list) = anchor.next_sibling_elements().find(|el| el.tag_name() == "ul") else {
        return Vec::new();
    };

    list.select("a.external")
        .unwrap_or_default()
        .into_iter()
        .filter_map(|link| link.attr("href"))
        .filter(|href| !href.is_empty())
        .map(str::to_string)
        .collect()
}

fn extract_last_modified(doc: &Document) -> Option<DateTime<Utc>> {
    let footer = doc.select_first("li#footer-info-lastmod")?;
    parse_day_month_year(&footer.text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    const ARTICLE: &str = r##"
        <html>
        <head><title>Ada Lovelace - Wikipedia</title></head>
        <body>
            <h1 id="firstHeading">Ada Lovelace</h1>
            <div id="mw-content-text"><div class="mw-parser-output">
                <table class="infobox">
                    <tr><th colspan="2">Ada Lovelace</th></tr>
                    <tr><th>Born</th><td>10 December 1815</td></tr>
                    <tr><th>Known for</th><td>Mathematics, computing</td></tr>
                </table>
                <p>Ada Lovelace was an English mathematician.<sup class="reference"><a href="#cite_note-1">[1]</a></sup></p>
                <p>She worked on the Analytical Engine.<sup class="reference"><a href="#cite_note-2">[2]</a></sup></p>
                <h2><span class="mw-headline" id="Early_life">Early life</span><span class="mw-editsection">[edit]</span></h2>
                <p>Born in London.</p>
                <ul><li>Daughter of Lord Byron</li></ul>
                <div class="mw-heading mw-heading2"><h2 id="External_links">External links</h2></div>
                <ul>
                    <li><a class="external text" href="https://www.computerhistory.org/">Computer History</a></li>
                    <li><a href="/wiki/Internal">Internal</a></li>
                </ul>
                <img src="//upload.wikimedia.org/ada.jpg">
                <img src="//upload.wikimedia.org/icon.svg">
                <sup class="reference">[citation needed]</sup>
            </div></div>
            <div id="mw-normal-catlinks"><a href="/wiki/Help:Category">Categories</a>: <ul><li><a>1815 births</a></li><li><a>English mathematicians</a></li></ul></div>
            <ul id="footer-info"><li id="footer-info-lastmod"> This page was last edited on 31 October 2024, at 10:00 (UTC).</li></ul>
        </body>
        </html>
    "##;

    fn parse_article() -> PageRecord {
        WikipediaSource::new().parse(ARTICLE, "https://en.wikipedia.org/wiki/Ada_Lovelace")
    }

    #[test]
    fn test_resolve_url() {
        let url = WikipediaSource::new().resolve_url("Ada Lovelace").unwrap();
        assert_eq!(url.as_str(), "https://en.wikipedia.org/wiki/Ada_Lovelace");
    }

    #[test]
    fn test_title_and_source() {
        let page = parse_article();
        assert_eq!(page.title, "Ada Lovelace");
        assert_eq!(page.source, "Wikipedia");
        assert_eq!(page.url, "https://en.wikipedia.org/wiki/Ada_Lovelace");
    }

    #[test]
    fn test_title_fallbacks() {
        let source = WikipediaSource::new();
        let page = source.parse("<html><head><title>Grace Hopper - Wikipedia</title></head></html>", "");
        assert_eq!(page.title, "Grace Hopper");

        let page = source.parse("<html><body><p>nothing</p></body></html>", "");
        assert_eq!(page.title, UNKNOWN_TITLE);
    }

    #[test]
    fn test_sections() {
        let page = parse_article();
        let titles: Vec<&str> = page.sections.titles().collect();
        assert_eq!(titles, vec!["Introduction", "Early life", "External links"]);
        assert!(page.sections.get("Introduction").unwrap().starts_with("Ada Lovelace was an English mathematician."));
        assert!(page.sections.get("Early life").unwrap().contains("Daughter of Lord Byron"));
        assert!(!page.sections.get("Early life").unwrap().contains("Computer History"));
        assert!(page.sections.get("External links").unwrap().contains("Computer History"));
    }

    #[test]
    fn test_citations_require_link() {
        let page = parse_article();
        assert_eq!(page.citations.len(), 2);
        assert_eq!(page.citations[0].number, 1);
        assert_eq!(page.citations[0].id, "cite_note-1");
        assert_eq!(page.citations[1].text, "[2]");
    }

    #[test]
    fn test_infobox() {
        let page = parse_article();
        let infobox = page.infobox.unwrap();
        assert_eq!(infobox.get("Born").map(String::as_str), Some("10 December 1815"));
        assert_eq!(infobox.len(), 2);
    }

    #[test]
    fn test_empty_infobox_is_none() {
        let html = r#"<div id="mw-content-text"><table class="infobox"><tr><td>only data</td></tr></table></div>"#;
        assert!(WikipediaSource::new().parse(html, "").infobox.is_none());
    }

    #[test]
    fn test_images_skip_svg() {
        let page = parse_article();
        assert_eq!(page.images, vec!["https://upload.wikimedia.org/ada.jpg"]);
    }

    #[test]
    fn test_categories() {
        let page = parse_article();
        assert_eq!(page.categories, vec!["1815 births", "English mathematicians"]);
    }

    #[test]
    fn test_external_links() {
        let page = parse_article();
        assert_eq!(page.external_links, vec!["https://www.computerhistory.org/"]);
    }

    #[test]
    fn test_legacy_external_links_markup() {
        let html = r#"
            <div id="mw-content-text">
                <h2><span class="mw-headline" id="External_links">External links</span></h2>
                <ul><li><a class="external" href="https://legacy.example/">Legacy</a></li></ul>
            </div>
        "#;
        let page = WikipediaSource::new().parse(html, "");
        assert_eq!(page.external_links, vec!["https://legacy.example/"]);
    }

    #[test]
    fn test_last_modified() {
        let page = parse_article();
        let modified = page.last_modified.unwrap();
        assert_eq!((modified.year(), modified.month(), modified.day()), (2024, 10, 31));
    }

    #[test]
    fn test_text_and_word_count() {
        let page = parse_article();
        assert!(page.text_content.contains("Analytical Engine"));
        assert_eq!(page.word_count, crate::text::count_words(&page.text_content));
    }

    #[test]
    fn test_missing_content_degrades_to_empty() {
        let page = WikipediaSource::new().parse("<html><body><h1 id=\"firstHeading\">Empty</h1></body></html>", "");
        assert_eq!(page.title, "Empty");
        assert!(page.text_content.is_empty());
        assert!(page.sections.is_empty());
        assert!(page.citations.is_empty());
        assert_eq!(page.word_count, 0);
    }
}
