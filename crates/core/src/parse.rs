//! HTML parsing and DOM navigation.
//!
//! This module provides the [`Document`] and [`Element`] types that page
//! sources use to pull structured fields out of encyclopedia markup.
//!
//! # Example
//!
//! ```rust
//! use encyclodiff_core::parse::Document;
//!
//! let html = r#"
//!     <html>
//!         <body>
//!             <h1 id="firstHeading">Title</h1>
//!             <p class="content">Paragraph</p>
//!         </body>
//!     </html>
//! "#;
//!
//! let doc = Document::parse(html);
//! let heading = doc.select_first("h1#firstHeading").unwrap();
//! assert_eq!(heading.text(), "Title");
//! ```

use scraper::{ElementRef, Html, Selector};

use crate::{EncyclodiffError, Result};

/// Represents a parsed HTML document.
///
/// Parsing never fails: malformed markup is repaired by the HTML5 parser, so
/// a broken page simply yields fewer matches.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses a full HTML document.
    pub fn parse(html: &str) -> Self {
        Self { html: Html::parse_document(html) }
    }

    /// Gets the raw HTML representation.
    pub fn html(&self) -> &Html {
        &self.html
    }

    /// Selects elements using a CSS selector, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`EncyclodiffError::HtmlParseError`] if the selector is invalid.
    ///
    /// # Example
    ///
    /// ```rust
    /// use encyclodiff_core::parse::Document;
    ///
    /// let html = r#"<p class="content">First</p><p class="content">Second</p>"#;
    /// let doc = Document::parse(html);
    /// let elements = doc.select("p.content").unwrap();
    /// assert_eq!(elements.len(), 2);
    /// ```
    pub fn select(&self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).map(Element::from).collect())
    }

    /// Selects the first element matching a CSS selector.
    ///
    /// Invalid selectors yield `None`; page sources use this for optional lookups.
    pub fn select_first(&self, selector: &str) -> Option<Element<'_>> {
        let sel = parse_selector(selector).ok()?;
        self.html.select(&sel).next().map(Element::from)
    }

    /// Returns the first element matched by any of the selectors, tried in order.
    pub fn select_first_of(&self, selectors: &[&str]) -> Option<Element<'_>> {
        selectors.iter().find_map(|sel| self.select_first(sel))
    }

    /// Gets the content of the `<title>` element if present.
    pub fn title(&self) -> Option<String> {
        self.select_first("title").map(|el| el.text())
    }

    /// Gets all text content from the document.
    pub fn text_content(&self) -> String {
        self.html.root_element().text().collect()
    }
}

/// A wrapper around scraper's ElementRef for easier DOM navigation.
///
/// # Example
///
/// ```rust
/// use encyclodiff_core::parse::Document;
///
/// let html = r#"<a class="external" href="https://example.com">Link text</a>"#;
/// let doc = Document::parse(html);
/// let link = doc.select_first("a").unwrap();
///
/// assert_eq!(link.text(), "Link text");
/// assert_eq!(link.attr("href"), Some("https://example.com"));
/// assert!(link.has_class("external"));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Element<'a> {
    element: ElementRef<'a>,
}

impl<'a> From<ElementRef<'a>> for Element<'a> {
    fn from(element: ElementRef<'a>) -> Self {
        Self { element }
    }
}

impl<'a> Element<'a> {
    /// Gets the inner HTML of this element.
    pub fn inner_html(&self) -> String {
        self.element.inner_html()
    }

    /// Gets the outer HTML of this element, including its own tags.
    pub fn outer_html(&self) -> String {
        self.element.html()
    }

    /// Gets the concatenated text of all descendant text nodes.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Gets the text with surrounding whitespace trimmed.
    pub fn trimmed_text(&self) -> String {
        self.text().trim().to_string()
    }

    /// Gets the value of an attribute.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Gets the lowercase tag name (e.g., "div", "a", "span").
    pub fn tag_name(&self) -> String {
        self.element.value().name().to_lowercase()
    }

    /// Whether the element carries the given class.
    pub fn has_class(&self, class: &str) -> bool {
        self.element.value().classes().any(|c| c == class)
    }

    /// The raw `class` attribute, empty when absent.
    pub fn class_attr(&self) -> &'a str {
        self.attr("class").unwrap_or("")
    }

    /// Selects descendant elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`EncyclodiffError::HtmlParseError`] if the selector is invalid.
    pub fn select(&self, selector: &str) -> Result<Vec<Element<'a>>> {
        let sel = parse_selector(selector)?;
        Ok(self.element.select(&sel).map(Element::from).collect())
    }

    /// Selects the first descendant matching a CSS selector.
    pub fn select_first(&self, selector: &str) -> Option<Element<'a>> {
        let sel = parse_selector(selector).ok()?;
        self.element.select(&sel).next().map(Element::from)
    }

    /// The closest ancestor element, if any.
    pub fn parent(&self) -> Option<Element<'a>> {
        self.element.parent().and_then(ElementRef::wrap).map(Element::from)
    }

    /// Ancestor elements from the parent outwards.
    pub fn ancestors(&self) -> impl Iterator<Item = Element<'a>> + use<'a> {
        self.element.ancestors().filter_map(ElementRef::wrap).map(Element::from)
    }

    /// Following sibling elements, skipping text and comment nodes.
    pub fn next_sibling_elements(&self) -> impl Iterator<Item = Element<'a>> + use<'a> {
        self.element.next_siblings().filter_map(ElementRef::wrap).map(Element::from)
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| EncyclodiffError::HtmlParseError(format!("Invalid selector: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"
        <!DOCTYPE html>
        <html lang="en">
        <head>
            <meta charset="UTF-8">
            <title>Test Page</title>
        </head>
        <body>
            <div id="content">
                <h2><span class="mw-headline" id="History">History</span></h2>
                <p class="content">Paragraph 1</p>
                <p class="content">Paragraph 2</p>
                <ul><li><a class="external text" href="https://example.com">Link</a></li></ul>
            </div>
        </body>
        </html>
    "#;

    #[test]
    fn test_parse_document() {
        let doc = Document::parse(SAMPLE_HTML);
        assert_eq!(doc.title(), Some("Test Page".to_string()));
    }

    #[test]
    fn test_select_elements() {
        let doc = Document::parse(SAMPLE_HTML);
        let elements = doc.select("p.content").unwrap();

        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].text(), "Paragraph 1");
        assert_eq!(elements[1].text(), "Paragraph 2");
    }

    #[test]
    fn test_element_attributes() {
        let doc = Document::parse(SAMPLE_HTML);
        let link = doc.select_first("a").unwrap();

        assert_eq!(link.attr("href"), Some("https://example.com"));
        assert!(link.has_class("external"));
        assert!(link.has_class("text"));
        assert!(!link.has_class("internal"));
        assert_eq!(link.class_attr(), "external text");
    }

    #[test]
    fn test_invalid_selector() {
        let doc = Document::parse(SAMPLE_HTML);
        let result = doc.select("[[invalid");

        assert!(matches!(result, Err(EncyclodiffError::HtmlParseError(_))));
        assert!(doc.select_first("[[invalid").is_none());
    }

    #[test]
    fn test_select_first_of_uses_priority() {
        let doc = Document::parse(SAMPLE_HTML);
        let found = doc.select_first_of(&["main", "div#content", "body"]).unwrap();
        assert_eq!(found.attr("id"), Some("content"));
    }

    #[test]
    fn test_navigation() {
        let doc = Document::parse(SAMPLE_HTML);
        let headline = doc.select_first("span#History").unwrap();

        let heading = headline.parent().unwrap();
        assert_eq!(heading.tag_name(), "h2");
        assert!(headline.ancestors().any(|a| a.attr("id") == Some("content")));

        let siblings: Vec<String> = heading.next_sibling_elements().map(|e| e.tag_name()).collect();
        assert_eq!(siblings, vec!["p", "p", "ul"]);
    }

    #[test]
    fn test_element_select_in_document_order() {
        let doc = Document::parse(SAMPLE_HTML);
        let content = doc.select_first("#content").unwrap();
        let tags: Vec<String> = content.select("h2, p, ul").unwrap().iter().map(|e| e.tag_name()).collect();
        assert_eq!(tags, vec!["h2", "p", "p", "ul"]);
    }

    #[test]
    fn test_text_content() {
        let doc = Document::parse(SAMPLE_HTML);
        let text = doc.text_content();

        assert!(text.contains("History"));
        assert!(text.contains("Paragraph 1"));
    }
}
