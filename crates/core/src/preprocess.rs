//! HTML cleanup ahead of text extraction.

/// Configuration for HTML preprocessing
#[derive(Debug, Clone)]
pub struct PreprocessConfig {
    /// Whether to remove script tags
    pub remove_scripts: bool,
    /// Whether to remove style tags
    pub remove_styles: bool,
    /// Whether to remove noscript tags
    pub remove_noscript: bool,
    /// Whether to remove HTML comments
    pub remove_comments: bool,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self { remove_scripts: true, remove_styles: true, remove_noscript: true, remove_comments: true }
    }
}

/// Preprocess HTML by removing non-content elements
pub fn preprocess_html(html: &str, config: &PreprocessConfig) -> String {
    if !(config.remove_scripts || config.remove_styles || config.remove_noscript || config.remove_comments) {
        return html.to_string();
    }

    rewrite(html, config).unwrap_or_else(|| html.to_string())
}

/// Remove script, style and noscript tags and comments in one streaming pass.
///
/// Returns `None` when the rewriter rejects the input.
fn rewrite(html: &str, config: &PreprocessConfig) -> Option<String> {
    let mut output = String::new();
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: [
                ("script", config.remove_scripts),
                ("style", config.remove_styles),
                ("noscript", config.remove_noscript),
            ]
            .into_iter()
            .filter(|(_, enabled)| *enabled)
            .map(|(tag, _)| {
                lol_html::element!(tag, |el| {
                    el.remove();
                    Ok(())
                })
            })
            .collect(),
            document_content_handlers: if config.remove_comments {
                vec![lol_html::doc_comments!(|c| {
                    c.remove();
                    Ok(())
                })]
            } else {
                Vec::new()
            },
            ..Default::default()
        },
        |c: &[u8]| {
            output.push_str(&String::from_utf8_lossy(c));
        },
    );

    rewriter.write(html.as_bytes()).ok()?;
    rewriter.end().ok()?;
    Some(output)
}
