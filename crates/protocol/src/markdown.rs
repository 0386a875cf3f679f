/// Convert rendered HTML (a bibliography, a note) into Markdown.
///
/// # Examples
///
/// ```
/// let markdown = zotlink_protocol::html_to_markdown("<div class=\"csl-entry\">Doe, J. <i>Title</i>.</div>");
/// assert!(markdown.contains("Title") && !markdown.contains("<div"));
/// ```
#[cfg(feature = "markdown")]
pub fn html_to_markdown(html: &str) -> String {
    html2md::rewrite_html(html, true).trim().to_string()
}

/// Without the `markdown` feature, HTML is passed through unchanged.
#[cfg(not(feature = "markdown"))]
pub fn html_to_markdown(html: &str) -> String {
    html.trim().to_string()
}

/// Whether an error message from the bibliography renderer means it produced
/// nothing, typically because Quick Copy isn't set to a citation style.
pub fn is_empty_fragment(message: &str) -> bool {
    crate::consts::EMPTY_FRAGMENT_REGEX.is_match(message)
}
