//! Embedding a synthesized document in an isolated frame.
//!
//! Preview documents are only ever loaded through [`embed_page`] (an iframe
//! sandboxed to scripts and same-origin) or [`data_url`]. Neither grants
//! top-level navigation, popups or access to the parent page.

use crate::builder::{escape_html, HtmlDocument};

pub const SANDBOX_POLICY: &str = "allow-scripts allow-same-origin";

const FRAME_CSS: &str = "html, body { margin: 0; height: 100%; background: #111827; }\niframe { border: 0; width: 100%; height: 100%; display: block; background: white; }";

/// Host page with `document` in a sandboxed `srcdoc` iframe.
pub fn embed_page(title: &str, document: &str) -> String {
    HtmlDocument::new(title)
        .style(FRAME_CSS)
        .markup(format!(
            "<iframe title=\"{}\" sandbox=\"{}\" srcdoc=\"{}\"></iframe>",
            escape_html(title),
            SANDBOX_POLICY,
            escape_html(document)
        ))
        .render()
}

/// `data:` URL form of `document`.
pub fn data_url(document: &str) -> String {
    format!(
        "data:text/html;charset=utf-8,{}",
        urlencoding::encode(document)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embed_page_sandboxes_document() {
        let page = embed_page("Preview", "<p class=\"x\">a & b</p><script>top.location='x'</script>");
        assert!(page.contains("sandbox=\"allow-scripts allow-same-origin\""));
        assert!(page.contains("&lt;p class=&quot;x&quot;&gt;a &amp; b&lt;/p&gt;"));
        assert!(!page.contains("<script>top"));
        assert!(!page.contains("allow-top-navigation"));
        assert!(!page.contains("allow-popups"));
    }

    #[test]
    fn test_data_url_is_encoded() {
        let url = data_url("<p>a b</p>");
        assert_eq!(url, "data:text/html;charset=utf-8,%3Cp%3Ea%20b%3C%2Fp%3E");
    }
}
