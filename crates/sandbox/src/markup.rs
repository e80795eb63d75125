//! Pages for markup and stylesheets: full documents, CSS demos, HTML fragments.

use regex::Regex;
use std::sync::LazyLock;

use crate::builder::{escape_style, HtmlDocument};
use crate::styles;

static HEAD_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<head[^>]*>").expect("head regex"));
static HTML_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<html[^>]*>").expect("html regex"));
static STYLE_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style[^>]*>(.*?)</style\s*>").expect("style block regex"));
static STYLESHEET_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<link[^>]*rel\s*=\s*["']?stylesheet["']?[^>]*>"#).expect("link regex")
});

pub const EXTERNAL_CSS_NOTE: &str = "Note: External CSS links detected but cannot be loaded in preview. Consider inlining CSS for full preview functionality.";

pub fn is_full_document(code: &str) -> bool {
    let start = code.trim_start().get(..15).unwrap_or(code.trim_start());
    let start = start.to_ascii_lowercase();
    start.starts_with("<!doctype") || start.starts_with("<html")
}

fn has_own_styling(code: &str) -> bool {
    let lower = code.to_ascii_lowercase();
    lower.contains("<style") || lower.contains("stylesheet")
}

/// A complete document, used as-is unless it brings no styling at all.
pub fn full_document(code: &str) -> String {
    if has_own_styling(code) {
        return code.to_string();
    }
    let reset = format!(
        "\n    <style>\n{}\n    </style>",
        escape_style(&styles::reset_css())
    );
    if let Some(head) = HEAD_OPEN_RE.find(code) {
        return format!("{}{}{}", &code[..head.end()], reset, &code[head.end()..]);
    }
    if let Some(html) = HTML_OPEN_RE.find(code) {
        return format!(
            "{}\n<head>{}\n</head>{}",
            &code[..html.end()],
            reset,
            &code[html.end()..]
        );
    }
    format!("<head>{reset}\n</head>\n{code}")
}

/// Stylesheet applied to a fixed sample page.
pub fn css_document(css: &str, additional_css: &str) -> String {
    HtmlDocument::new("CSS Preview")
        .style(styles::padded_reset_css())
        .style(styles::ROUNDED_CORNERS_CSS)
        .style(css)
        .style(additional_css)
        .markup(styles::CSS_DEMO_BODY)
        .render()
}

/// `<style>` bodies of `html`, and the markup with those elements removed.
pub fn split_styles(html: &str) -> (Vec<String>, String) {
    let styles = STYLE_BLOCK_RE
        .captures_iter(html)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|css| !css.is_empty())
        .collect();
    let body = STYLE_BLOCK_RE.replace_all(html, "").into_owned();
    (styles, body)
}

/// Markup without a document shell.
pub fn fragment_document(html: &str, additional_css: &str) -> String {
    let (extracted, body) = split_styles(html);
    let mut doc = HtmlDocument::new("HTML Preview")
        .style(styles::padded_reset_css())
        .style(styles::ROUNDED_CORNERS_CSS);
    for css in &extracted {
        doc = doc.style(css);
    }
    doc = doc.style(additional_css);
    if STYLESHEET_LINK_RE.is_match(html) {
        doc = doc.head_comment(EXTERNAL_CSS_NOTE);
    }
    doc.markup(body.trim()).render()
}
