//! Merging the fenced blocks of one message into a single previewable unit.

use regex::Regex;
use shared::{CodeBlock, CombinedCode};
use std::sync::LazyLock;
use tracing::debug;

use crate::classify::{MARKUP_OR_SCRIPT, STYLESHEET};

static INLINE_STYLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<style[^>]*>(.*?)</style>").expect("inline style regex")
});

const SEPARATOR: &str = "\n\n";

pub fn is_markup_or_script(language: &str) -> bool {
    MARKUP_OR_SCRIPT.contains(&language)
}

/// Two or more blocks with at least one markup/script block are merged.
///
/// The decision covers the whole message: once it holds, every block goes
/// into the combined unit.
pub fn should_combine(blocks: &[CodeBlock]) -> bool {
    blocks.len() >= 2 && blocks.iter().any(|b| is_markup_or_script(&b.language))
}

/// Contents of every `<style>` element in `source`, in order.
pub fn inline_styles(source: &str) -> Vec<String> {
    INLINE_STYLE_RE
        .captures_iter(source)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|css| !css.is_empty())
        .collect()
}

fn push_part(target: &mut String, part: &str) {
    if part.is_empty() {
        return;
    }
    if !target.is_empty() {
        target.push_str(SEPARATOR);
    }
    target.push_str(part);
}

/// Merge `blocks` around the first markup/script block.
///
/// Every block body lands verbatim in exactly one of `main_content`, `css`
/// or `additional_js`: stylesheets go to `css`, other scripts to
/// `additional_js`, and everything else (extra markup, unknown languages)
/// is appended to `main_content`. Inline `<style>` bodies of markup blocks
/// are also copied into `css`. Returns `None` if no block can anchor the unit.
pub fn combine(blocks: &[CodeBlock]) -> Option<CombinedCode> {
    let main_index = blocks
        .iter()
        .position(|b| is_markup_or_script(&b.language))?;
    let main = &blocks[main_index];

    let mut main_content = main.content.clone();
    let mut css = String::new();
    let mut additional_js = String::new();
    let mut embedded_css = Vec::new();

    if matches!(main.language.as_str(), "html" | "jsx") {
        embedded_css.extend(inline_styles(&main.content));
    }

    for (index, block) in blocks.iter().enumerate() {
        if index == main_index {
            continue;
        }
        match block.language.as_str() {
            lang if STYLESHEET.contains(&lang) => push_part(&mut css, &block.content),
            "javascript" | "typescript" => push_part(&mut additional_js, &block.content),
            lang => {
                if matches!(lang, "html" | "jsx") {
                    embedded_css.extend(inline_styles(&block.content));
                }
                push_part(&mut main_content, &block.content);
            }
        }
    }

    for style in &embedded_css {
        push_part(&mut css, style);
    }

    debug!(
        language = %main.language,
        blocks = blocks.len(),
        css_len = css.len(),
        js_len = additional_js.len(),
        "combined code blocks"
    );

    Some(CombinedCode {
        language: main.language.clone(),
        main_content,
        css,
        additional_js,
        source_blocks: blocks.to_vec(),
    })
}
