//! Backtick fence scanning.
//!
//! A fence opens with a run of three or more backticks and closes at the
//! next run of the same length, so a four-backtick fence can carry
//! triple-backtick text. Nested fences of equal length are not supported and
//! an unterminated fence matches nothing (its text stays plain text).

use regex::Regex;
use shared::CodeBlock;
use std::sync::LazyLock;

use crate::classify;

static FENCE_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(`{3,})([\w+#-]+)?[ \t]*\n?").expect("fence opener regex")
});

/// One fenced block located in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FenceSpan<'a> {
    pub start: usize,
    pub end: usize,
    pub tag: Option<&'a str>,
    pub body: &'a str,
}

impl FenceSpan<'_> {
    pub fn contains(&self, offset: usize) -> bool {
        (self.start..self.end).contains(&offset)
    }
}

/// Every fenced block in `text`, in order, without classification.
pub fn spans(text: &str) -> Vec<FenceSpan<'_>> {
    let mut out = Vec::new();
    let mut cursor = 0;
    while let Some(open) = FENCE_OPEN_RE.captures_at(text, cursor) {
        let (Some(whole), Some(ticks)) = (open.get(0), open.get(1)) else {
            break;
        };
        let closer = ticks.as_str();
        match text[whole.end()..].find(closer) {
            Some(rel) => {
                let body_end = whole.end() + rel;
                let end = body_end + closer.len();
                out.push(FenceSpan {
                    start: whole.start(),
                    end,
                    tag: open.get(2).map(|m| m.as_str()),
                    body: &text[whole.end()..body_end],
                });
                cursor = end;
            }
            None => cursor = ticks.end(),
        }
    }
    out
}

/// Every fenced block in `text`, in order, with reclassified languages.
pub fn scan(text: &str) -> Vec<CodeBlock> {
    spans(text)
        .into_iter()
        .map(|span| {
            let content = span.body.trim();
            CodeBlock {
                language: classify::resolve_language(span.tag, content),
                tag: span.tag.map(str::to_string),
                content: content.to_string(),
                offset: span.start,
                len: span.end - span.start,
            }
        })
        .collect()
}

/// Trimmed body of the first fenced block, whatever its tag.
pub fn first_body(text: &str) -> Option<String> {
    spans(text)
        .first()
        .map(|span| span.body.trim().to_string())
}

/// Number of fence delimiters in `text`.
pub fn delimiter_count(text: &str) -> usize {
    text.matches("```").count()
}

/// A fence long enough to wrap `code` without colliding with backticks inside it.
pub fn fence_for(code: &str) -> String {
    let mut longest = 0;
    let mut run = 0;
    for ch in code.chars() {
        if ch == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    "`".repeat((longest + 1).max(3))
}
