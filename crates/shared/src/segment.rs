//! Typed pieces of a rendered assistant message.
//!
//! Segments are produced fresh on every render and never persisted.

use serde::{Deserialize, Serialize};

/// One fenced block found while scanning a message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBlock {
    /// Tag written after the opening fence, if any
    pub tag: Option<String>,
    /// Display language after reclassification (e.g. `javascript` -> `jsx`)
    pub language: String,
    /// Trimmed body
    pub content: String,
    /// Byte offset of the opening fence in the scanned text
    pub offset: usize,
    /// Byte length of the whole fenced region, fences included
    pub len: usize,
}

impl CodeBlock {
    pub fn end(&self) -> usize {
        self.offset + self.len
    }
}

/// Several fenced blocks merged into one previewable unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedCode {
    pub language: String,
    pub main_content: String,
    pub css: String,
    pub additional_js: String,
    pub source_blocks: Vec<CodeBlock>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableData {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Segment {
    Text { content: String },
    Code { language: String, content: String },
    CombinedCode(CombinedCode),
    Table(TableData),
}

impl Segment {
    pub fn text(content: impl Into<String>) -> Self {
        Segment::Text {
            content: content.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Segment::Text { .. } => "text",
            Segment::Code { .. } => "code",
            Segment::CombinedCode(_) => "combined",
            Segment::Table(_) => "table",
        }
    }

    /// Code and language to hand to the preview, if this segment has code.
    pub fn preview_source(&self) -> Option<(&str, &str)> {
        match self {
            Segment::Code { language, content } => Some((content.as_str(), language.as_str())),
            Segment::CombinedCode(combined) => {
                Some((combined.main_content.as_str(), combined.language.as_str()))
            }
            _ => None,
        }
    }
}
