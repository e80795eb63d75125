//! Content pipeline for assistant messages
//!
//! Turns raw model output into typed segments:
//! - Fenced code scanning with language reclassification
//! - Table extraction (JSON, `[TABLE: ...]` directive, pipe tables)
//! - Static classification of code blocks for live preview
//! - Merging multi-file answers into one combined unit
//! - Markdown text rendering to safe HTML

pub mod classify;
pub mod combine;
pub mod fence;
pub mod markdown;
pub mod parser;
pub mod table;

pub use classify::{classify, pip_packages, resolve_language};
pub use combine::combine;
pub use parser::parse;
pub use table::{extract as extract_table, TableMatch};
