//! Assistant message -> ordered segments.

use shared::{CodeBlock, Segment};
use tracing::debug;

use crate::{combine, fence, table};

/// Split one assistant message into text, code, combined-code and table segments.
///
/// A table is looked for first across the whole message; the text on either
/// side of it is then scanned for code fences. The result always holds at
/// least one segment.
pub fn parse(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();

    match table::extract(text) {
        Some(found) => {
            debug!(title = %found.table.title, "table extracted");
            segments.extend(parse_code(&found.before));
            segments.push(Segment::Table(found.table));
            segments.extend(parse_code(&found.after));
        }
        None => segments.extend(parse_code(text)),
    }

    if segments.is_empty() {
        segments.push(Segment::text(text));
    }
    segments
}

fn push_text(segments: &mut Vec<Segment>, text: &str) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        segments.push(Segment::text(trimmed));
    }
}

/// Text spans between consecutive blocks, including before the first and after the last.
fn gaps<'a>(text: &'a str, blocks: &[CodeBlock]) -> Vec<&'a str> {
    let mut cursor = 0;
    let mut out = Vec::with_capacity(blocks.len() + 1);
    for block in blocks {
        out.push(&text[cursor..block.offset]);
        cursor = block.end();
    }
    out.push(&text[cursor..]);
    out
}

fn parse_code(text: &str) -> Vec<Segment> {
    let blocks = fence::scan(text);
    let mut segments = Vec::new();
    if blocks.is_empty() {
        push_text(&mut segments, text);
        return segments;
    }

    let gaps = gaps(text, &blocks);
    if combine::should_combine(&blocks) {
        if let Some(combined) = combine::combine(&blocks) {
            // Only the prose around the unit survives; captions between its blocks are dropped.
            push_text(&mut segments, gaps[0]);
            segments.push(Segment::CombinedCode(combined));
            if let Some(tail) = gaps.last() {
                push_text(&mut segments, tail);
            }
            return segments;
        }
    }

    for (gap, block) in gaps.iter().zip(&blocks) {
        push_text(&mut segments, gap);
        segments.push(Segment::Code {
            language: block.language.clone(),
            content: block.content.clone(),
        });
    }
    if let Some(tail) = gaps.last() {
        push_text(&mut segments, tail);
    }
    segments
}
