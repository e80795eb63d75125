//! Markdown subset -> safe HTML for text segments and transcripts.
//!
//! Covers what chat models actually produce:
//! - `#` through `######` headings
//! - `***bold italic***`, `**bold**`, `*italic*`, `~~strike~~`
//! - `` `inline code` ``
//! - `---` / `***` / `___` rules
//! - `1.` numbered and `-` / `*` bullet lists
//!
//! Input is escaped before any tag is emitted.

use regex::Regex;
use shared::{Segment, TableData};
use std::sync::LazyLock;

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+)$").expect("heading regex"));
static NUMBERED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s+(.+)$").expect("numbered regex"));
static BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-*]\s+(.+)$").expect("bullet regex"));
static CODE_SPAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("code span regex"));
static BOLD_ITALIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*\*(.+?)\*\*\*").expect("bold italic regex"));
static BOLD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("bold regex"));
static ITALIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*\s][^*]*?)\*").expect("italic regex"));
static STRIKE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"~~(.+?)~~").expect("strike regex"));

/// Escape text for an HTML element body or a double-quoted attribute.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn emphasis(escaped: &str) -> String {
    let text = BOLD_ITALIC_RE.replace_all(escaped, "<strong><em>$1</em></strong>");
    let text = BOLD_RE.replace_all(&text, "<strong>$1</strong>");
    let text = ITALIC_RE.replace_all(&text, "<em>$1</em>");
    STRIKE_RE.replace_all(&text, "<del>$1</del>").into_owned()
}

/// Inline formatting for one already-escaped line. Code spans are left alone.
fn inline(escaped: &str) -> String {
    let mut out = String::new();
    let mut cursor = 0;
    for cap in CODE_SPAN_RE.captures_iter(escaped) {
        let (Some(whole), Some(code)) = (cap.get(0), cap.get(1)) else {
            continue;
        };
        out.push_str(&emphasis(&escaped[cursor..whole.start()]));
        out.push_str("<code>");
        out.push_str(code.as_str());
        out.push_str("</code>");
        cursor = whole.end();
    }
    out.push_str(&emphasis(&escaped[cursor..]));
    out
}

#[derive(PartialEq)]
enum Block {
    None,
    Paragraph,
    Ordered,
    Unordered,
}

fn close(out: &mut String, block: &mut Block) {
    match block {
        Block::Paragraph => out.push_str("</p>\n"),
        Block::Ordered => out.push_str("</ol>\n"),
        Block::Unordered => out.push_str("</ul>\n"),
        Block::None => {}
    }
    *block = Block::None;
}

fn open(out: &mut String, block: &mut Block, wanted: Block) {
    if *block == wanted {
        return;
    }
    close(out, block);
    out.push_str(match wanted {
        Block::Paragraph => "<p>",
        Block::Ordered => "<ol>\n",
        Block::Unordered => "<ul>\n",
        Block::None => "",
    });
    *block = wanted;
}

/// Render a text segment to an HTML fragment.
pub fn to_html(text: &str) -> String {
    let mut out = String::new();
    let mut block = Block::None;

    for raw in text.lines() {
        let line = escape_html(raw.trim());
        if line.is_empty() {
            close(&mut out, &mut block);
            continue;
        }
        if matches!(line.as_str(), "---" | "***" | "___") {
            close(&mut out, &mut block);
            out.push_str("<hr>\n");
            continue;
        }
        if let Some(cap) = HEADING_RE.captures(&line) {
            close(&mut out, &mut block);
            let level = cap[1].len();
            out.push_str(&format!("<h{level}>{}</h{level}>\n", inline(&cap[2])));
            continue;
        }
        if let Some(cap) = NUMBERED_RE.captures(&line) {
            open(&mut out, &mut block, Block::Ordered);
            out.push_str(&format!("<li>{}</li>\n", inline(&cap[1])));
            continue;
        }
        if let Some(cap) = BULLET_RE.captures(&line) {
            open(&mut out, &mut block, Block::Unordered);
            out.push_str(&format!("<li>{}</li>\n", inline(&cap[1])));
            continue;
        }
        if block == Block::Paragraph {
            out.push_str("<br>");
        } else {
            open(&mut out, &mut block, Block::Paragraph);
        }
        out.push_str(&inline(&line));
    }
    close(&mut out, &mut block);
    out
}

pub fn table_html(table: &TableData) -> String {
    let mut out = format!(
        "<div class=\"table\"><h3>{}</h3>\n<table>\n<thead><tr>",
        escape_html(&table.title)
    );
    for header in &table.headers {
        out.push_str(&format!("<th>{}</th>", escape_html(header)));
    }
    out.push_str("</tr></thead>\n<tbody>\n");
    for row in &table.rows {
        out.push_str("<tr>");
        for cell in row {
            out.push_str(&format!("<td>{}</td>", escape_html(cell)));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n</table></div>\n");
    out
}

fn code_html(language: &str, content: &str) -> String {
    format!(
        "<pre><code class=\"language-{}\">{}</code></pre>\n",
        escape_html(language),
        escape_html(content)
    )
}

/// HTML fragment for a whole parsed message.
pub fn segments_html(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|segment| match segment {
            Segment::Text { content } => to_html(content),
            Segment::Code { language, content } => code_html(language, content),
            Segment::CombinedCode(combined) => combined
                .source_blocks
                .iter()
                .map(|b| code_html(&b.language, &b.content))
                .collect(),
            Segment::Table(table) => table_html(table),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escapes_before_formatting() {
        let html = to_html("<script>alert(1)</script> **bold**");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("<strong>bold</strong>"));
    }

    #[test]
    fn test_headings_and_rules() {
        assert_eq!(to_html("## Title"), "<h2>Title</h2>\n");
        assert_eq!(to_html("---"), "<hr>\n");
    }

    #[test]
    fn test_emphasis_variants() {
        assert_eq!(
            to_html("***a*** **b** *c* ~~d~~"),
            "<p><strong><em>a</em></strong> <strong>b</strong> <em>c</em> <del>d</del></p>\n"
        );
    }

    #[test]
    fn test_inline_code_untouched() {
        assert_eq!(
            to_html("run `a*b*c` now"),
            "<p>run <code>a*b*c</code> now</p>\n"
        );
    }

    #[test]
    fn test_lists() {
        let html = to_html("1. one\n2. two\n\n- a\n- b");
        assert_eq!(
            html,
            "<ol>\n<li>one</li>\n<li>two</li>\n</ol>\n<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n"
        );
    }

    #[test]
    fn test_paragraph_lines_join() {
        assert_eq!(to_html("a\nb\n\nc"), "<p>a<br>b</p>\n<p>c</p>\n");
    }

    #[test]
    fn test_table_cells_escaped() {
        let table = TableData {
            title: "T".into(),
            headers: vec!["<b>".into()],
            rows: vec![vec!["&".into()]],
        };
        let html = table_html(&table);
        assert!(html.contains("<th>&lt;b&gt;</th>"));
        assert!(html.contains("<td>&amp;</td>"));
    }
}
