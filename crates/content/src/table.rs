//! Tabular data extraction.
//!
//! Three encodings are recognised, tried in this order: a fenced JSON object
//! with `headers` and `rows`, an inline `[TABLE: title | headers | rows...]`
//! directive, and a GitHub-style pipe table. The first hit wins and only one table is pulled
//! out of a message. Only a `json` fence can hold a table; directives and pipe
//! lines inside any other fence belong to that code block.

use regex::Regex;
use serde::Deserialize;
use shared::TableData;
use std::sync::LazyLock;

use crate::fence::{self, FenceSpan};

pub const DEFAULT_TITLE: &str = "Data Table";

static MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[TABLE:([^\]]*)\]").expect("table marker regex"));

/// A table plus the message text around it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableMatch {
    pub table: TableData,
    pub before: String,
    pub after: String,
}

#[derive(Deserialize)]
struct JsonTable {
    #[serde(default)]
    title: Option<String>,
    headers: Vec<serde_json::Value>,
    rows: Vec<Vec<serde_json::Value>>,
}

fn cell_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Find the first table in `text`.
pub fn extract(text: &str) -> Option<TableMatch> {
    let fences = fence::spans(text);
    from_json_fence(text, &fences)
        .or_else(|| from_marker(text, &fences))
        .or_else(|| from_markdown(text, &fences))
}

fn inside_fence(fences: &[FenceSpan<'_>], offset: usize) -> bool {
    fences.iter().any(|f| f.contains(offset))
}

fn from_json_fence(text: &str, fences: &[FenceSpan<'_>]) -> Option<TableMatch> {
    fences.iter().find_map(|span| {
        if span.tag != Some("json") {
            return None;
        }
        let parsed: JsonTable = serde_json::from_str(span.body.trim()).ok()?;
        if parsed.headers.is_empty() || parsed.rows.is_empty() {
            return None;
        }
        let table = TableData {
            title: parsed
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            headers: parsed.headers.iter().map(cell_text).collect(),
            rows: parsed
                .rows
                .iter()
                .map(|row| row.iter().map(cell_text).collect())
                .collect(),
        };
        Some(TableMatch {
            table,
            before: text[..span.start].to_string(),
            after: text[span.end..].to_string(),
        })
    })
}

/// `[TABLE: title | h1,h2 | r1c1,r1c2 | ...]`
fn from_marker(text: &str, fences: &[FenceSpan<'_>]) -> Option<TableMatch> {
    let cap = MARKER_RE
        .captures_iter(text)
        .find(|cap| cap.get(0).is_some_and(|m| !inside_fence(fences, m.start())))?;
    let whole = cap.get(0)?;
    let mut parts = cap.get(1)?.as_str().split('|').map(str::trim);
    let title = parts.next().filter(|t| !t.is_empty()).unwrap_or(DEFAULT_TITLE);
    let headers = split_commas(parts.next()?);
    if headers.is_empty() {
        return None;
    }
    let rows: Vec<Vec<String>> = parts
        .map(split_commas)
        .filter(|row| !row.is_empty())
        .collect();
    if rows.is_empty() {
        return None;
    }
    Some(TableMatch {
        table: TableData {
            title: title.to_string(),
            headers,
            rows,
        },
        before: text[..whole.start()].to_string(),
        after: text[whole.end()..].to_string(),
    })
}

fn split_commas(part: &str) -> Vec<String> {
    part.split(',')
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect()
}

fn is_pipe_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= 2 && trimmed.starts_with('|') && trimmed.ends_with('|')
}

fn is_separator(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.contains('-')
        && trimmed
            .chars()
            .all(|c| matches!(c, '-' | '|' | ':') || c.is_whitespace())
}

fn split_cells(line: &str) -> Vec<String> {
    line.trim()
        .trim_matches('|')
        .split('|')
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect()
}

/// Byte ranges of each line, newline excluded.
fn line_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = 0;
    for line in text.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);
        spans.push((start, start + content.len()));
        start += line.len();
    }
    spans
}

fn from_markdown(text: &str, fences: &[FenceSpan<'_>]) -> Option<TableMatch> {
    let spans = line_spans(text);
    let line = |i: usize| &text[spans[i].0..spans[i].1];
    let table_line = |i: usize| is_pipe_line(line(i)) && !inside_fence(fences, spans[i].0);

    let first = (0..spans.len()).find(|&i| table_line(i))?;
    let last = (first..spans.len()).take_while(|&i| table_line(i)).last()?;

    let mut cell_lines = (first..=last)
        .map(line)
        .filter(|l| !is_separator(l))
        .map(split_cells)
        .filter(|cells| !cells.is_empty());
    let headers = cell_lines.next()?;
    let rows: Vec<Vec<String>> = cell_lines.collect();
    if rows.is_empty() {
        return None;
    }

    // A heading directly above the table becomes its title.
    let title_line = (0..first).rev().find(|&i| !line(i).trim().is_empty());
    let (title, before_end) = match title_line {
        Some(i) => {
            let title = line(i).trim().trim_start_matches('#').trim();
            if title.is_empty() || title.contains("```") {
                (DEFAULT_TITLE.to_string(), spans[first].0)
            } else {
                (title.to_string(), spans[i].0)
            }
        }
        None => (DEFAULT_TITLE.to_string(), spans[first].0),
    };

    let after_start = (spans[last].1 + 1).min(text.len());
    Some(TableMatch {
        table: TableData {
            title,
            headers,
            rows,
        },
        before: text[..before_end].to_string(),
        after: text[after_start..].to_string(),
    })
}

/// Render a table back to pipe-table markdown.
pub fn to_markdown(table: &TableData) -> String {
    let mut out = format!("## {}\n\n", table.title);
    out.push_str(&format!("| {} |\n", table.headers.join(" | ")));
    out.push_str(&format!(
        "|{}|\n",
        vec!["---"; table.headers.len()].join("|")
    ));
    for row in &table.rows {
        out.push_str(&format!("| {} |\n", row.join(" | ")));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_table_with_title() {
        let text = "Here you go.\n\n## Fruit Prices\n| Fruit | Price |\n|---|---|\n| Apple | 1 |\n| Pear | 2 |\n\nEnjoy!";
        let found = extract(text).unwrap();
        assert_eq!(found.table.title, "Fruit Prices");
        assert_eq!(found.table.headers, vec!["Fruit", "Price"]);
        assert_eq!(
            found.table.rows,
            vec![vec!["Apple", "1"], vec!["Pear", "2"]]
        );
        assert_eq!(found.before.trim(), "Here you go.");
        assert_eq!(found.after.trim(), "Enjoy!");
    }

    #[test]
    fn test_markdown_table_defaults_title() {
        let text = "| a | b |\n|---|---|\n| 1 | 2 |";
        let found = extract(text).unwrap();
        assert_eq!(found.table.title, DEFAULT_TITLE);
        assert!(found.before.is_empty());
        assert!(found.after.is_empty());
    }

    #[test]
    fn test_fence_line_is_never_a_title() {
        let text = "```css\na {}\n```\n| k | v |\n|---|---|\n| x | 1 |";
        let found = extract(text).unwrap();
        assert_eq!(found.table.title, DEFAULT_TITLE);
        assert_eq!(found.before, "```css\na {}\n```\n");
    }

    #[test]
    fn test_header_only_pipe_table_is_not_a_table() {
        assert!(extract("| a | b |\n|---|---|").is_none());
    }

    #[test]
    fn test_json_table_wins_over_markdown() {
        let text = "Data:\n```json\n{\"title\": \"Scores\", \"headers\": [\"Name\", \"Score\"], \"rows\": [[\"Ann\", 9], [\"Bo\", null]]}\n```\n| x | y |\n|---|---|\n| 1 | 2 |";
        let found = extract(text).unwrap();
        assert_eq!(found.table.title, "Scores");
        assert_eq!(found.table.rows, vec![vec!["Ann", "9"], vec!["Bo", ""]]);
        assert_eq!(found.before, "Data:\n");
        assert!(found.after.contains("| x | y |"));
    }

    #[test]
    fn test_invalid_json_falls_through() {
        let text = "```json\n{\"not\": \"a table\"}\n```";
        assert!(extract(text).is_none());
    }

    #[test]
    fn test_shorthand_directive() {
        let text = "Scores: [TABLE: Results | Name, Score | Ann, 9 | Bo, 7] done";
        let found = extract(text).unwrap();
        assert_eq!(found.table.title, "Results");
        assert_eq!(found.table.headers, vec!["Name", "Score"]);
        assert_eq!(found.table.rows, vec![vec!["Ann", "9"], vec!["Bo", "7"]]);
        assert_eq!(found.before, "Scores: ");
        assert_eq!(found.after, " done");
    }

    #[test]
    fn test_shorthand_without_headers_is_ignored() {
        assert!(extract("[TABLE: Empty]").is_none());
    }

    #[test]
    fn test_shorthand_without_rows_is_ignored() {
        assert!(extract("[TABLE: t | a,b]").is_none());
    }

    #[test]
    fn test_pipe_lines_inside_fence_are_code() {
        let text = "Example markdown:\n```markdown\n| a | b |\n|---|---|\n| 1 | 2 |\n```\nThat's it.";
        assert!(extract(text).is_none());
    }

    #[test]
    fn test_directive_inside_code_is_skipped() {
        let text = "```python\nprint(\"[TABLE: t | a,b | 1,2]\")\n```\n[TABLE: Real | x,y | 3,4]";
        let found = extract(text).unwrap();
        assert_eq!(found.table.title, "Real");
        assert!(found.before.starts_with("```python"));
    }

    #[test]
    fn test_json_table_needs_json_tag() {
        let text = "```javascript\n{\"headers\":[\"A\"],\"rows\":[[\"1\"]]}\n```";
        assert!(extract(text).is_none());
    }

    #[test]
    fn test_reparse_of_rendered_table_is_stable() {
        let text = "## Fruit\n| Fruit | Price |\n|---|---|\n| Apple | 1 |";
        let first = extract(text).unwrap().table;
        let second = extract(&to_markdown(&first)).unwrap().table;
        assert_eq!(first, second);
    }
}
