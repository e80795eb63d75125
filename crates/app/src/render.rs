//! Plain-text rendering of chat messages for the terminal, and the HTML
//! transcript written by `/export`.

use content::markdown;
use sandbox::builder::HtmlDocument;
use shared::{Message, Role, Runtime, Segment, TableData};

const TRANSCRIPT_CSS: &str = "body { font-family: system-ui, sans-serif; max-width: 860px; margin: 0 auto; padding: 24px; line-height: 1.6; color: #1f2937; }
.msg { margin: 16px 0; padding: 12px 16px; border-radius: 10px; background: #f3f4f6; }
.msg.user { background: #dbeafe; }
.msg.error { background: #fee2e2; color: #991b1b; }
.role { font-size: 12px; font-weight: 600; text-transform: uppercase; color: #6b7280; }
pre { background: #111827; color: #e5e7eb; padding: 12px; border-radius: 8px; overflow-x: auto; }
table { border-collapse: collapse; } th, td { border: 1px solid #d1d5db; padding: 4px 8px; }";

/// What `/preview` would open for this segment.
pub fn preview_hint(segment: &Segment) -> Option<&'static str> {
    match segment {
        Segment::Code { language, content } => {
            let class = content::classify(language, content);
            if class.requires_setup_guide {
                Some("setup guide")
            } else if class.renderable {
                Some("live preview")
            } else if class.runtime == Runtime::Stub {
                Some("toolchain notes")
            } else {
                None
            }
        }
        Segment::CombinedCode(_) => Some("live preview"),
        _ => None,
    }
}

/// Columns padded to the widest cell; short rows are padded with blanks.
pub fn table_text(table: &TableData) -> String {
    let columns = table
        .rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(table.headers.len()))
        .max()
        .unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for row in std::iter::once(&table.headers).chain(&table.rows) {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let line = |row: &[String]| -> String {
        let cells: Vec<String> = (0..columns)
            .map(|i| {
                let cell = row.get(i).map(String::as_str).unwrap_or("");
                format!("{cell:<width$}", width = widths[i])
            })
            .collect();
        format!("| {} |", cells.join(" | ")).trim_end().to_string()
    };

    let mut out = format!("{}\n", table.title);
    if !table.headers.is_empty() {
        out.push_str(&line(&table.headers));
        out.push('\n');
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat((*w).max(1))).collect();
        out.push_str(&format!("|-{}-|\n", rule.join("-|-")));
    }
    for row in &table.rows {
        out.push_str(&line(row));
        out.push('\n');
    }
    out
}

fn code_text(index: usize, label: &str, hint: Option<&str>, body: &str) -> String {
    let hint = hint.map(|h| format!(" · /preview {index} for {h}")).unwrap_or_default();
    let body: String = body.lines().map(|l| format!("  │ {l}\n")).collect();
    format!("  ┌ [{index}] {label}{hint}\n{body}  └\n")
}

/// Segments numbered from 1, matching `/preview <n>`.
pub fn segments_text(segments: &[Segment]) -> String {
    segments
        .iter()
        .enumerate()
        .map(|(i, segment)| {
            let index = i + 1;
            let hint = preview_hint(segment);
            match segment {
                Segment::Text { content } => format!("{content}\n"),
                Segment::Code { language, content } => {
                    let label = if language.is_empty() { "code" } else { language.as_str() };
                    code_text(index, label, hint, content)
                }
                Segment::CombinedCode(combined) => {
                    let label = format!(
                        "{} ({} blocks combined)",
                        combined.language,
                        combined.source_blocks.len()
                    );
                    let body: String = combined
                        .source_blocks
                        .iter()
                        .map(|b| format!("// {}\n{}\n", b.language, b.content))
                        .collect();
                    code_text(index, &label, hint, &body)
                }
                Segment::Table(table) => table_text(table),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn message_text(message: &Message) -> String {
    match message.role {
        Role::User => {
            let mut out = format!("you › {}", message.content);
            if let Some(file) = &message.attachment {
                if !message.content.contains(&file.name) {
                    out.push_str(&format!("  [{}]", file.name));
                }
            }
            out
        }
        Role::Error => format!("⚠ {}", message.content),
        Role::System => format!("· {}", message.content),
        Role::Assistant => {
            let mut out = segments_text(&content::parse(&message.content));
            if message.is_edit_response() {
                out.push_str("  (/preview reopens the edited code)\n");
            }
            out
        }
    }
}

/// Standalone HTML page for a whole chat.
pub fn transcript_html(title: &str, messages: &[Message]) -> String {
    let body: String = messages
        .iter()
        .map(|message| {
            let inner = match message.role {
                Role::Assistant => markdown::segments_html(&content::parse(&message.content)),
                _ => markdown::to_html(&message.content),
            };
            format!(
                "<div class=\"msg {role}\"><div class=\"role\">{role}</div>{inner}</div>\n",
                role = message.role.as_str()
            )
        })
        .collect();

    HtmlDocument::new(title)
        .style(TRANSCRIPT_CSS)
        .markup(format!("<h1>{}</h1>\n{body}", markdown::escape_html(title)))
        .render()
}
