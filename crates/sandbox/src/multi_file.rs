//! Bundles of named files pasted into one preview.
//!
//! Files are recognised by a fenced block inside the previewed code, named
//! either by a `// name.ext` comment at the top of the block, a `name.ext:`
//! or `File: name.ext` line right above it, or by its tag alone
//! (`styles.css`, `App.jsx`, `index.html`).

use regex::Regex;
use std::sync::LazyLock;

use crate::builder::{escape_script, escape_style};
use crate::error::SynthesisError;
use crate::{markup, react, styles};

static TAGGED_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```(\w+)?[ \t]*(?:\n?[ \t]*//[ \t]*([\w./-]+\.(?:jsx?|css|html))[ \t]*)?\n((?s:.*?))```")
        .expect("tagged block regex")
});
static LABELLED_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\n)[ \t]*(?://[ \t]*)?(?:File:[ \t]*)?([\w./-]+\.(?:jsx?|css|html))[ \t]*:?[ \t]*\n```(\w+)?[ \t]*\n((?s:.*?))```")
        .expect("labelled block regex")
});
static HEAD_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<head[^>]*>").expect("head regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub language: String,
    pub content: String,
}

impl SourceFile {
    fn extension(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or_default()
    }
}

fn insert(files: &mut Vec<SourceFile>, file: SourceFile) {
    match files.iter_mut().find(|f| f.name == file.name) {
        Some(existing) => *existing = file,
        None => files.push(file),
    }
}

/// Named files found in `code`, in first-seen order.
pub fn parse_files(code: &str) -> Vec<SourceFile> {
    let mut files = Vec::new();

    for cap in TAGGED_BLOCK_RE.captures_iter(code) {
        let language = cap.get(1).map(|m| m.as_str().to_lowercase());
        let content = cap.get(3).map(|m| m.as_str().trim()).unwrap_or_default();
        let name = match (cap.get(2), language.as_deref()) {
            (Some(name), _) => name.as_str().to_string(),
            (None, Some("css")) => "styles.css".to_string(),
            (None, Some("jsx" | "javascript" | "js" | "react")) => "App.jsx".to_string(),
            (None, Some("html")) => "index.html".to_string(),
            _ => continue,
        };
        insert(
            &mut files,
            SourceFile {
                language: language.unwrap_or_else(|| "javascript".into()),
                name,
                content: content.to_string(),
            },
        );
    }

    for cap in LABELLED_BLOCK_RE.captures_iter(code) {
        let Some(name) = cap.get(1).map(|m| m.as_str().to_string()) else {
            continue;
        };
        let extension = name.rsplit('.').next().unwrap_or_default().to_string();
        let content = cap
            .get(3)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default();
        // Same block already picked up under an inferred name.
        files.retain(|f| f.name == name || f.content != content);
        insert(
            &mut files,
            SourceFile {
                language: cap
                    .get(2)
                    .map(|m| m.as_str().to_lowercase())
                    .unwrap_or(extension),
                name,
                content,
            },
        );
    }

    files
}

fn join_by_extension(files: &[SourceFile], extension: &str) -> String {
    files
        .iter()
        .filter(|f| f.extension() == extension)
        .map(|f| f.content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

fn enhance_html(html: &str, css: &str, js: &str) -> String {
    let lower = html.to_ascii_lowercase();
    let mut out = html.to_string();
    if !css.trim().is_empty() {
        let unstyled = !lower.contains("<style") && !lower.contains("stylesheet");
        let block = if unstyled {
            format!(
                "\n<style>\n{}\n{}\n</style>\n",
                escape_style(&styles::reset_css()),
                escape_style(css)
            )
        } else {
            format!("\n<style>\n{}\n</style>\n", escape_style(css))
        };
        let head_close = lower.find("</head>");
        let head_open = HEAD_OPEN_RE.find(html).map(|m| m.end());
        out = match (head_open, head_close) {
            (_, Some(close)) if !unstyled => format!("{}{}{}", &html[..close], block, &html[close..]),
            (Some(open), _) => format!("{}{}{}", &html[..open], block, &html[open..]),
            _ => format!("{block}{html}"),
        };
    }
    if !js.trim().is_empty() {
        let script = format!("\n<script>\n{}\n</script>\n", escape_script(js));
        let body_close = out.to_ascii_lowercase().rfind("</body>");
        out = match body_close {
            Some(close) => format!("{}{}{}", &out[..close], script, &out[close..]),
            None => format!("{out}{script}"),
        };
    }
    out
}

/// One document from a bundle: the HTML file if any, else the first script
/// as a React entry, else the stylesheets on the demo page.
pub fn bundle_document(files: &[SourceFile], additional_css: &str) -> Result<String, SynthesisError> {
    let mut css = join_by_extension(files, "css");
    if !additional_css.trim().is_empty() {
        css.push('\n');
        css.push_str(additional_css);
    }

    if let Some(html) = files.iter().find(|f| f.extension() == "html") {
        let js = join_by_extension(files, "js");
        return Ok(enhance_html(&html.content, &css, &js));
    }

    if let Some(script) = files
        .iter()
        .find(|f| matches!(f.extension(), "jsx" | "js"))
    {
        return react::document(&script.content, &css);
    }

    if css.trim().is_empty() {
        return Err(SynthesisError::Empty);
    }
    Ok(markup::css_document(&css, ""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_code_has_no_files() {
        assert!(parse_files("function App() { return <div/>; }").is_empty());
    }

    #[test]
    fn test_files_named_by_comment_and_tag() {
        let code = "```jsx\n// Counter.jsx\nfunction App() { return <div/>; }\n```\n```css\n.a { color: red; }\n```";
        let files = parse_files(code);
        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Counter.jsx", "styles.css"]);
        assert_eq!(files[0].content, "function App() { return <div/>; }");
    }

    #[test]
    fn test_labelled_block_overrides_inferred_name() {
        let code = "main.css:\n```css\nbody { margin: 0; }\n```";
        let files = parse_files(code);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "main.css");
    }

    #[test]
    fn test_html_bundle_gets_css_and_js() {
        let files = vec![
            SourceFile {
                name: "index.html".into(),
                language: "html".into(),
                content: "<html><head></head><body><p>x</p></body></html>".into(),
            },
            SourceFile {
                name: "styles.css".into(),
                language: "css".into(),
                content: "p { color: red; }".into(),
            },
            SourceFile {
                name: "app.js".into(),
                language: "javascript".into(),
                content: "console.log('hi')".into(),
            },
        ];
        let doc = bundle_document(&files, "").unwrap();
        assert!(doc.contains("<head>\n<style>"));
        assert!(doc.contains("p { color: red; }"));
        assert!(doc.contains("<script>\nconsole.log('hi')\n</script>\n</body>"));
    }

    #[test]
    fn test_jsx_bundle_is_react_page() {
        let files = vec![SourceFile {
            name: "App.jsx".into(),
            language: "jsx".into(),
            content: "function App() { return <h1>Hi</h1>; }".into(),
        }];
        let doc = bundle_document(&files, ".x {}").unwrap();
        assert!(doc.contains(styles::BABEL_STANDALONE));
        assert!(doc.contains(".x {}"));
    }
}
