//! Typed construction of standalone HTML documents.
//!
//! Every interpolation goes through an escaping function chosen for its
//! context (element text, attribute, `<style>`, `<script>`, JS string,
//! comment). The only unescaped input is [`HtmlDocument::markup`], which
//! carries user markup that is meant to render as markup.

pub use content::markdown::escape_html;

/// Make `css` safe to place between `<style>` tags.
pub fn escape_style(css: &str) -> String {
    replace_ascii_ci(css, "</style", "<\\/style")
}

/// Make `js` safe to place between `<script>` tags.
pub fn escape_script(js: &str) -> String {
    let js = replace_ascii_ci(js, "</script", "<\\/script");
    js.replace("<!--", "<\\!--")
}

/// A JS string literal holding `text`, safe inside an inline script.
pub fn js_string(text: &str) -> String {
    let quoted = serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string());
    quoted
        .replace("</", "<\\/")
        .replace("<!--", "<\\!--")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}

/// Text for an HTML comment body.
pub fn escape_comment(text: &str) -> String {
    text.replace("--", "- -").replace('>', "&gt;")
}

/// Replace `needle` case-insensitively (ASCII) while keeping the rest intact.
fn replace_ascii_ci(haystack: &str, needle: &str, replacement: &str) -> String {
    let lower = haystack.to_ascii_lowercase();
    let mut out = String::with_capacity(haystack.len());
    let mut cursor = 0;
    while let Some(found) = lower[cursor..].find(needle) {
        let start = cursor + found;
        out.push_str(&haystack[cursor..start]);
        out.push_str(replacement);
        cursor = start + needle.len();
    }
    out.push_str(&haystack[cursor..]);
    out
}

enum HeadItem {
    Style(String),
    ScriptSrc { src: String, crossorigin: bool },
    Comment(String),
}

enum BodyItem {
    Markup(String),
    Script(String),
    BabelScript { source: String, presets: &'static str },
}

/// One standalone document, rendered with [`HtmlDocument::render`].
pub struct HtmlDocument {
    title: String,
    head: Vec<HeadItem>,
    body: Vec<BodyItem>,
}

impl HtmlDocument {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            head: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn style(mut self, css: impl AsRef<str>) -> Self {
        let css = css.as_ref();
        if !css.trim().is_empty() {
            self.head.push(HeadItem::Style(escape_style(css)));
        }
        self
    }

    pub fn script_src(mut self, src: &str) -> Self {
        self.head.push(HeadItem::ScriptSrc {
            src: escape_html(src),
            crossorigin: false,
        });
        self
    }

    pub fn crossorigin_script_src(mut self, src: &str) -> Self {
        self.head.push(HeadItem::ScriptSrc {
            src: escape_html(src),
            crossorigin: true,
        });
        self
    }

    pub fn head_comment(mut self, text: &str) -> Self {
        self.head.push(HeadItem::Comment(escape_comment(text)));
        self
    }

    /// Markup rendered as-is in the body.
    pub fn markup(mut self, html: impl Into<String>) -> Self {
        self.body.push(BodyItem::Markup(html.into()));
        self
    }

    /// Plain text shown in a `<pre><code>` block.
    pub fn code_listing(self, code: &str) -> Self {
        let listing = format!("<pre><code>{}</code></pre>", escape_html(code.trim()));
        self.markup(listing)
    }

    pub fn script(mut self, js: impl AsRef<str>) -> Self {
        self.body.push(BodyItem::Script(escape_script(js.as_ref())));
        self
    }

    /// Inline script compiled in the page by the standalone Babel build.
    pub fn babel_script(mut self, source: impl AsRef<str>, presets: &'static str) -> Self {
        self.body.push(BodyItem::BabelScript {
            source: escape_script(source.as_ref()),
            presets,
        });
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::from(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n    <meta charset=\"UTF-8\">\n    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
        );
        out.push_str(&format!("    <title>{}</title>\n", escape_html(&self.title)));
        for item in &self.head {
            match item {
                HeadItem::Style(css) => {
                    out.push_str("    <style>\n");
                    out.push_str(css);
                    out.push_str("\n    </style>\n");
                }
                HeadItem::ScriptSrc { src, crossorigin } => {
                    let cross = if *crossorigin { " crossorigin" } else { "" };
                    out.push_str(&format!("    <script{cross} src=\"{src}\"></script>\n"));
                }
                HeadItem::Comment(text) => {
                    out.push_str(&format!("    <!-- {text} -->\n"));
                }
            }
        }
        out.push_str("</head>\n<body>\n");
        for item in &self.body {
            match item {
                BodyItem::Markup(html) => {
                    out.push_str(html);
                    out.push('\n');
                }
                BodyItem::Script(js) => {
                    out.push_str("<script>\n");
                    out.push_str(js);
                    out.push_str("\n</script>\n");
                }
                BodyItem::BabelScript { source, presets } => {
                    out.push_str(&format!(
                        "<script type=\"text/babel\" data-presets=\"{presets}\">\n"
                    ));
                    out.push_str(source);
                    out.push_str("\n</script>\n");
                }
            }
        }
        out.push_str("</body>\n</html>\n");
        out
    }
}
