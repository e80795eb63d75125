//! Choosing and building the document for one preview.
//!
//! [`DOCUMENT_RULES`] is evaluated top to bottom and the first matching rule
//! decides the document kind. The last rule always matches.

use content::classify;
use regex::Regex;
use shared::{CombinedCode, LivePreviewState};
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::builder::{escape_html, escape_script, escape_style, HtmlDocument};
use crate::compiled::{self, Toolchain};
use crate::error::SynthesisError;
use crate::{markup, multi_file, react, runners, setup_guide};

const KNOWN_LANGUAGES: &[&str] = &[
    "html",
    "css",
    "scss",
    "sass",
    "javascript",
    "typescript",
    "jsx",
    "react",
    "python",
    "c",
    "cpp",
    "rust",
    "java",
];

/// Languages that never take the React path, whatever their content.
const NOT_REACT: &[&str] = &[
    "html",
    "css",
    "scss",
    "sass",
    "typescript",
    "python",
    "c",
    "cpp",
    "rust",
    "java",
];

static COMPONENT_FUNCTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"function\s+[A-Z][\w$]*\s*\([^)]*\)\s*\{(?s:.*)return(?s:.*)<").expect("component function regex")
});
static COMPONENT_ARROW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"const\s+[A-Z][\w$]*\s*=.*=>(?s:.*)<").expect("component arrow regex")
});
static CAPITAL_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[A-Z]").expect("capital tag regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    FullDocument,
    MultiFile,
    React,
    Css,
    HtmlFragment,
    Python,
    Script,
    Compiled,
    ReactFallback,
}

/// Normalised input to the rules.
pub struct Request<'a> {
    pub code: &'a str,
    pub language: &'a str,
    pub additional_css: &'a str,
}

impl Request<'_> {
    fn unknown_language(&self) -> bool {
        !KNOWN_LANGUAGES.contains(&self.language)
    }
}

fn looks_like_component(code: &str) -> bool {
    classify::has_react_signals(code)
        || COMPONENT_FUNCTION_RE.is_match(code)
        || COMPONENT_ARROW_RE.is_match(code)
        || (code.contains("export default") && code.contains("return") && code.contains('<'))
}

fn looks_like_css(code: &str) -> bool {
    code.contains('{')
        && code.contains('}')
        && !code.contains('<')
        && !code.contains("function")
        && !code.contains("return")
        && !code.contains("React")
        && !CAPITAL_TAG_RE.is_match(code)
}

fn looks_like_script(code: &str) -> bool {
    ["console.log", "function ", "const ", "let ", "var "]
        .iter()
        .any(|token| code.contains(token))
}

type Rule = (DocumentKind, fn(&Request) -> bool);

/// Document precedence, top to bottom.
pub const DOCUMENT_RULES: &[Rule] = &[
    (DocumentKind::FullDocument, |r| markup::is_full_document(r.code)),
    (DocumentKind::MultiFile, |r| {
        !multi_file::parse_files(r.code).is_empty()
    }),
    (DocumentKind::React, |r| {
        matches!(r.language, "jsx" | "react")
            || (!NOT_REACT.contains(&r.language)
                && !classify::looks_like_python(r.code)
                && looks_like_component(r.code))
    }),
    (DocumentKind::Css, |r| {
        classify::STYLESHEET.contains(&r.language) || (r.unknown_language() && looks_like_css(r.code))
    }),
    (DocumentKind::HtmlFragment, |r| {
        r.language == "html" || r.code.trim_start().starts_with('<')
    }),
    (DocumentKind::Python, |r| {
        classify::is_python(r.language, r.code)
            || (r.unknown_language() && classify::looks_like_python(r.code))
    }),
    (DocumentKind::Script, |r| {
        matches!(r.language, "javascript" | "typescript")
            || (r.unknown_language() && looks_like_script(r.code))
    }),
    (DocumentKind::Compiled, |r| {
        Toolchain::from_language(r.language).is_some() || Toolchain::sniff(r.code).is_some()
    }),
    (DocumentKind::ReactFallback, |_| true),
];

pub fn select_kind(request: &Request) -> DocumentKind {
    DOCUMENT_RULES
        .iter()
        .find(|(_, applies)| applies(request))
        .map(|(kind, _)| *kind)
        .unwrap_or(DocumentKind::ReactFallback)
}

/// Drop control characters other than line breaks and tabs.
fn sanitize(code: &str) -> String {
    code.chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
        .collect()
}

fn build(kind: DocumentKind, request: &Request) -> Result<String, SynthesisError> {
    let Request {
        code,
        language,
        additional_css,
    } = *request;
    match kind {
        DocumentKind::FullDocument => Ok(markup::full_document(code)),
        DocumentKind::MultiFile => {
            multi_file::bundle_document(&multi_file::parse_files(code), additional_css)
        }
        DocumentKind::React | DocumentKind::ReactFallback => react::document(code, additional_css),
        DocumentKind::Css => Ok(markup::css_document(code, additional_css)),
        DocumentKind::HtmlFragment => Ok(markup::fragment_document(code, additional_css)),
        DocumentKind::Python => Ok(runners::python_document(code)),
        DocumentKind::Script => Ok(runners::script_document(code, language)),
        DocumentKind::Compiled => {
            let toolchain = Toolchain::from_language(language)
                .or_else(|| Toolchain::sniff(code))
                .unwrap_or(Toolchain::C);
            Ok(compiled::stub_document(toolchain, code))
        }
    }
}

/// Build the document for `code`, reporting why it could not be built.
pub fn try_synthesize(
    code: &str,
    language: &str,
    additional_css: &str,
) -> Result<String, SynthesisError> {
    let code = sanitize(code);
    if code.trim().is_empty() {
        return Err(SynthesisError::Empty);
    }
    let language = classify::normalize_tag(language);
    let request = Request {
        code: &code,
        language: &language,
        additional_css,
    };
    let kind = select_kind(&request);
    debug!(?kind, language = %language, len = code.len(), "synthesizing preview document");
    build(kind, &request)
}

/// Always returns a renderable document; failures become the error page.
pub fn synthesize(code: &str, language: &str, additional_css: &str) -> String {
    match try_synthesize(code, language, additional_css) {
        Ok(document) => document,
        Err(err) => {
            warn!(error = %err, language, "preview synthesis failed");
            error_document(&err.to_string(), language)
        }
    }
}

pub fn error_document(message: &str, language: &str) -> String {
    let language = if language.trim().is_empty() {
        "code".to_string()
    } else {
        language.to_uppercase()
    };
    HtmlDocument::new("Preview Error")
        .style("body { font-family: monospace; padding: 20px; color: #b91c1c; }\npre { white-space: pre-wrap; }")
        .markup(format!(
            "<div>\n<h3>Preview Error:</h3>\n<pre>{}</pre>\n<hr>\n<p>Make sure your code is valid {}.</p>\n</div>",
            escape_html(message),
            escape_html(&language)
        ))
        .render()
}

/// Document for whatever the preview pane currently shows.
pub fn synthesize_preview(state: &LivePreviewState) -> String {
    if state.is_setup_guide {
        return setup_guide::python_setup_guide(&state.code);
    }
    synthesize(&state.code, &state.language, &state.additional_css)
}

/// Code and language to open in the preview for a combined unit.
///
/// React units become one complete page; markup units become a fragment
/// carrying their stylesheet and scripts inline.
pub fn combined_source(combined: &CombinedCode) -> (String, String) {
    let (_, main) = markup::split_styles(&combined.main_content);
    let main = main.trim();
    if matches!(
        combined.language.as_str(),
        "jsx" | "react" | "javascript" | "typescript"
    ) {
        let mut source = main.to_string();
        if !combined.additional_js.trim().is_empty() {
            source.push_str("\n\n");
            source.push_str(&combined.additional_js);
        }
        let document = react::document(&source, &combined.css)
            .unwrap_or_else(|err| error_document(&err.to_string(), "jsx"));
        return (document, "jsx".to_string());
    }

    let mut fragment = main.to_string();
    if !combined.css.trim().is_empty() {
        fragment.push_str(&format!("\n<style>\n{}\n</style>", escape_style(&combined.css)));
    }
    if !combined.additional_js.trim().is_empty() {
        fragment.push_str(&format!(
            "\n<script>\n{}\n</script>",
            escape_script(&combined.additional_js)
        ));
    }
    (fragment, combined.language.clone())
}
