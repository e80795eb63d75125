//! React/JSX documents compiled in the page by standalone Babel.
//!
//! The page mounts the component named `App`. Models are told to define it;
//! `Component` and a short list of capitalised declarations found in the
//! source are tried next, in source order. Syntax errors are left to Babel;
//! the page's error listener shows them in place of the component.

use regex::Regex;
use std::sync::LazyLock;

use crate::builder::{js_string, HtmlDocument};
use crate::error::SynthesisError;
use crate::styles;

/// The component every preview mounts first.
pub const ENTRY_POINT: &str = "App";
const MAX_FALLBACK_CANDIDATES: usize = 8;

const HOOK_PRELUDE: &str = "const { useState, useEffect, useRef, useMemo, useCallback, useContext, useReducer, createContext, Fragment } = React;";

static IMPORT_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*import\s[^\n]*$\n?").expect("import line regex"));
static EXPORT_DEFAULT_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*export\s+default\s+[A-Za-z_$][\w$]*\s*;?\s*$\n?").expect("export name regex")
});
static EXPORT_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(\s*)export\s+(?:default\s+)?((?:async\s+)?function|const|let|var|class)\b")
        .expect("export prefix regex")
});
static BABEL_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script[^>]*type\s*=\s*["']text/babel["'][^>]*>(.*?)</script>"#)
        .expect("babel block regex")
});
static COMPONENT_DECL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(?:function\s+([A-Z][\w$]*)\s*\(|(?:const|let|var)\s+([A-Z][\w$]*)\s*=|class\s+([A-Z][\w$]*)\s+extends\b)")
        .expect("component declaration regex")
});

/// Strip module syntax that cannot run in a classic script.
pub fn clean_source(code: &str) -> String {
    let code = BABEL_BLOCK_RE
        .captures(code)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str())
        .unwrap_or(code);
    let code = IMPORT_LINE_RE.replace_all(code, "");
    let code = EXPORT_DEFAULT_NAME_RE.replace_all(&code, "");
    EXPORT_PREFIX_RE
        .replace_all(&code, "$1$2")
        .trim()
        .to_string()
}

/// Capitalised top-level declarations, in source order.
pub fn component_candidates(source: &str) -> Vec<String> {
    let mut names = vec![ENTRY_POINT.to_string(), "Component".to_string()];
    for cap in COMPONENT_DECL_RE.captures_iter(source) {
        let Some(name) = cap.get(1).or_else(|| cap.get(2)).or_else(|| cap.get(3)) else {
            continue;
        };
        let name = name.as_str().to_string();
        if !names.contains(&name) {
            names.push(name);
        }
        if names.len() >= MAX_FALLBACK_CANDIDATES {
            break;
        }
    }
    names
}

fn mounts_itself(source: &str) -> bool {
    source.contains("createRoot(") || source.contains("ReactDOM.render(")
}

fn mount_script(candidates: &[String]) -> String {
    let lookups: Vec<String> = candidates
        .iter()
        .map(|name| format!("typeof {name} === 'function' ? {name} : null"))
        .collect();
    format!(
        r#"
;(function mountPreview() {{
    const rootElement = document.getElementById('root');
    const Entry = [{lookups}].find(Boolean);
    if (Entry) {{
        ReactDOM.createRoot(rootElement).render(React.createElement(Entry));
    }} else {{
        rootElement.innerHTML = '<div class="preview-error"><h3>No React component found</h3><p>Define a component function named {ENTRY_POINT}.</p></div>';
    }}
}})();"#,
        lookups = lookups.join(", ")
    )
}

fn error_reporter() -> String {
    format!(
        r#"window.addEventListener('error', function (event) {{
    const root = document.getElementById('root');
    if (!root) return;
    const box = document.createElement('div');
    box.className = 'preview-error';
    box.textContent = {prefix} + (event.message || String(event.error));
    root.replaceChildren(box);
}});"#,
        prefix = js_string("Preview Error: ")
    )
}

/// Full React page for `code`, with `additional_css` applied after the defaults.
pub fn document(code: &str, additional_css: &str) -> Result<String, SynthesisError> {
    let source = clean_source(code);
    if source.trim().is_empty() {
        return Err(SynthesisError::Empty);
    }

    let mut script = String::new();
    if !source.contains("} = React") {
        script.push_str(HOOK_PRELUDE);
        script.push_str("\n\n");
    }
    script.push_str(&source);
    if !mounts_itself(&source) {
        script.push_str(&mount_script(&component_candidates(&source)));
    }

    Ok(HtmlDocument::new("React Preview")
        .script_src(styles::REACT_UMD)
        .script_src(styles::REACT_DOM_UMD)
        .script_src(styles::BABEL_STANDALONE)
        .style(styles::react_css())
        .style(styles::ROUNDED_CORNERS_CSS)
        .style(additional_css)
        .markup("<div id=\"root\"></div>")
        .script(error_reporter())
        .babel_script(script, "react")
        .render())
}
