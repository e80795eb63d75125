//! Language and intent heuristics for code blocks.
//!
//! Everything here is a pure function of `(language, body)`. The checks are
//! kept as ordered rule tables so each heuristic can be read and tested on
//! its own; the first rule that fires wins.

use regex::Regex;
use shared::{Classification, Runtime};
use std::sync::LazyLock;

/// Languages whose blocks can anchor a combined preview.
pub const MARKUP_OR_SCRIPT: &[&str] = &["html", "jsx", "javascript", "typescript"];
pub const STYLESHEET: &[&str] = &["css", "scss", "sass"];
/// Languages shown with toolchain instructions instead of running.
pub const COMPILED: &[&str] = &["c", "cpp", "rust", "java"];

const PREVIEW_LANGUAGES: &[&str] = &[
    "html",
    "css",
    "javascript",
    "typescript",
    "jsx",
    "react",
    "c",
    "cpp",
    "rust",
    "java",
];

/// Languages that earn the preview action without any other content signal.
const SELF_EVIDENT: &[&str] = &["python", "javascript", "typescript", "c", "cpp", "rust", "java"];

/// Libraries and calls that only work with a local Python install.
const NATIVE_ONLY_PYTHON: &[&str] = &[
    "django",
    "flask",
    "fastapi",
    "tornado",
    "aiohttp",
    "bottle",
    "pyramid",
    "tensorflow",
    "torch",
    "pytorch",
    "keras",
    "sklearn",
    "cv2",
    "opencv",
    "selenium",
    "beautifulsoup4",
    "scrapy",
    "requests-html",
    "requests",
    "pygame",
    "tkinter",
    "pyqt",
    "kivy",
    "wxpython",
    "multiprocessing",
    "threading",
    "asyncio.subprocess",
    "os.system",
    "subprocess",
    "sys.exit",
    "sqlite3",
    "pymongo",
    "sqlalchemy",
    "psycopg2",
    "mysql",
    "docker",
    "kubernetes",
    "boto3",
    "azure",
    "google-cloud",
];

/// Module names that ship with CPython and never need `pip install`.
const PYTHON_STDLIB: &[&str] = &[
    "abc", "argparse", "array", "asyncio", "base64", "bisect", "calendar", "collections",
    "contextlib", "copy", "csv", "dataclasses", "datetime", "decimal", "email", "enum",
    "fractions", "functools", "getpass", "glob", "gzip", "hashlib", "heapq", "html", "http",
    "inspect", "io", "itertools", "json", "locale", "logging", "math", "multiprocessing",
    "operator", "os", "pathlib", "pickle", "platform", "pprint", "queue", "random", "re",
    "secrets", "select", "shutil", "signal", "socket", "sqlite3", "ssl", "statistics", "string",
    "struct", "subprocess", "sys", "tarfile", "tempfile", "textwrap", "threading", "time",
    "timeit", "tkinter", "traceback", "typing", "unittest", "urllib", "uuid", "warnings",
    "weakref", "xml", "zipfile",
];

/// Import names whose pip distribution is named differently.
const PIP_ALIASES: &[(&str, &str)] = &[
    ("cv2", "opencv-python"),
    ("sklearn", "scikit-learn"),
    ("bs4", "beautifulsoup4"),
    ("PIL", "Pillow"),
    ("yaml", "PyYAML"),
];

static JSX_CAPITAL_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[A-Z]").expect("capital tag regex"));
static JSX_RETURN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"return\s*\((?s:.*)<").expect("jsx return regex"));
static REACT_HOOK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\buse(?:State|Effect|Ref|Memo|Callback|Context|Reducer|LayoutEffect)\b")
        .expect("hook regex")
});
static MARKUP_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(?:div|span|p|h1|h2|h3|button)\b").expect("markup regex"));
static COMPONENT_SIGNATURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"function\s+\w+|const\s+\w+\s*=.*=>|export\s+default").expect("component regex")
});
static PY_SYSTEM_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:os|sys)\.|\bsubprocess\b").expect("system regex"));
static PY_FILE_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bopen\s*\(").expect("open regex"));
static PY_MODE_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"['"](?:r|w|a|x)[bt+]?['"]"#).expect("mode literal regex")
});
static PY_INPUT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\binput\s*\(").expect("input regex"));
static PY_NETWORK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bsocket\b|\burllib\b|\brequests\.").expect("network regex"));
static PY_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(?:import|from)\s+([A-Za-z_][A-Za-z0-9_]*)").expect("import regex")
});
static JS_SIGNAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:const|let|var|function)\s|=>|console\.|from\s+['\x22]|\brequire\(")
        .expect("js signal regex")
});

/// Canonical spelling for a fence tag.
pub fn normalize_tag(tag: &str) -> String {
    let lower = tag.trim().to_lowercase();
    match lower.as_str() {
        "react" => "jsx",
        "js" | "mjs" | "cjs" => "javascript",
        "ts" => "typescript",
        "tsx" => "jsx",
        "py" | "python3" => "python",
        "htm" | "xhtml" => "html",
        "c++" | "cc" | "cxx" | "hpp" => "cpp",
        "rs" => "rust",
        _ => return lower,
    }
    .to_string()
}

/// Any one of these marks a block as React/JSX.
pub fn has_react_signals(body: &str) -> bool {
    body.contains("import React")
        || body.contains("from \"react\"")
        || body.contains("from 'react'")
        || body.contains("React.")
        || body.contains("ReactDOM")
        || body.contains("type=\"text/babel\"")
        || body.contains("className=")
        || JSX_CAPITAL_TAG.is_match(body)
        || REACT_HOOK.is_match(body)
        || JSX_RETURN.is_match(body)
}

type LanguageRule = (&'static str, fn(Option<&str>, &str) -> Option<String>);

/// Precedence for a block's display language, top to bottom.
const LANGUAGE_RULES: &[LanguageRule] = &[
    ("react tag is jsx", |tag, _| {
        (tag.map(normalize_tag).as_deref() == Some("jsx")).then(|| "jsx".to_string())
    }),
    ("html/javascript with React signals is jsx", |tag, body| {
        let lang = tag.map(normalize_tag).unwrap_or_else(|| "javascript".into());
        (matches!(lang.as_str(), "html" | "javascript") && has_react_signals(body))
            .then(|| "jsx".to_string())
    }),
    ("declared tag", |tag, _| {
        tag.map(normalize_tag).filter(|lang| !lang.is_empty())
    }),
    ("untagged defaults to javascript", |_, _| Some("javascript".to_string())),
];

/// Language for a block given its fence tag and body.
pub fn resolve_language(tag: Option<&str>, body: &str) -> String {
    LANGUAGE_RULES
        .iter()
        .find_map(|(_, rule)| rule(tag, body))
        .unwrap_or_else(|| "javascript".to_string())
}

/// Python keywords without the markers of a script language.
pub fn looks_like_python(body: &str) -> bool {
    let keywords = body.contains("print(")
        || body.contains("def ")
        || body.contains("import ")
        || body.contains("if __name__");
    keywords && !JS_SIGNAL.is_match(body)
}

/// Whether `(language, body)` should be treated as Python.
pub fn is_python(language: &str, body: &str) -> bool {
    language == "python" || (language == "javascript" && looks_like_python(body))
}

/// Name of the first native-only library the code touches, if any.
pub fn native_only_library(body: &str) -> Option<&'static str> {
    let lower = body.to_lowercase();
    NATIVE_ONLY_PYTHON.iter().copied().find(|lib| {
        lower.contains(&format!("import {lib}"))
            || lower.contains(&format!("from {lib}"))
            || lower.contains(&format!("{lib}."))
    })
}

type PythonCheck = (&'static str, fn(&str) -> bool);

/// Reasons a Python block cannot run in the browser interpreter.
const PYODIDE_BLOCKERS: &[PythonCheck] = &[
    ("native-only library", |body| native_only_library(body).is_some()),
    ("file access", |body| {
        PY_FILE_OPEN.is_match(body) && PY_MODE_LITERAL.is_match(body)
    }),
    ("interactive input", |body| PY_INPUT.is_match(body)),
    ("system access", |body| PY_SYSTEM_TOKEN.is_match(body)),
    ("networking", |body| PY_NETWORK.is_match(body)),
];

/// First reason the code needs a local interpreter, or `None` if it can run in the browser.
pub fn pyodide_blocker(body: &str) -> Option<&'static str> {
    PYODIDE_BLOCKERS
        .iter()
        .find(|(_, check)| check(body))
        .map(|(reason, _)| *reason)
}

pub fn is_pyodide_compatible(body: &str) -> bool {
    pyodide_blocker(body).is_none()
}

/// Third-party packages to `pip install` for the setup guide, in import order.
pub fn pip_packages(body: &str) -> Vec<String> {
    let mut packages: Vec<String> = Vec::new();
    for cap in PY_IMPORT.captures_iter(body) {
        let Some(module) = cap.get(1).map(|m| m.as_str()) else {
            continue;
        };
        if PYTHON_STDLIB.contains(&module) {
            continue;
        }
        let package = PIP_ALIASES
            .iter()
            .find(|(import, _)| *import == module)
            .map(|(_, pip)| pip.to_string())
            .unwrap_or_else(|| module.to_string());
        if !packages.contains(&package) {
            packages.push(package);
        }
    }
    packages
}

fn has_positive_signal(language: &str, body: &str) -> bool {
    let trimmed = body.trim_start();
    let react_import = body.contains("import React")
        || body.contains("from \"react\"")
        || body.contains("React.")
        || body.contains("ReactDOM");
    let jsx_elements = JSX_CAPITAL_TAG.is_match(body) || MARKUP_TAG.is_match(body);
    let is_html = language == "html"
        || trimmed.to_lowercase().starts_with("<!doctype")
        || trimmed.starts_with("<html");
    let is_css = language == "css"
        || (body.contains('{')
            && (body.contains("background") || body.contains("color") || body.contains("margin")));
    let multi_file = crate::fence::delimiter_count(body) >= 4;
    let react = matches!(language, "jsx" | "react") || has_react_signals(body);

    react_import
        || jsx_elements
        || COMPONENT_SIGNATURE.is_match(body)
        || is_html
        || is_css
        || multi_file
        || react
        || SELF_EVIDENT.contains(&language)
}

/// Classify one code block.
pub fn classify(language: &str, body: &str) -> Classification {
    let language = normalize_tag(language);
    let python = is_python(&language, body);
    let pyodide_ok = python && is_pyodide_compatible(body);
    let detected_language = if python {
        "python".to_string()
    } else {
        language
    };

    let supported = PREVIEW_LANGUAGES.contains(&detected_language.as_str())
        || (detected_language == "python" && pyodide_ok);
    let renderable = body.lines().count() > 3
        && supported
        && has_positive_signal(&detected_language, body);

    let runtime = if python {
        if pyodide_ok {
            Runtime::Pyodide
        } else {
            Runtime::Stub
        }
    } else if COMPILED.contains(&detected_language.as_str()) {
        Runtime::Stub
    } else {
        Runtime::Native
    };

    Classification {
        renderable,
        runtime,
        detected_language,
        requires_setup_guide: python && !pyodide_ok,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COUNTER: &str = "function Counter() {\n  const [n, setN] = useState(0);\n  return (\n    <button onClick={() => setN(n + 1)}>{n}</button>\n  );\n}";

    #[test]
    fn test_react_tag_normalizes_to_jsx() {
        assert_eq!(resolve_language(Some("react"), "x"), "jsx");
        assert_eq!(resolve_language(Some("React"), "x"), "jsx");
    }

    #[test]
    fn test_javascript_with_hooks_promoted() {
        assert_eq!(resolve_language(Some("javascript"), COUNTER), "jsx");
        assert_eq!(resolve_language(None, COUNTER), "jsx");
    }

    #[test]
    fn test_plain_html_document_stays_html() {
        let doc = "<!DOCTYPE html><html><body><h1>Hi</h1></body></html>";
        assert_eq!(resolve_language(Some("html"), doc), "html");
    }

    #[test]
    fn test_css_never_promoted() {
        assert_eq!(resolve_language(Some("css"), ".App { color: red; }"), "css");
    }

    #[test]
    fn test_requests_needs_setup_guide() {
        let code = "import requests\n\nresp = requests.get('https://example.com')\nprint(resp.status_code)\nprint('done')";
        let result = classify("python", code);
        assert!(!result.renderable);
        assert!(result.requires_setup_guide);
        assert_eq!(result.runtime, Runtime::Stub);
        assert_eq!(pyodide_blocker(code), Some("native-only library"));
    }

    #[test]
    fn test_plain_python_runs_in_browser() {
        let code = "def square(x):\n    return x * x\n\nfor i in range(3):\n    print(square(i))";
        let result = classify("python", code);
        assert!(result.renderable);
        assert_eq!(result.runtime, Runtime::Pyodide);
        assert!(!result.requires_setup_guide);
    }

    #[test]
    fn test_os_token_needs_word_boundary() {
        assert!(is_pyodide_compatible("photos.append(1)\nprint(photos)"));
        assert!(!is_pyodide_compatible("import os\nprint(os.getcwd())"));
    }

    #[test]
    fn test_input_and_file_writes_block_pyodide() {
        assert_eq!(pyodide_blocker("name = input('Name? ')"), Some("interactive input"));
        assert_eq!(
            pyodide_blocker("with open('out.txt', 'w') as f:\n    f.write('x')"),
            Some("file access")
        );
    }

    #[test]
    fn test_untagged_python_detected() {
        let code = "def greet(name):\n    print(f'hi {name}')\n\ngreet('a')\ngreet('b')";
        let result = classify("javascript", code);
        assert_eq!(result.detected_language, "python");
        assert_eq!(result.runtime, Runtime::Pyodide);
    }

    #[test]
    fn test_javascript_import_is_not_python() {
        assert!(!looks_like_python("import { x } from './x.js';\nconsole.log(x);"));
    }

    #[test]
    fn test_short_snippets_not_renderable() {
        assert!(!classify("html", "<p>hi</p>").renderable);
    }

    #[test]
    fn test_compiled_languages_are_stubs() {
        let code = "#include <stdio.h>\n\nint main(void) {\n    printf(\"hi\\n\");\n    return 0;\n}";
        let result = classify("c", code);
        assert!(result.renderable);
        assert_eq!(result.runtime, Runtime::Stub);
        assert!(!result.requires_setup_guide);
    }

    #[test]
    fn test_classifier_is_deterministic() {
        assert_eq!(classify("jsx", COUNTER), classify("jsx", COUNTER));
    }

    #[test]
    fn test_pip_packages_skip_stdlib_and_alias() {
        let code = "import os\nimport requests\nfrom bs4 import BeautifulSoup\nimport json\nimport requests";
        assert_eq!(pip_packages(code), vec!["requests", "beautifulsoup4"]);
    }
}
