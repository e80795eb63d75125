//! Stylesheets, CDN locations and fixed markup shared by the document kinds.

pub const REACT_UMD: &str = "https://unpkg.com/react@18/umd/react.development.js";
pub const REACT_DOM_UMD: &str = "https://unpkg.com/react-dom@18/umd/react-dom.development.js";
pub const BABEL_STANDALONE: &str = "https://unpkg.com/@babel/standalone/babel.min.js";
pub const PYODIDE_VERSION: &str = "v0.24.1";
pub const PYODIDE_SCRIPT: &str = "https://cdn.jsdelivr.net/pyodide/v0.24.1/full/pyodide.js";
pub const PYODIDE_INDEX: &str = "https://cdn.jsdelivr.net/pyodide/v0.24.1/full/";

const FONT_STACK: &str = "-apple-system, BlinkMacSystemFont, 'Segoe UI', 'Roboto', 'Oxygen', 'Ubuntu', 'Cantarell', 'Fira Sans', 'Droid Sans', 'Helvetica Neue', sans-serif";

/// Minimal reset patched into documents that bring no styling of their own.
pub fn reset_css() -> String {
    format!(
        "* {{ box-sizing: border-box; }}\nhtml, body {{ margin: 0; padding: 0; min-height: 100%; overflow-x: hidden; overflow-y: auto; }}\nbody {{ font-family: {FONT_STACK}; }}"
    )
}

pub fn padded_reset_css() -> String {
    format!("{}\nbody {{ padding: 20px; }}", reset_css())
}

/// Demo rounding applied to fragments so snippets look like finished cards.
pub const ROUNDED_CORNERS_CSS: &str = r#"*, *::before, *::after {
    border-radius: 12px !important;
}
div, section, article, main, header, footer,
.quiz-container, .container, .app, .main, .content,
div[class*="container"], div[class*="wrapper"],
div[class*="quiz"], div[class*="app"] {
    border-radius: 16px !important;
    overflow: hidden !important;
}
.question, .options, .option, .card, .panel,
button, input, select, textarea {
    border-radius: 8px !important;
}
[style*="background"], [class*="bg-"], [style*="border"],
h1, h2, h3, h4, h5, h6, p, span, li, ul, ol {
    border-radius: 8px !important;
}"#;

pub fn react_css() -> String {
    format!(
        "* {{ margin: 0; padding: 0; box-sizing: border-box; }}\nhtml, body {{ margin: 0; padding: 0; height: 100%; overflow-x: hidden; }}\nbody {{ padding: 20px; font-family: {FONT_STACK}; }}\n#root {{ min-height: calc(100vh - 40px); border-radius: 16px; overflow: hidden; }}\n.preview-error {{ color: #b91c1c; padding: 20px; font-family: monospace; white-space: pre-wrap; }}"
    )
}

/// Sample elements a bare stylesheet is applied to.
pub const CSS_DEMO_BODY: &str = r#"<div class="quiz-container" style="border-radius: 16px; overflow: hidden; background: white; padding: 20px;">
    <h1>CSS Preview</h1>
    <p>Your CSS styles are applied to this page.</p>
    <div class="question" style="background: #f5f5f5; padding: 10px; margin: 10px 0;">Sample question content</div>
    <div class="options" style="margin: 10px 0;">
        <div class="option" style="background: #e0e0e0; padding: 8px; margin: 5px 0;">Option 1</div>
        <div class="option" style="background: #e0e0e0; padding: 8px; margin: 5px 0;">Option 2</div>
    </div>
    <button class="start-btn" style="padding: 10px 20px; margin: 5px; background: #007bff; color: white; border: none;">Start Button</button>
    <button class="submit-btn" style="padding: 10px 20px; margin: 5px; background: #28a745; color: white; border: none;">Submit Button</button>
</div>"#;

/// Dark card layout shared by the runner and instruction pages.
pub fn runner_css(accent: &str) -> String {
    format!(
        r#"* {{ margin: 0; padding: 0; box-sizing: border-box; }}
body {{ font-family: {FONT_STACK}; background: {accent}; min-height: 100vh; padding: 24px; color: #f8fafc; }}
.container {{ max-width: 960px; margin: 0 auto; background: rgba(15, 23, 42, 0.85); border-radius: 16px; overflow: hidden; box-shadow: 0 20px 40px rgba(0, 0, 0, 0.35); }}
.header {{ padding: 20px 24px; border-bottom: 1px solid rgba(255, 255, 255, 0.1); }}
.title {{ font-size: 1.4rem; font-weight: 700; }}
.subtitle {{ opacity: 0.7; margin-top: 4px; }}
.section-header {{ padding: 12px 24px; font-weight: 600; background: rgba(255, 255, 255, 0.05); }}
pre {{ padding: 16px 24px; overflow-x: auto; font-family: 'SFMono-Regular', Consolas, monospace; font-size: 13px; line-height: 1.5; white-space: pre-wrap; }}
.output-content {{ min-height: 80px; }}
.setup-content {{ padding: 16px 24px; line-height: 1.6; }}
.setup-content pre {{ background: rgba(0, 0, 0, 0.3); border-radius: 8px; margin: 8px 0; }}
.note {{ margin-top: 16px; padding: 12px 16px; border-radius: 8px; background: rgba(59, 130, 246, 0.15); }}
.loading, .success {{ padding: 16px 24px; opacity: 0.8; }}
.error {{ color: #fca5a5; }}"#
    )
}

pub const PYTHON_ACCENT: &str = "linear-gradient(135deg, #306998 0%, #1e3a5f 100%)";
pub const SCRIPT_ACCENT: &str = "linear-gradient(135deg, #ca8a04 0%, #854d0e 100%)";
pub const C_ACCENT: &str = "linear-gradient(135deg, #dc2626 0%, #7f1d1d 100%)";
pub const RUST_ACCENT: &str = "linear-gradient(135deg, #ea580c 0%, #7c2d12 100%)";
pub const JAVA_ACCENT: &str = "linear-gradient(135deg, #2563eb 0%, #1e3a8a 100%)";
pub const GUIDE_ACCENT: &str = "linear-gradient(135deg, #c2410c 0%, #431407 100%)";
