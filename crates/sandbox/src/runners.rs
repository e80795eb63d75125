//! Pages that execute a snippet in the browser and show what it printed.

use crate::builder::{escape_html, js_string, HtmlDocument};
use crate::styles;

fn runner_shell(title: &str, subtitle: &str, code_heading: &str, code: &str, waiting: &str) -> String {
    format!(
        r#"<div class="container">
    <div class="header">
        <h1 class="title">{title}</h1>
        <p class="subtitle">{subtitle}</p>
    </div>
    <div class="section-header">{code_heading}</div>
    <pre><code>{code}</code></pre>
    <div class="section-header">Output</div>
    <div class="output-content" id="output"><div class="loading">{waiting}</div></div>
</div>"#,
        title = escape_html(title),
        subtitle = escape_html(subtitle),
        code_heading = escape_html(code_heading),
        code = escape_html(code.trim()),
        waiting = escape_html(waiting),
    )
}

/// Shared output helpers; every message is written with `textContent`.
const OUTPUT_HELPERS: &str = r#"function showOutput(text) {
    const output = document.getElementById('output');
    const pre = document.createElement('pre');
    pre.textContent = text;
    output.replaceChildren(pre);
}
function showSuccess() {
    const output = document.getElementById('output');
    const note = document.createElement('div');
    note.className = 'success';
    note.textContent = 'Code executed successfully (no output)';
    output.replaceChildren(note);
}
function showError(text) {
    const output = document.getElementById('output');
    const pre = document.createElement('pre');
    pre.className = 'error';
    pre.textContent = text;
    output.replaceChildren(pre);
}"#;

/// Python run by Pyodide with stdout redirected into a buffer.
pub fn python_document(code: &str) -> String {
    let script = format!(
        r#"{OUTPUT_HELPERS}

async function runPython() {{
    let pyodide;
    try {{
        pyodide = await loadPyodide({{ indexURL: {index} }});
    }} catch (error) {{
        showError('Failed to load Python interpreter: ' + error.message);
        return;
    }}
    try {{
        pyodide.runPython('import sys\nfrom io import StringIO\nsys.stdout = StringIO()\nsys.stderr = sys.stdout');
        pyodide.runPython({source});
        const captured = pyodide.runPython('sys.stdout.getvalue()');
        if (captured.trim()) {{
            showOutput(captured);
        }} else {{
            showSuccess();
        }}
    }} catch (error) {{
        showError('Error: ' + error.message);
    }}
}}

runPython();"#,
        index = js_string(styles::PYODIDE_INDEX),
        source = js_string(code),
    );

    HtmlDocument::new("Python Code Runner")
        .script_src(styles::PYODIDE_SCRIPT)
        .style(styles::runner_css(styles::PYTHON_ACCENT))
        .markup(runner_shell(
            "Python Code Runner",
            &format!("Running in your browser with Pyodide {}", styles::PYODIDE_VERSION),
            "Your Python Code",
            code,
            "Loading Python interpreter...",
        ))
        .script(script)
        .render()
}

/// JavaScript evaluated in the page with `console.log`/`console.error` captured.
///
/// TypeScript is stripped of types by standalone Babel first.
pub fn script_document(code: &str, language: &str) -> String {
    let typescript = language == "typescript";
    let compile = if typescript {
        "Babel.transform(source, { presets: ['typescript'], filename: 'snippet.ts' }).code"
    } else {
        "source"
    };
    let script = format!(
        r#"{OUTPUT_HELPERS}

function runScript() {{
    const source = {source};
    const originalLog = console.log;
    const originalError = console.error;
    const lines = [];
    const render = (args) => args.map((a) => typeof a === 'string' ? a : JSON.stringify(a)).join(' ');
    console.log = (...args) => {{ lines.push(render(args)); originalLog(...args); }};
    console.error = (...args) => {{ lines.push('Error: ' + render(args)); originalError(...args); }};
    try {{
        const compiled = {compile};
        eval(compiled);
        if (lines.length > 0) {{
            showOutput(lines.join('\n'));
        }} else {{
            showSuccess();
        }}
    }} catch (error) {{
        showError('Error: ' + error.message);
    }} finally {{
        console.log = originalLog;
        console.error = originalError;
    }}
}}

runScript();"#,
        source = js_string(code),
    );

    let (title, heading) = if typescript {
        ("TypeScript Code Runner", "Your TypeScript Code")
    } else {
        ("JavaScript Code Runner", "Your JavaScript Code")
    };
    let mut doc = HtmlDocument::new(title);
    if typescript {
        doc = doc.script_src(styles::BABEL_STANDALONE);
    }
    doc.style(styles::runner_css(styles::SCRIPT_ACCENT))
        .markup(runner_shell(
            title,
            "Running natively in your browser",
            heading,
            code,
            "Executing...",
        ))
        .script(script)
        .render()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_python_source_embedded_as_literal() {
        let doc = python_document("print(`hi` + \"${x}\")\n# </script>");
        assert!(doc.contains(styles::PYODIDE_SCRIPT));
        assert_eq!(doc.matches("</script>").count(), 2);
        assert!(doc.contains("print(`hi` + \\\"${x}\\\")"));
    }

    #[test]
    fn test_python_listing_escaped() {
        let doc = python_document("print('<b>')");
        assert!(doc.contains("print(&#39;&lt;b&gt;&#39;)"));
    }

    #[test]
    fn test_javascript_runner_patches_console() {
        let doc = script_document("console.log(1 < 2)", "javascript");
        assert!(doc.contains("console.log = (...args)"));
        assert!(doc.contains("console.log = originalLog"));
        assert!(!doc.contains(styles::BABEL_STANDALONE));
    }

    #[test]
    fn test_typescript_runner_strips_types() {
        let doc = script_document("let n: number = 1;\nconsole.log(n);", "typescript");
        assert!(doc.contains(styles::BABEL_STANDALONE));
        assert!(doc.contains("presets: ['typescript']"));
        assert!(doc.contains("TypeScript Code Runner"));
    }
}
