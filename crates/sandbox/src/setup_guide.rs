//! Local setup instructions for Python that cannot run in the browser.

use content::classify;

use crate::builder::{escape_html, HtmlDocument};
use crate::styles;

/// The `pip install` line for `code`, or a placeholder if it imports nothing third-party.
pub fn pip_command(code: &str) -> String {
    let packages = classify::pip_packages(code);
    if packages.is_empty() {
        "pip install library_name".to_string()
    } else {
        format!("pip install {}", packages.join(" "))
    }
}

pub fn python_setup_guide(code: &str) -> String {
    let reason = match classify::pyodide_blocker(code) {
        Some(reason) => format!("This Python code requires local setup because it uses {reason}, which is not supported in the browser."),
        None => "This Python code is best run with a local Python installation.".to_string(),
    };
    let body = format!(
        r#"<div class="container">
    <div class="header">
        <h1 class="title">Python Setup Guide</h1>
        <p class="subtitle">{reason}</p>
    </div>
    <div class="setup-content">
        <p><strong>1. Install Python (if not already installed):</strong></p>
        <ul>
            <li>Download from <a href="https://python.org" target="_blank" rel="noopener noreferrer">https://python.org</a></li>
            <li>Or use package managers: <code>brew install python</code> (macOS)</li>
            <li>Or: <code>apt install python3</code> (Ubuntu)</li>
        </ul>
        <p><strong>2. Install required libraries:</strong></p>
        <pre id="pip">{pip}</pre>
        <p><strong>3. Save the code to a file</strong> (e.g. <code>main.py</code>):</p>
        <pre><code>{code}</code></pre>
        <p><strong>4. Run the code:</strong></p>
        <pre>python main.py</pre>
        <div class="note"><strong>Note:</strong> This code uses features like user input, file operations, system calls, or external libraries that require a full Python environment.</div>
    </div>
</div>"#,
        reason = escape_html(&reason),
        pip = escape_html(&pip_command(code)),
        code = escape_html(code.trim()),
    );

    HtmlDocument::new("Python Setup Guide")
        .style(styles::runner_css(styles::GUIDE_ACCENT))
        .markup(body)
        .render()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requests_listed_for_install() {
        let code = "import os\nimport json\nimport requests\n\nprint(requests.get('https://example.com').status_code)";
        assert_eq!(pip_command(code), "pip install requests");
        let doc = python_setup_guide(code);
        assert!(doc.contains("<pre id=\"pip\">pip install requests</pre>"));
        assert!(doc.contains("native-only library"));
    }

    #[test]
    fn test_stdlib_only_uses_placeholder() {
        assert_eq!(pip_command("import sys\nname = input()"), "pip install library_name");
    }
}
