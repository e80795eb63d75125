//! Instruction pages for languages that need a local toolchain.
//!
//! The code is only displayed. Nothing here is executed in the preview.

use crate::builder::{escape_html, HtmlDocument};
use crate::styles;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toolchain {
    C,
    Cpp,
    Rust,
    Java,
}

impl Toolchain {
    pub fn from_language(language: &str) -> Option<Self> {
        match language {
            "c" => Some(Toolchain::C),
            "cpp" | "c++" => Some(Toolchain::Cpp),
            "rust" => Some(Toolchain::Rust),
            "java" => Some(Toolchain::Java),
            _ => None,
        }
    }

    /// Guess from the body when the tag says nothing useful.
    pub fn sniff(code: &str) -> Option<Self> {
        if code.contains("#include") {
            Some(if code.contains("std::") || code.contains("iostream") {
                Toolchain::Cpp
            } else {
                Toolchain::C
            })
        } else if code.contains("fn main()") {
            Some(Toolchain::Rust)
        } else if code.contains("public static void main") {
            Some(Toolchain::Java)
        } else if code.contains("int main") {
            Some(Toolchain::C)
        } else {
            None
        }
    }

    fn name(self) -> &'static str {
        match self {
            Toolchain::C => "C",
            Toolchain::Cpp => "C++",
            Toolchain::Rust => "Rust",
            Toolchain::Java => "Java",
        }
    }

    fn accent(self) -> &'static str {
        match self {
            Toolchain::C | Toolchain::Cpp => styles::C_ACCENT,
            Toolchain::Rust => styles::RUST_ACCENT,
            Toolchain::Java => styles::JAVA_ACCENT,
        }
    }

    fn source_file(self) -> &'static str {
        match self {
            Toolchain::C => "program.c",
            Toolchain::Cpp => "program.cpp",
            Toolchain::Rust => "src/lib.rs",
            Toolchain::Java => "YourClass.java",
        }
    }

    /// `(heading, command)` pairs shown in order.
    fn steps(self) -> Vec<(&'static str, String)> {
        match self {
            Toolchain::C | Toolchain::Cpp => {
                let (file, compiler) = if self == Toolchain::C {
                    ("program.c", "emcc")
                } else {
                    ("program.cpp", "em++")
                };
                vec![
                    (
                        "Install Emscripten",
                        "git clone https://github.com/emscripten-core/emsdk.git\ncd emsdk\n./emsdk install latest\n./emsdk activate latest\nsource ./emsdk_env.sh".to_string(),
                    ),
                    (
                        "Compile to WebAssembly",
                        format!("{compiler} {file} -o program.html -s WASM=1"),
                    ),
                    (
                        "Serve and run",
                        "python3 -m http.server 8000\n# Open http://localhost:8000/program.html".to_string(),
                    ),
                ]
            }
            Toolchain::Rust => vec![
                (
                    "Install wasm-pack",
                    "curl https://rustwasm.github.io/wasm-pack/installer/init.sh -sSf | sh".to_string(),
                ),
                (
                    "Create Cargo.toml",
                    "[package]\nname = \"rust-wasm\"\nversion = \"0.1.0\"\nedition = \"2021\"\n\n[lib]\ncrate-type = [\"cdylib\"]\n\n[dependencies]\nwasm-bindgen = \"0.2\"".to_string(),
                ),
                ("Build WebAssembly", "wasm-pack build --target web".to_string()),
                (
                    "Use in HTML",
                    "import init from './pkg/rust_wasm.js';\nawait init();".to_string(),
                ),
            ],
            Toolchain::Java => vec![
                ("Compile Java code", "javac YourClass.java".to_string()),
                (
                    "Add CheerpJ to your HTML",
                    "<script src=\"https://cjrtnc.leaningtech.com/3.0/cj3loader.js\"></script>".to_string(),
                ),
                (
                    "Initialize and run",
                    "<script>\n(async function() {\n    await cheerpjInit();\n    await cheerpjRunMain(\"YourClass\", \"/app/\");\n})();\n</script>".to_string(),
                ),
                (
                    "Alternative - Use TeaVM",
                    "# Compile Java to JavaScript\nmvn clean compile teavm:compile".to_string(),
                ),
            ],
        }
    }

    fn note(self) -> &'static str {
        match self {
            Toolchain::C | Toolchain::Cpp => "C/C++ requires compilation to WebAssembly to run in browsers. This preview shows your code structure and compilation instructions.",
            Toolchain::Rust => "Rust compiles to WebAssembly for high-performance browser execution. This preview shows your code structure and setup instructions.",
            Toolchain::Java => "Java can run in browsers using CheerpJ (runs .class files) or TeaVM (compiles to JavaScript). This preview shows your code structure and setup options.",
        }
    }
}

pub fn stub_document(toolchain: Toolchain, code: &str) -> String {
    let name = toolchain.name();
    let mut setup = String::new();
    for (index, (heading, command)) in toolchain.steps().iter().enumerate() {
        setup.push_str(&format!(
            "<p><strong>{}. {}:</strong></p>\n<pre>{}</pre>\n",
            index + 1,
            escape_html(heading),
            escape_html(command)
        ));
    }
    let body = format!(
        r#"<div class="container">
    <div class="header">
        <h1 class="title">{name} Code Preview</h1>
        <p class="subtitle">Save as <code>{file}</code> and build locally</p>
    </div>
    <div class="section-header">Your {name} Code</div>
    <pre><code>{code}</code></pre>
    <div class="section-header">Setup</div>
    <div class="setup-content">
{setup}        <div class="note"><strong>Note:</strong> {note}</div>
    </div>
</div>"#,
        name = escape_html(name),
        file = escape_html(toolchain.source_file()),
        code = escape_html(code.trim()),
        note = escape_html(toolchain.note()),
    );

    HtmlDocument::new(format!("{name} Code Preview"))
        .style(styles::runner_css(toolchain.accent()))
        .markup(body)
        .render()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_mapping() {
        assert_eq!(Toolchain::from_language("cpp"), Some(Toolchain::Cpp));
        assert_eq!(Toolchain::from_language("python"), None);
        assert_eq!(Toolchain::sniff("#include <iostream>\nint main(){}"), Some(Toolchain::Cpp));
        assert_eq!(Toolchain::sniff("fn main() {}"), Some(Toolchain::Rust));
    }

    #[test]
    fn test_c_stub_shows_emcc() {
        let doc = stub_document(Toolchain::C, "int main(void) { return 0; }");
        assert!(doc.contains("emcc program.c -o program.html -s WASM=1"));
        assert!(!doc.contains("<script"));
    }

    #[test]
    fn test_java_stub_escapes_instructions() {
        let doc = stub_document(Toolchain::Java, "public class A {}");
        assert!(doc.contains("&lt;script src=&quot;https://cjrtnc.leaningtech.com/3.0/cj3loader.js&quot;&gt;"));
        assert!(!doc.contains("<script"));
    }

    #[test]
    fn test_rust_stub_lists_wasm_pack() {
        let doc = stub_document(Toolchain::Rust, "fn main() {}");
        assert!(doc.contains("wasm-pack build --target web"));
    }
}
