//! Sandbox documents for live previews
//!
//! Builds one complete, self-contained HTML page per previewed snippet:
//! - Full documents (patched with a reset stylesheet when unstyled)
//! - Multi-file bundles named by filename comments
//! - React/JSX compiled in the page by standalone Babel
//! - CSS on a sample page, HTML fragments with their styles hoisted
//! - Python via Pyodide, JavaScript/TypeScript with captured console output
//! - Toolchain instructions for C, C++, Rust and Java
//!
//! Pages are meant to be loaded only through [`host::embed_page`].

pub mod builder;
pub mod compiled;
pub mod dispatch;
pub mod error;
pub mod host;
pub mod markup;
pub mod multi_file;
pub mod react;
pub mod runners;
pub mod setup_guide;
pub mod styles;

pub use dispatch::{
    combined_source, error_document, select_kind, synthesize, synthesize_preview, try_synthesize,
    DocumentKind,
};
pub use error::SynthesisError;
pub use setup_guide::python_setup_guide;
