//! Live preview state and per-block classification results.

use serde::{Deserialize, Serialize};

/// Where a code block would run if previewed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Runtime {
    /// Python through the in-browser WebAssembly interpreter
    Pyodide,
    /// Runs directly in the sandbox document (markup, styles, scripts)
    Native,
    /// Shown with setup instructions only, never executed
    Stub,
}

/// Outcome of the static heuristics for one code block.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Classification {
    /// Offer the "Live Preview" action
    pub renderable: bool,
    pub runtime: Runtime,
    /// Language used for highlighting and synthesis
    pub detected_language: String,
    /// Python that needs a local interpreter; offer "Setup Guide"
    pub requires_setup_guide: bool,
}

/// The single preview pane.
///
/// Only one preview is open at a time. All mutations go through the methods
/// below so the edit loop and local editing never disagree about which code
/// is on screen.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LivePreviewState {
    pub is_open: bool,
    /// Code currently shown (and rendered)
    pub code: String,
    /// Last code synced from the backend or explicitly synced back
    pub original_code: String,
    pub language: String,
    pub additional_css: String,
    pub is_combined: bool,
    pub is_setup_guide: bool,
}

impl LivePreviewState {
    pub fn open(
        &mut self,
        code: impl Into<String>,
        language: impl Into<String>,
        additional_css: impl Into<String>,
        is_combined: bool,
    ) {
        let code = code.into();
        *self = Self {
            is_open: true,
            original_code: code.clone(),
            code,
            language: language.into(),
            additional_css: additional_css.into(),
            is_combined,
            is_setup_guide: false,
        };
    }

    pub fn open_setup_guide(&mut self, code: impl Into<String>, language: impl Into<String>) {
        let code = code.into();
        *self = Self {
            is_open: true,
            original_code: code.clone(),
            code,
            language: language.into(),
            additional_css: String::new(),
            is_combined: false,
            is_setup_guide: true,
        };
    }

    /// Edit inside the embedded editor. Not synced to the chat history.
    pub fn edit_locally(&mut self, code: impl Into<String>) {
        if self.is_open {
            self.code = code.into();
        }
    }

    /// Promote the locally edited code to the new baseline.
    pub fn sync_back(&mut self) {
        if self.is_open {
            self.original_code = self.code.clone();
        }
    }

    /// Discard local edits.
    pub fn reset(&mut self) {
        if self.is_open {
            self.code = self.original_code.clone();
        }
    }

    /// Replace the displayed and baseline code with a backend edit.
    pub fn apply_edit(&mut self, code: impl Into<String>) {
        let code = code.into();
        self.original_code = code.clone();
        self.code = code;
    }

    pub fn close(&mut self) {
        *self = Self::default();
    }

    pub fn has_local_changes(&self) -> bool {
        self.is_open && self.code != self.original_code
    }
}
