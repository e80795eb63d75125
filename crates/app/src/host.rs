//! Shows the live preview in the system browser.
//!
//! The synthesized document is wrapped in the sandboxed host page and
//! written to the cache dir; the same file is overwritten on every refresh.

use anyhow::{Context, Result};
use shared::LivePreviewState;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub struct PreviewHost {
    dir: PathBuf,
}

impl PreviewHost {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn open_default() -> Self {
        let dir = directories::ProjectDirs::from("com.local", "Chat Blues", "ChatBlues")
            .map(|p| p.cache_dir().join("previews"))
            .unwrap_or_else(|| PathBuf::from("./cache/previews"));
        Self::new(dir)
    }

    pub fn page_path(&self) -> PathBuf {
        self.dir.join("preview.html")
    }

    /// Write the host page for `state`, returning its path.
    pub fn write(&self, state: &LivePreviewState) -> Result<PathBuf> {
        let title = if state.is_setup_guide {
            "Python Setup Guide".to_string()
        } else {
            format!("Live Preview ({})", state.language)
        };
        let document = sandbox::synthesize_preview(state);
        let page = sandbox::host::embed_page(&title, &document);

        fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating {}", self.dir.display()))?;
        let path = self.page_path();
        fs::write(&path, page).with_context(|| format!("writing {}", path.display()))?;
        debug!(path = %path.display(), bytes = document.len(), "preview written");
        Ok(path)
    }

    /// Write and open in the browser. A failed launch only logs.
    pub fn show(&self, state: &LivePreviewState) -> Result<PathBuf> {
        let path = self.write(state)?;
        launch(&path);
        Ok(path)
    }
}

fn launch(path: &Path) {
    if let Err(err) = open::that(path) {
        warn!(path = %path.display(), error = %err, "could not open browser");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_embeds_sandboxed_document() {
        let dir = TempDir::new().unwrap();
        let host = PreviewHost::new(dir.path().join("previews"));
        let mut state = LivePreviewState::default();
        state.open("body { color: red; }", "css", "", false);

        let path = host.write(&state).unwrap();
        let page = fs::read_to_string(path).unwrap();
        assert!(page.contains("<title>Live Preview (css)</title>"));
        assert!(page.contains("sandbox=\"allow-scripts allow-same-origin\""));
        assert!(page.contains("color: red;"));
    }

    #[test]
    fn test_setup_guide_title() {
        let dir = TempDir::new().unwrap();
        let host = PreviewHost::new(dir.path());
        let mut state = LivePreviewState::default();
        state.open_setup_guide("import requests\nprint(requests)", "python");
        let page = fs::read_to_string(host.write(&state).unwrap()).unwrap();
        assert!(page.contains("<title>Python Setup Guide</title>"));
        assert!(page.contains("pip install requests"));
    }
}
