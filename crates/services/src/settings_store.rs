//! Settings persisted as `settings.json` in the platform config dir.

use anyhow::{bail, Context, Result};
use shared::settings::{AppSettings, DEFAULT_ENDPOINT};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use url::Url;

pub const ENDPOINT_ENV: &str = "OLLAMA_BASE_URL";
pub const MODEL_ENV: &str = "CHAT_BLUES_MODEL";

/// Validate a backend base URL and drop any trailing slash.
pub fn normalize_endpoint(raw: &str) -> Result<String> {
    let url = Url::parse(raw.trim()).with_context(|| format!("invalid endpoint '{raw}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("endpoint must be http or https, got '{}'", url.scheme());
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Apply `OLLAMA_BASE_URL` / `CHAT_BLUES_MODEL` from `lookup`.
pub fn apply_env_overrides(settings: &mut AppSettings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(endpoint) = lookup(ENDPOINT_ENV).filter(|v| !v.trim().is_empty()) {
        info!(endpoint = %endpoint, "endpoint overridden from environment");
        settings.model.endpoint = endpoint;
    }
    if let Some(model) = lookup(MODEL_ENV).filter(|v| !v.trim().is_empty()) {
        info!(model = %model, "model overridden from environment");
        settings.model.model = model.trim().to_string();
    }
}

pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn open_default() -> Self {
        let path = directories::ProjectDirs::from("com.local", "Chat Blues", "ChatBlues")
            .map(|p| p.config_dir().join("settings.json"))
            .unwrap_or_else(|| PathBuf::from("./settings.json"));
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored settings (defaults if missing or corrupt) with env overrides
    /// applied and the endpoint normalized.
    pub fn load(&self) -> AppSettings {
        self.load_with(|key| std::env::var(key).ok())
    }

    pub fn load_with(&self, lookup: impl Fn(&str) -> Option<String>) -> AppSettings {
        let mut settings = match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice::<AppSettings>(&bytes).unwrap_or_else(|err| {
                warn!(path = %self.path.display(), error = %err, "settings are corrupt; using defaults");
                AppSettings::default()
            }),
            Err(_) => AppSettings::default(),
        };
        apply_env_overrides(&mut settings, lookup);

        settings.model.endpoint = match normalize_endpoint(&settings.model.endpoint) {
            Ok(endpoint) => endpoint,
            Err(err) => {
                warn!(error = %err, fallback = DEFAULT_ENDPOINT, "invalid endpoint");
                DEFAULT_ENDPOINT.to_string()
            }
        };
        settings
    }

    pub fn save(&self, settings: &AppSettings) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        }
        let json = serde_json::to_vec_pretty(settings)?;
        fs::write(&self.path, json).with_context(|| format!("writing {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_normalize_endpoint() {
        assert_eq!(
            normalize_endpoint("http://localhost:11434/").unwrap(),
            "http://localhost:11434"
        );
        assert_eq!(
            normalize_endpoint(" https://box.lan:8080/ollama/ ").unwrap(),
            "https://box.lan:8080/ollama"
        );
        assert!(normalize_endpoint("localhost:11434").is_err());
        assert!(normalize_endpoint("not a url").is_err());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = SettingsStore::new(dir.path().join("settings.json")).load_with(no_env);
        assert_eq!(settings, AppSettings::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::new(dir.path().join("cfg").join("settings.json"));
        let mut settings = AppSettings::default();
        settings.model.model = "llava:7b".into();
        settings.model.temperature = 0.2;
        settings.model.random_seed = true;
        settings.user_name = "Sam".into();
        store.save(&settings).unwrap();
        assert_eq!(store.load_with(no_env), settings);
    }

    #[test]
    fn test_env_overrides_win() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json"));
        store.save(&AppSettings::default()).unwrap();

        let settings = store.load_with(|key| match key {
            ENDPOINT_ENV => Some("http://gpu-box:11434/".into()),
            MODEL_ENV => Some("qwen2.5-coder".into()),
            _ => None,
        });
        assert_eq!(settings.model.endpoint, "http://gpu-box:11434");
        assert_eq!(settings.model.model, "qwen2.5-coder");
    }

    #[test]
    fn test_bad_endpoint_falls_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"model":{"endpoint":"ftp://nope"}}"#).unwrap();
        let settings = SettingsStore::new(path).load_with(no_env);
        assert_eq!(settings.model.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_corrupt_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "[]").unwrap();
        assert_eq!(SettingsStore::new(path).load_with(no_env), AppSettings::default());
    }
}
