//! Services - persistence for Chat Blues
//!
//! - Saved chat list (load-all / replace-all over one JSON file)
//! - Settings file with environment overrides

pub mod sessions;
pub mod settings_store;

pub use sessions::{derive_title, ChatRecord, SessionStore};
pub use settings_store::SettingsStore;
