//! Saved chats.
//!
//! The whole list lives in one JSON file and is always read and written as a
//! unit. A chat that only holds the greeting is never saved.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{Message, Role};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

const TITLE_CHARS: usize = 30;
pub const UNTITLED: &str = "New Chat";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRecord {
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub pinned: bool,
}

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Leading characters of the first user message, or "New Chat".
pub fn derive_title(messages: &[Message]) -> String {
    messages
        .iter()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.chars().take(TITLE_CHARS).collect::<String>())
        .filter(|title| !title.trim().is_empty())
        .unwrap_or_else(|| UNTITLED.to_string())
}

fn has_user_message(messages: &[Message]) -> bool {
    messages.iter().any(|m| m.role == Role::User)
}

/// Pinned chats first, then newest first.
pub fn sorted(records: &[ChatRecord]) -> Vec<&ChatRecord> {
    let mut list: Vec<&ChatRecord> = records.iter().collect();
    list.sort_by(|a, b| b.pinned.cmp(&a.pinned).then(b.date.cmp(&a.date)));
    list
}

pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `chat_history.json` under the platform data dir.
    pub fn open_default() -> Self {
        let path = directories::ProjectDirs::from("com.local", "Chat Blues", "ChatBlues")
            .map(|p| p.data_dir().join("chat_history.json"))
            .unwrap_or_else(|| PathBuf::from("./chat_history.json"));
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every saved chat. Missing or unreadable files give an empty list.
    pub fn load_all(&self) -> Vec<ChatRecord> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(_) => return Vec::new(),
        };
        match serde_json::from_slice(&bytes) {
            Ok(records) => records,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "chat history is corrupt; starting empty");
                Vec::new()
            }
        }
    }

    pub fn replace_all(&self, records: &[ChatRecord]) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(records)?;
        fs::write(&self.path, json)
            .with_context(|| format!("writing {}", self.path.display()))?;
        debug!(count = records.len(), "chat history saved");
        Ok(())
    }

    /// Save `messages` under `id`. New chats go to the front; existing ones
    /// keep their title and pinned flag. Greeting-only chats are skipped.
    pub fn upsert(&self, id: &str, messages: &[Message]) -> Result<Option<ChatRecord>> {
        if !has_user_message(messages) {
            return Ok(None);
        }
        let mut records = self.load_all();
        let record = match records.iter_mut().find(|r| r.id == id) {
            Some(existing) => {
                existing.messages = messages.to_vec();
                existing.date = Utc::now();
                existing.clone()
            }
            None => {
                let record = ChatRecord {
                    id: id.to_string(),
                    title: derive_title(messages),
                    messages: messages.to_vec(),
                    date: Utc::now(),
                    pinned: false,
                };
                records.insert(0, record.clone());
                record
            }
        };
        self.replace_all(&records)?;
        Ok(Some(record))
    }

    pub fn get(&self, id: &str) -> Option<ChatRecord> {
        self.load_all().into_iter().find(|r| r.id == id)
    }

    /// False when no chat has `id`.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let mut records = self.load_all();
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Ok(false);
        }
        self.replace_all(&records)?;
        Ok(true)
    }

    pub fn rename(&self, id: &str, title: &str) -> Result<bool> {
        self.modify(id, |record| record.title = title.trim().to_string())
    }

    pub fn toggle_pin(&self, id: &str) -> Result<bool> {
        self.modify(id, |record| record.pinned = !record.pinned)
    }

    fn modify(&self, id: &str, change: impl FnOnce(&mut ChatRecord)) -> Result<bool> {
        let mut records = self.load_all();
        let Some(record) = records.iter_mut().find(|r| r.id == id) else {
            return Ok(false);
        };
        change(record);
        self.replace_all(&records)?;
        Ok(true)
    }
}
