//! Chat transcript types.
//!
//! A session is a linear list of [`Message`]s. Messages are appended on every
//! user submission and every backend reply and are never edited afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Error,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Error => "error",
            Role::System => "system",
        }
    }
}

/// Kind of binary payload carried for the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Image,
    Pdf,
}

/// What the transcript shows for an uploaded file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub mime_type: String,
    /// Inline preview (data URL) for images
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
}

/// Marks an assistant message produced by a successful code edit.
///
/// Holds the replacement document so the preview can be reopened later
/// without the code ever appearing in the transcript text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditMarker {
    pub current_code: String,
    pub current_language: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
    /// Base64 payload resent to the backend on every later turn
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data_for_api: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<FileKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit: Option<EditMarker>,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn with_role(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            attachment: None,
            image_data_for_api: None,
            file_type: None,
            edit: None,
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, content)
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self::with_role(Role::Error, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(Role::System, content)
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    pub fn with_api_data(mut self, data: impl Into<String>, kind: FileKind) -> Self {
        self.image_data_for_api = Some(data.into());
        self.file_type = Some(kind);
        self
    }

    pub fn with_edit(mut self, code: impl Into<String>, language: impl Into<String>) -> Self {
        self.edit = Some(EditMarker {
            current_code: code.into(),
            current_language: language.into(),
        });
        self
    }

    pub fn is_edit_response(&self) -> bool {
        self.edit.is_some()
    }
}
