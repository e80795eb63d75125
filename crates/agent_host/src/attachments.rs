//! One file attached to a user turn.
//!
//! Images and PDFs travel to the backend as base64 in the message's `images`
//! array on this and every later turn. Anything else is read as text and
//! inlined into the request content.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use shared::agent_api::ChatMessage;
use shared::{Attachment, FileKind, Message};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAttachment {
    pub name: String,
    pub mime_type: String,
    /// Base64 for images and PDFs, text otherwise
    pub content: String,
}

impl PendingAttachment {
    pub fn kind(&self) -> Option<FileKind> {
        if self.mime_type.starts_with("image/") {
            Some(FileKind::Image)
        } else if self.mime_type == "application/pdf" {
            Some(FileKind::Pdf)
        } else {
            None
        }
    }
}

/// MIME type from the file extension; unknown extensions are text.
pub fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "pdf" => "application/pdf",
        "json" => "application/json",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "md" => "text/markdown",
        _ => "text/plain",
    }
}

/// Read `path` into an attachment.
pub fn load(path: &Path) -> Result<PendingAttachment> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    let mime_type = mime_for(path).to_string();
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;

    let binary = mime_type.starts_with("image/") || mime_type == "application/pdf";
    let content = if binary {
        STANDARD.encode(&bytes)
    } else {
        String::from_utf8_lossy(&bytes).to_string()
    };

    Ok(PendingAttachment {
        name,
        mime_type,
        content,
    })
}

/// Drop a leading `data:<mime>;base64,` prefix.
pub fn strip_data_url(data: &str) -> &str {
    match data.split_once(";base64,") {
        Some((prefix, payload)) if prefix.starts_with("data:") => payload,
        _ => data,
    }
}

/// The transcript message and the request message for one user turn.
pub fn prepare(input: &str, attachment: Option<&PendingAttachment>) -> (Message, ChatMessage) {
    let input = input.trim();
    let Some(file) = attachment else {
        return (Message::user(input), ChatMessage::user(input));
    };

    match file.kind() {
        Some(kind) => {
            let payload = strip_data_url(&file.content).to_string();
            let (label, ask) = match kind {
                FileKind::Image => ("image", "Please analyze this image."),
                FileKind::Pdf => ("PDF", "Please analyze this PDF document."),
            };
            let display = if input.is_empty() {
                format!("[Uploaded {label}: {}]", file.name)
            } else {
                input.to_string()
            };
            let api = if input.is_empty() { ask } else { input };
            let preview = (kind == FileKind::Image)
                .then(|| format!("data:{};base64,{payload}", file.mime_type));

            let message = Message::user(display)
                .with_attachment(Attachment {
                    name: file.name.clone(),
                    mime_type: file.mime_type.clone(),
                    preview,
                })
                .with_api_data(payload.clone(), kind);
            (message, ChatMessage::user(api).with_image(payload))
        }
        None => {
            let display = if input.is_empty() {
                format!("[Uploaded file: {}]", file.name)
            } else {
                input.to_string()
            };
            let api = if input.is_empty() {
                format!("Here's the content of the file {}:\n\n{}", file.name, file.content)
            } else {
                format!(
                    "{input}\n\n--- File: {} ---\n{}\n--- End of file ---",
                    file.name, file.content
                )
            };
            let message = Message::user(display).with_attachment(Attachment {
                name: file.name.clone(),
                mime_type: file.mime_type.clone(),
                preview: None,
            });
            (message, ChatMessage::user(api))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn text_file(content: &str) -> PendingAttachment {
        PendingAttachment {
            name: "notes.txt".into(),
            mime_type: "text/plain".into(),
            content: content.into(),
        }
    }

    #[test]
    fn test_plain_turn() {
        let (message, api) = prepare("  hello  ", None);
        assert_eq!(message.content, "hello");
        assert_eq!(api.content, "hello");
        assert!(api.images.is_none());
    }

    #[test]
    fn test_image_without_text() {
        let file = PendingAttachment {
            name: "cat.png".into(),
            mime_type: "image/png".into(),
            content: "data:image/png;base64,AAAA".into(),
        };
        let (message, api) = prepare("", Some(&file));
        assert_eq!(message.content, "[Uploaded image: cat.png]");
        assert_eq!(message.image_data_for_api.as_deref(), Some("AAAA"));
        assert_eq!(message.file_type, Some(FileKind::Image));
        assert_eq!(api.content, "Please analyze this image.");
        assert_eq!(api.images, Some(vec!["AAAA".to_string()]));
    }

    #[test]
    fn test_pdf_keeps_typed_text() {
        let file = PendingAttachment {
            name: "paper.pdf".into(),
            mime_type: "application/pdf".into(),
            content: "JVBERi0=".into(),
        };
        let (message, api) = prepare("summarize", Some(&file));
        assert_eq!(message.content, "summarize");
        assert_eq!(api.content, "summarize");
        assert_eq!(message.file_type, Some(FileKind::Pdf));
        assert!(message.attachment.unwrap().preview.is_none());
    }

    #[test]
    fn test_text_file_inlined_with_markers() {
        let (message, api) = prepare("explain", Some(&text_file("line one")));
        assert_eq!(message.content, "explain");
        assert_eq!(
            api.content,
            "explain\n\n--- File: notes.txt ---\nline one\n--- End of file ---"
        );
        assert!(message.image_data_for_api.is_none());
    }

    #[test]
    fn test_text_file_without_text() {
        let (message, api) = prepare("", Some(&text_file("x")));
        assert_eq!(message.content, "[Uploaded file: notes.txt]");
        assert_eq!(api.content, "Here's the content of the file notes.txt:\n\nx");
    }

    #[test]
    fn test_load_encodes_images() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dot.PNG");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(&[0x89, b'P', b'N', b'G'])
            .unwrap();

        let file = load(&path).unwrap();
        assert_eq!(file.name, "dot.PNG");
        assert_eq!(file.mime_type, "image/png");
        assert_eq!(file.content, "iVBORw==");
    }

    #[test]
    fn test_load_reads_text() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("main.rs");
        std::fs::write(&path, "fn main() {}").unwrap();
        let file = load(&path).unwrap();
        assert_eq!(file.mime_type, "text/plain");
        assert_eq!(file.content, "fn main() {}");
        assert!(file.kind().is_none());
    }
}
