//! Code-edit loop: `Idle -> AwaitingEditResponse -> Applied | Failed`.
//!
//! An edit turn replaces the normal prompt with one that embeds the whole
//! previewed document. The first fenced block of the reply replaces the
//! preview; a reply without one is shown as-is with an advisory note. There
//! is no automatic retry. Closing the preview returns to `Idle` from any state.

use regex::Regex;
use shared::agent_api::ChatMessage;
use shared::{LivePreviewState, Message};
use std::sync::LazyLock;
use tracing::{info, warn};

use content::fence;

use crate::prompts;

static EDIT_INTENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:edit(?:s|ed|ing)?|chang(?:e|es|ed|ing)|modif(?:y|ies|ied|ying)|updat(?:e|es|ed|ing)|add(?:s|ed|ing)?|remov(?:e|es|ed|ing)|fix(?:es|ed|ing)?|improv(?:e|es|ed|ing)|make\s+it|can\s+you)\b",
    )
    .expect("edit intent regex")
});

pub const EXTRACTION_FAILED_NOTE: &str = "*Note: I couldn't extract the code properly. Please try rephrasing your request or be more specific about what you'd like to change.*";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditState {
    #[default]
    Idle,
    AwaitingEditResponse {
        language: String,
    },
    Applied,
    Failed,
}

/// Result of feeding a backend reply to an awaiting edit.
#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    /// The preview now shows `code`; `message` is the short confirmation.
    Applied { code: String, message: Message },
    /// Nothing was extracted; `message` is the raw reply plus the note.
    Failed { message: Message },
}

impl EditOutcome {
    pub fn message(&self) -> &Message {
        match self {
            EditOutcome::Applied { message, .. } | EditOutcome::Failed { message } => message,
        }
    }

    pub fn into_message(self) -> Message {
        match self {
            EditOutcome::Applied { message, .. } | EditOutcome::Failed { message } => message,
        }
    }
}

/// Fixed keyword heuristic; matches whole words and their common inflections.
pub fn is_edit_intent(input: &str) -> bool {
    EDIT_INTENT_RE.is_match(input)
}

pub fn confirmation_text(language: &str) -> String {
    format!(
        "✅ Applied your requested changes to the {language} code. Both the code editor and live preview have been updated.\n\n*The changes are now live in both your code editor and preview. You can continue editing or ask for more modifications.*"
    )
}

#[derive(Debug, Default)]
pub struct EditLoop {
    state: EditState,
}

impl EditLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &EditState {
        &self.state
    }

    pub fn is_awaiting(&self) -> bool {
        matches!(self.state, EditState::AwaitingEditResponse { .. })
    }

    /// Whether `input` should start an edit turn against `preview`.
    pub fn should_edit(&self, preview: &LivePreviewState, input: &str) -> bool {
        preview.is_open && !preview.is_setup_guide && is_edit_intent(input)
    }

    /// Enter `AwaitingEditResponse` and build the edit-mode request.
    pub fn begin(&mut self, preview: &LivePreviewState, instruction: &str) -> Vec<ChatMessage> {
        info!(language = %preview.language, code_len = preview.code.len(), "edit turn started");
        self.state = EditState::AwaitingEditResponse {
            language: preview.language.clone(),
        };
        vec![
            ChatMessage::system(prompts::edit_system_prompt(&preview.language, &preview.code)),
            ChatMessage::user(prompts::edit_user_prompt(&preview.language, instruction)),
        ]
    }

    /// Apply `reply` to `preview`. `None` if no edit was awaited.
    pub fn complete(&mut self, preview: &mut LivePreviewState, reply: &str) -> Option<EditOutcome> {
        let EditState::AwaitingEditResponse { language } = std::mem::take(&mut self.state) else {
            return None;
        };

        match fence::first_body(reply) {
            Some(code) if !code.is_empty() => {
                preview.apply_edit(code.clone());
                self.state = EditState::Applied;
                info!(%language, code_len = code.len(), "edit applied");
                let message = Message::assistant(confirmation_text(&language))
                    .with_edit(code.clone(), language);
                Some(EditOutcome::Applied { code, message })
            }
            _ => {
                self.state = EditState::Failed;
                warn!(%language, "edit reply had no code block");
                Some(EditOutcome::Failed {
                    message: Message::assistant(format!("{reply}\n\n{EXTRACTION_FAILED_NOTE}")),
                })
            }
        }
    }

    /// Backend failure while awaiting: nothing was applied.
    pub fn abort(&mut self) {
        if self.is_awaiting() {
            warn!("edit turn aborted");
        }
        self.state = EditState::Idle;
    }

    /// The preview was closed.
    pub fn reset(&mut self) {
        self.state = EditState::Idle;
    }
}
