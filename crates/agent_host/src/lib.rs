//! Agent Host - chat turns, prompts and the code-edit loop
//!
//! This crate owns everything that happens between the user pressing send
//! and a reply landing in the transcript:
//! - Building normal and edit-mode requests
//! - Turning attachments into transcript and request messages
//! - Applying full-document replacements to the live preview
//! - Keeping at most one request in flight

pub mod attachments;
pub mod conversation;
pub mod edit_loop;
pub mod prompts;

pub use attachments::PendingAttachment;
pub use conversation::{friendly_error, Conversation, PendingTurn, TurnError, GREETING};
pub use edit_loop::{is_edit_intent, EditLoop, EditOutcome, EditState};
pub use prompts::{edit_system_prompt, edit_user_prompt, NORMAL_SYSTEM_PROMPT};
