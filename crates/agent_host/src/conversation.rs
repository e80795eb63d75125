//! Single-owner chat state: transcript, live preview and edit loop.
//!
//! A turn is `begin_turn` (records the user message, builds the request)
//! followed by `finish_turn` (records the reply or the error). Only one turn
//! may be in flight; [`Conversation::submit`] runs both halves against a
//! [`ChatBackend`].

use providers::{BackendError, ChatBackend};
use shared::agent_api::ChatMessage;
use shared::{LivePreviewState, Message, Role, Runtime, Segment};
use tracing::{debug, info, warn};

use crate::attachments::{self, PendingAttachment};
use crate::edit_loop::{EditLoop, EditOutcome, EditState};
use crate::prompts::NORMAL_SYSTEM_PROMPT;

pub const GREETING: &str = "Hello! I am Chat Blues. How can I assist you today?";

#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error("A request is already in progress")]
    Busy,

    #[error("Nothing to send")]
    EmptyInput,

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Request built by [`Conversation::begin_turn`], to be sent to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingTurn {
    pub request: Vec<ChatMessage>,
    pub is_edit: bool,
}

/// User-facing text for a backend failure.
pub fn friendly_error(err: &BackendError) -> String {
    let raw = err.to_string();
    let text = if raw.contains("Provider returned error") || raw.contains("rate-limited") {
        "The AI service is temporarily busy. Please try again in a few moments.".to_string()
    } else if raw.contains("API key") {
        "API configuration issue. Please check your settings.".to_string()
    } else {
        raw
    };
    format!("Error: {text}")
}

fn is_greeting(message: &Message) -> bool {
    message.role == Role::Assistant && message.content == GREETING
}

#[derive(Debug)]
pub struct Conversation {
    messages: Vec<Message>,
    preview: LivePreviewState,
    edit: EditLoop,
    in_flight: bool,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self::from_messages(vec![Message::assistant(GREETING)])
    }

    /// Resume a stored chat. The preview starts closed.
    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self {
            messages,
            preview: LivePreviewState::default(),
            edit: EditLoop::new(),
            in_flight: false,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn preview(&self) -> &LivePreviewState {
        &self.preview
    }

    pub fn edit_state(&self) -> &EditState {
        self.edit.state()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight
    }

    /// Whether the user has said anything yet.
    pub fn is_fresh(&self) -> bool {
        self.messages.iter().all(|m| m.role != Role::User)
    }

    pub fn last_assistant(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role == Role::Assistant)
    }

    /// Open the preview for a parsed segment. False for text and tables.
    pub fn open_preview(&mut self, segment: &Segment) -> bool {
        match segment {
            Segment::Code {
                language,
                content: code,
            } => {
                let class = content::classify(language, code);
                if class.requires_setup_guide {
                    self.preview.open_setup_guide(code.as_str(), class.detected_language);
                } else if class.renderable || class.runtime == Runtime::Stub {
                    self.preview
                        .open(code.as_str(), class.detected_language, "", false);
                } else {
                    return false;
                }
            }
            Segment::CombinedCode(combined) => {
                let (source, language) = sandbox::combined_source(combined);
                self.preview.open(source, language, "", true);
            }
            Segment::Text { .. } | Segment::Table(_) => return false,
        }
        self.edit.reset();
        debug!(language = %self.preview.language, setup_guide = self.preview.is_setup_guide, "preview opened");
        true
    }

    /// Reopen the code carried by an edit confirmation.
    pub fn reopen_edit(&mut self, index: usize) -> bool {
        let Some(marker) = self.messages.get(index).and_then(|m| m.edit.clone()) else {
            return false;
        };
        self.preview
            .open(marker.current_code, marker.current_language, "", false);
        self.edit.reset();
        true
    }

    pub fn edit_preview_locally(&mut self, code: impl Into<String>) {
        self.preview.edit_locally(code);
    }

    pub fn sync_preview(&mut self) {
        self.preview.sync_back();
    }

    pub fn reset_preview(&mut self) {
        self.preview.reset();
    }

    pub fn close_preview(&mut self) {
        self.preview.close();
        self.edit.reset();
    }

    /// Normal-mode history: everything but the greeting and error messages.
    fn history(&self) -> impl Iterator<Item = ChatMessage> + '_ {
        self.messages
            .iter()
            .filter(|m| m.role != Role::Error && !is_greeting(m))
            .map(|m| ChatMessage {
                role: m.role.as_str().to_string(),
                content: m.content.clone(),
                images: m.image_data_for_api.clone().map(|data| vec![data]),
            })
    }

    /// Record the user's message and build the request for it.
    pub fn begin_turn(
        &mut self,
        input: &str,
        attachment: Option<&PendingAttachment>,
    ) -> Result<PendingTurn, TurnError> {
        if self.in_flight {
            return Err(TurnError::Busy);
        }
        if input.trim().is_empty() && attachment.is_none() {
            return Err(TurnError::EmptyInput);
        }

        let (display, api) = attachments::prepare(input, attachment);
        let is_edit = self.edit.should_edit(&self.preview, input);
        let request = if is_edit {
            self.edit.begin(&self.preview, input.trim())
        } else {
            let mut request = vec![ChatMessage::system(NORMAL_SYSTEM_PROMPT)];
            request.extend(self.history());
            request.push(api);
            request
        };

        self.messages.push(display);
        self.in_flight = true;
        info!(is_edit, request_len = request.len(), "turn started");
        Ok(PendingTurn { request, is_edit })
    }

    /// Record the backend's reply (or failure) for the turn in flight.
    pub fn finish_turn(
        &mut self,
        turn: PendingTurn,
        reply: Result<String, BackendError>,
    ) -> Result<&Message, TurnError> {
        self.in_flight = false;
        let reply = match reply {
            Ok(reply) => reply,
            Err(err) => {
                if turn.is_edit {
                    self.edit.abort();
                }
                warn!(error = %err, "turn failed");
                self.messages.push(Message::error(friendly_error(&err)));
                return Err(TurnError::Backend(err));
            }
        };

        let message = if turn.is_edit {
            self.edit
                .complete(&mut self.preview, &reply)
                .map(EditOutcome::into_message)
                .unwrap_or_else(|| Message::assistant(reply))
        } else {
            Message::assistant(reply)
        };
        self.messages.push(message);
        Ok(&self.messages[self.messages.len() - 1])
    }

    /// Run one full turn against `backend`.
    pub async fn submit(
        &mut self,
        backend: &dyn ChatBackend,
        input: &str,
        attachment: Option<&PendingAttachment>,
    ) -> Result<&Message, TurnError> {
        let turn = self.begin_turn(input, attachment)?;
        let reply = backend.chat(turn.request.clone()).await;
        self.finish_turn(turn, reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::CombinedCode;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Scripted backend that records every request.
    #[derive(Default)]
    struct MockBackend {
        replies: Mutex<VecDeque<Result<String, BackendError>>>,
        requests: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl MockBackend {
        fn with(replies: Vec<Result<String, BackendError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::default(),
            }
        }

        fn request(&self, index: usize) -> Vec<ChatMessage> {
            self.requests.lock().unwrap()[index].clone()
        }
    }

    #[async_trait::async_trait]
    impl ChatBackend for MockBackend {
        async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String, BackendError> {
            self.requests.lock().unwrap().push(messages);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(String::new()))
        }

        fn describe(&self) -> String {
            "mock".into()
        }
    }

    const RED: &str = "<style>\nbody {\n  background: red;\n}\n</style>\n<h1>Hi</h1>";
    const BLUE: &str = "<style>\nbody {\n  background: blue;\n}\n</style>\n<h1>Hi</h1>";

    fn html_segment(code: &str) -> Segment {
        Segment::Code {
            language: "html".into(),
            content: code.into(),
        }
    }

    #[tokio::test]
    async fn test_normal_turn_skips_greeting_and_errors() {
        let backend = MockBackend::with(vec![
            Err(BackendError::Connect {
                endpoint: "http://localhost:11434".into(),
            }),
            Ok("Paris".into()),
        ]);
        let mut chat = Conversation::new();

        let err = chat.submit(&backend, "hello", None).await.unwrap_err();
        assert!(matches!(err, TurnError::Backend(_)));
        assert_eq!(chat.messages().last().unwrap().role, Role::Error);
        assert!(!chat.is_busy());

        let reply = chat.submit(&backend, "capital of France?", None).await.unwrap();
        assert_eq!(reply.content, "Paris");

        let request = backend.request(1);
        let roles: Vec<_> = request.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["system", "user", "user"]);
        assert_eq!(request[0].content, NORMAL_SYSTEM_PROMPT);
        assert_eq!(request[2].content, "capital of France?");
    }

    #[tokio::test]
    async fn test_edit_loop_applies_replacement() {
        let backend = MockBackend::with(vec![Ok(format!("```html\n{BLUE}\n```"))]);
        let mut chat = Conversation::new();
        assert!(chat.open_preview(&html_segment(RED)));

        let reply = chat
            .submit(&backend, "change background to blue", None)
            .await
            .unwrap()
            .clone();

        assert_eq!(chat.edit_state(), &EditState::Applied);
        assert_eq!(chat.preview().code, BLUE);
        assert!(reply.is_edit_response());
        assert!(!reply.content.contains("background"));

        let request = backend.request(0);
        assert_eq!(request.len(), 2);
        assert!(request[0].content.contains("background: red;"));
        assert_eq!(
            request[1].content,
            "Please edit the current html code: change background to blue"
        );
    }

    #[tokio::test]
    async fn test_edit_loop_failure_keeps_preview() {
        let backend = MockBackend::with(vec![Ok("I changed it for you.".into())]);
        let mut chat = Conversation::new();
        chat.open_preview(&html_segment(RED));

        let reply = chat.submit(&backend, "make it blue", None).await.unwrap();
        assert!(reply.content.contains("couldn't extract the code"));
        assert_eq!(chat.edit_state(), &EditState::Failed);
        assert_eq!(chat.preview().code, RED);
    }

    #[tokio::test]
    async fn test_backend_error_during_edit_returns_to_idle() {
        let backend = MockBackend::with(vec![Err(BackendError::Status {
            status: 429,
            body: "rate-limited".into(),
        })]);
        let mut chat = Conversation::new();
        chat.open_preview(&html_segment(RED));

        assert!(chat.submit(&backend, "change it", None).await.is_err());
        assert_eq!(chat.edit_state(), &EditState::Idle);
        assert_eq!(chat.preview().code, RED);
        assert_eq!(
            chat.messages().last().unwrap().content,
            "Error: The AI service is temporarily busy. Please try again in a few moments."
        );
    }

    #[tokio::test]
    async fn test_non_edit_message_with_preview_open_is_normal() {
        let backend = MockBackend::with(vec![Ok("It is a heading.".into())]);
        let mut chat = Conversation::new();
        chat.open_preview(&html_segment(RED));

        chat.submit(&backend, "what does this do?", None).await.unwrap();
        assert_eq!(backend.request(0)[0].content, NORMAL_SYSTEM_PROMPT);
        assert_eq!(chat.edit_state(), &EditState::Idle);
    }

    #[test]
    fn test_second_turn_while_busy() {
        let mut chat = Conversation::new();
        let turn = chat.begin_turn("one", None).unwrap();
        assert!(matches!(chat.begin_turn("two", None), Err(TurnError::Busy)));
        chat.finish_turn(turn, Ok("done".into())).unwrap();
        assert!(chat.begin_turn("two", None).is_ok());
    }

    #[test]
    fn test_empty_input_rejected() {
        let mut chat = Conversation::new();
        assert!(matches!(chat.begin_turn("   ", None), Err(TurnError::EmptyInput)));
        assert_eq!(chat.messages().len(), 1);
    }

    #[test]
    fn test_images_resent_on_later_turns() {
        let mut chat = Conversation::new();
        let image = PendingAttachment {
            name: "a.png".into(),
            mime_type: "image/png".into(),
            content: "AAAA".into(),
        };
        let turn = chat.begin_turn("", Some(&image)).unwrap();
        chat.finish_turn(turn, Ok("A cat.".into())).unwrap();

        let turn = chat.begin_turn("what color?", None).unwrap();
        let with_images: Vec<_> = turn.request.iter().filter(|m| m.images.is_some()).collect();
        assert_eq!(with_images.len(), 1);
        assert_eq!(with_images[0].content, "[Uploaded image: a.png]");
    }

    #[test]
    fn test_python_with_requests_opens_setup_guide() {
        let mut chat = Conversation::new();
        let code = "import requests\n\nresp = requests.get('https://example.com')\nprint(resp.status_code)\nprint('done')";
        assert!(chat.open_preview(&Segment::Code {
            language: "python".into(),
            content: code.into(),
        }));
        assert!(chat.preview().is_setup_guide);
    }

    #[test]
    fn test_text_segments_do_not_open() {
        let mut chat = Conversation::new();
        assert!(!chat.open_preview(&Segment::Text {
            content: "hi".into()
        }));
        assert!(!chat.preview().is_open);
    }

    #[test]
    fn test_combined_segment_opens_combined_preview() {
        let mut chat = Conversation::new();
        let combined = CombinedCode {
            language: "html".into(),
            main_content: "<h1>Hi</h1>".into(),
            css: "h1 { color: red; }".into(),
            additional_js: String::new(),
            source_blocks: Vec::new(),
        };
        assert!(chat.open_preview(&Segment::CombinedCode(combined)));
        assert!(chat.preview().is_combined);
        assert!(chat.preview().code.contains("h1 { color: red; }"));
    }

    #[test]
    fn test_close_preview_resets_edit_loop() {
        let mut chat = Conversation::new();
        chat.open_preview(&html_segment(RED));
        let _turn = chat.begin_turn("change it", None).unwrap();
        chat.close_preview();
        assert_eq!(chat.edit_state(), &EditState::Idle);
        assert!(!chat.preview().is_open);
    }

    #[test]
    fn test_friendly_error_rewording() {
        assert_eq!(
            friendly_error(&BackendError::Status {
                status: 401,
                body: "missing API key".into()
            }),
            "Error: API configuration issue. Please check your settings."
        );
        assert!(friendly_error(&BackendError::Connect {
            endpoint: "http://x".into()
        })
        .contains("Make sure Ollama/LocalAI is running"));
    }
}
