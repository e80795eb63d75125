//! Chat completion backends
//!
//! The rest of the workspace only sees [`ChatBackend`]; the concrete client
//! talks to an Ollama-compatible `/api/chat` endpoint.

pub mod error;
pub mod ollama;

pub use error::BackendError;
pub use ollama::OllamaClient;

use shared::agent_api::ChatMessage;

/// One non-streaming chat completion per call.
#[async_trait::async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send the full conversation and return the assistant's reply text.
    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String, BackendError>;

    /// Human-readable description of where requests go, for logs and errors.
    fn describe(&self) -> String;
}
