/// Failures talking to the chat completion backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("Failed to connect to Local AI at {endpoint}. Make sure Ollama/LocalAI is running.")]
    Connect { endpoint: String },

    #[error("Local API Error: {status} - {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected response from Local AI: {0}")]
    Decode(String),
}
