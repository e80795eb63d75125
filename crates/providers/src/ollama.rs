use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::agent_api::{ChatMessage, GenerationOptions};
use shared::settings::ModelSettings;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

use crate::{BackendError, ChatBackend};

// No request timeout: large local models can take minutes per reply.
static SHARED_HTTP: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .pool_max_idle_per_host(2)
        .build()
        .unwrap_or_default()
});

#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: GenerationOptions,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    #[serde(default)]
    role: String,
    content: String,
}

pub struct OllamaClient {
    http: Client,
    base: String,
    model: String,
    options: GenerationOptions,
}

impl OllamaClient {
    pub fn new(settings: &ModelSettings) -> Self {
        Self {
            http: SHARED_HTTP.clone(),
            base: settings.endpoint.trim().trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            options: GenerationOptions::from(settings),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.base
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base)
    }

    fn request_body<'a>(&'a self, messages: &'a [ChatMessage]) -> OllamaChatRequest<'a> {
        OllamaChatRequest {
            model: &self.model,
            messages,
            stream: false,
            options: self.options,
        }
    }
}

#[async_trait::async_trait]
impl ChatBackend for OllamaClient {
    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String, BackendError> {
        let has_images = messages.iter().any(|m| m.images.is_some());
        info!(
            model = %self.model,
            message_count = messages.len(),
            has_images,
            temperature = self.options.temperature,
            context_window = self.options.num_ctx,
            "sending chat request"
        );

        let resp = self
            .http
            .post(self.chat_url())
            .json(&self.request_body(&messages))
            .send()
            .await
            .map_err(|err| {
                warn!(error = %err, endpoint = %self.base, "chat request failed");
                BackendError::Connect {
                    endpoint: self.base.clone(),
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "chat backend returned an error");
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: OllamaChatResponse = resp
            .json()
            .await
            .map_err(|err| BackendError::Decode(err.to_string()))?;
        debug!(role = %body.message.role, len = body.message.content.len(), "chat reply received");
        Ok(body.message.content)
    }

    fn describe(&self) -> String {
        format!("{} at {}", self.model, self.base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response and hand back the raw request.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                raw.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&raw).to_string();
                if let Some(split) = text.find("\r\n\r\n") {
                    let length = text
                        .lines()
                        .find_map(|l| {
                            l.to_ascii_lowercase()
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap())
                        })
                        .unwrap_or(0);
                    if raw.len() >= split + 4 + length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&raw).to_string()
        });
        (format!("http://{addr}/"), handle)
    }

    fn settings(endpoint: &str) -> ModelSettings {
        ModelSettings {
            endpoint: endpoint.to_string(),
            ..ModelSettings::default()
        }
    }

    #[test]
    fn test_request_body_shape() {
        let client = OllamaClient::new(&settings("http://localhost:11434/"));
        assert_eq!(client.chat_url(), "http://localhost:11434/api/chat");
        let messages = vec![ChatMessage::system("sys"), ChatMessage::user("hi").with_image("AAAA")];
        let json = serde_json::to_value(client.request_body(&messages)).unwrap();
        assert_eq!(json["model"], "llama3.2");
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["num_ctx"], 4096);
        assert_eq!(json["options"]["seed"], 42);
        assert_eq!(json["messages"][1]["images"][0], "AAAA");
        assert!(json["messages"][0].get("images").is_none());
    }

    #[test]
    fn test_random_seed_omits_seed() {
        let mut model = settings("http://localhost:11434");
        model.random_seed = true;
        let client = OllamaClient::new(&model);
        let json = serde_json::to_value(client.request_body(&[])).unwrap();
        assert!(json["options"].get("seed").is_none());
    }

    #[tokio::test]
    async fn test_chat_returns_message_content() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"model":"llama3.2","message":{"role":"assistant","content":"Hello there"},"done":true}"#,
        )
        .await;
        let client = OllamaClient::new(&settings(&url));
        let reply = client.chat(vec![ChatMessage::user("hi")]).await.unwrap();
        assert_eq!(reply, "Hello there");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/chat"));
        assert!(request.contains("\"stream\":false"));
    }

    #[tokio::test]
    async fn test_http_error_carries_status_and_body() {
        let (url, _server) = serve_once("500 Internal Server Error", r#"{"error":"model not found"}"#).await;
        let client = OllamaClient::new(&settings(&url));
        let err = client.chat(vec![ChatMessage::user("hi")]).await.unwrap_err();
        assert_eq!(
            err,
            BackendError::Status {
                status: 500,
                body: r#"{"error":"model not found"}"#.to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_connect_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = OllamaClient::new(&settings(&format!("http://{addr}")));
        let err = client.chat(vec![ChatMessage::user("hi")]).await.unwrap_err();
        assert!(matches!(err, BackendError::Connect { .. }));
    }
}
