pub mod message;
pub mod preview;
pub mod segment;

pub use message::{Attachment, EditMarker, FileKind, Message, Role};
pub use preview::{Classification, LivePreviewState, Runtime};
pub use segment::{CodeBlock, CombinedCode, Segment, TableData};

pub mod settings {
    use serde::{Deserialize, Serialize};

    pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";
    pub const DEFAULT_MODEL: &str = "llama3.2";
    /// Seed sent when the user has not asked for randomized sampling.
    pub const FIXED_SEED: u64 = 42;

    fn default_endpoint() -> String {
        DEFAULT_ENDPOINT.to_string()
    }

    fn default_model() -> String {
        DEFAULT_MODEL.to_string()
    }

    fn default_temperature() -> f32 {
        0.7
    }

    fn default_context_window() -> u32 {
        4096
    }

    /// Connection and sampling settings for the local chat backend.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct ModelSettings {
        /// Base URL of the Ollama-compatible server, e.g. "http://localhost:11434"
        #[serde(default = "default_endpoint")]
        pub endpoint: String,
        /// Model tag, e.g. "llama3.2" or "llava:7b"
        #[serde(default = "default_model")]
        pub model: String,
        #[serde(default = "default_temperature")]
        pub temperature: f32,
        /// Sent as `num_ctx`
        #[serde(default = "default_context_window")]
        pub context_window: u32,
        /// When false every request carries `FIXED_SEED`
        #[serde(default)]
        pub random_seed: bool,
    }

    impl ModelSettings {
        pub fn seed(&self) -> Option<u64> {
            if self.random_seed {
                None
            } else {
                Some(FIXED_SEED)
            }
        }
    }

    impl Default for ModelSettings {
        fn default() -> Self {
            Self {
                endpoint: default_endpoint(),
                model: default_model(),
                temperature: default_temperature(),
                context_window: default_context_window(),
                random_seed: false,
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct AppSettings {
        #[serde(default)]
        pub model: ModelSettings,
        #[serde(default)]
        pub user_name: String,
    }

    impl Default for AppSettings {
        fn default() -> Self {
            Self {
                model: ModelSettings::default(),
                user_name: String::new(),
            }
        }
    }
}

pub mod agent_api {
    use serde::{Deserialize, Serialize};

    /// One message as the chat backend sees it.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct ChatMessage {
        pub role: String, // "system" | "user" | "assistant"
        pub content: String,
        /// Base64 payloads (no data-URL prefix) for multimodal models
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub images: Option<Vec<String>>,
    }

    impl ChatMessage {
        pub fn system(content: impl Into<String>) -> Self {
            Self {
                role: "system".into(),
                content: content.into(),
                images: None,
            }
        }

        pub fn user(content: impl Into<String>) -> Self {
            Self {
                role: "user".into(),
                content: content.into(),
                images: None,
            }
        }

        pub fn assistant(content: impl Into<String>) -> Self {
            Self {
                role: "assistant".into(),
                content: content.into(),
                images: None,
            }
        }

        pub fn with_image(mut self, base64: impl Into<String>) -> Self {
            self.images.get_or_insert_with(Vec::new).push(base64.into());
            self
        }
    }

    /// Sampling options forwarded verbatim to the backend.
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct GenerationOptions {
        pub temperature: f32,
        pub num_ctx: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub seed: Option<u64>,
    }

    impl From<&crate::settings::ModelSettings> for GenerationOptions {
        fn from(settings: &crate::settings::ModelSettings) -> Self {
            Self {
                temperature: settings.temperature,
                num_ctx: settings.context_window,
                seed: settings.seed(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::agent_api::{ChatMessage, GenerationOptions};
    use super::settings::{AppSettings, ModelSettings, FIXED_SEED};

    #[test]
    fn test_settings_defaults_fill_missing_fields() {
        let settings: AppSettings = serde_json::from_str(r#"{"model":{"model":"llava"}}"#).unwrap();
        assert_eq!(settings.model.model, "llava");
        assert_eq!(settings.model.endpoint, "http://localhost:11434");
        assert_eq!(settings.model.context_window, 4096);
        assert!(!settings.model.random_seed);
    }

    #[test]
    fn test_seed_follows_random_flag() {
        let mut model = ModelSettings::default();
        assert_eq!(GenerationOptions::from(&model).seed, Some(FIXED_SEED));
        model.random_seed = true;
        assert_eq!(GenerationOptions::from(&model).seed, None);
    }

    #[test]
    fn test_images_omitted_when_absent() {
        let json = serde_json::to_value(ChatMessage::user("hi")).unwrap();
        assert!(json.get("images").is_none());

        let json = serde_json::to_value(ChatMessage::user("look").with_image("AAAA")).unwrap();
        assert_eq!(json["images"][0], "AAAA");
    }
}
