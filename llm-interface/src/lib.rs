use persona_core::CoreError;
use serde::{Deserialize, Serialize};

mod groq;

pub use groq::GroqProvider;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// A single chat completion call. The model is chosen by the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

impl GenerationRequest {
    pub fn from_prompt(prompt: impl Into<String>, temperature: f32) -> Self {
        Self {
            messages: vec![ChatMessage::user(prompt)],
            temperature,
        }
    }

    /// Content of the last user message.
    pub fn prompt(&self) -> &str {
        self.messages
            .iter()
            .rev()
            .find(|message| message.role == "user")
            .map(|message| message.content.as_str())
            .unwrap_or_default()
    }
}

/// Text-generation backend. Implementations translate provider failures into
/// `LlmError` variants; a rate limit must surface as `LlmError::RateLimitExceeded`.
pub trait TextGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, CoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_from_prompt() {
        let request = GenerationRequest::from_prompt("Summarize this", 0.3);
        assert_eq!(request.messages, vec![ChatMessage::user("Summarize this")]);
        assert_eq!(request.temperature, 0.3);
        assert_eq!(request.prompt(), "Summarize this");
    }
}
