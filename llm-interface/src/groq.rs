use crate::{ChatMessage, GenerationRequest, TextGenerator};
use persona_core::{CoreError, LlmError, LlmSettings};
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};

const PROVIDER: &str = "groq";
const DEFAULT_RETRY_AFTER_SECS: u64 = 10;

/// Chat completions client for Groq, or any other OpenAI-compatible endpoint.
pub struct GroqProvider {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

impl GroqProvider {
    pub fn new(settings: &LlmSettings) -> Result<Self, CoreError> {
        if settings.api_key.trim().is_empty() {
            return Err(LlmError::InvalidApiKey {
                provider: PROVIDER.to_string(),
            }
            .into());
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            api_key: settings.api_key.trim().to_string(),
            model: settings.model.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

impl TextGenerator for GroqProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, CoreError> {
        let body = ChatRequest {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
        };

        debug!(
            "Requesting chat completion from {} (temperature {})",
            self.model, request.temperature
        );
        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Chat completion request failed: {}", e);
                if e.is_timeout() {
                    CoreError::Llm(LlmError::RequestTimeout {
                        provider: PROVIDER.to_string(),
                    })
                } else {
                    CoreError::Network(e)
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let retry_after = retry_after_secs(resp.headers());
            let text = resp
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            let err = classify_failure(status, retry_after, &text, &self.model);
            warn!("{} returned {}: {}", PROVIDER, status, err);
            return Err(err.into());
        }

        let parsed: ChatResponse = resp.json().await.map_err(|e| {
            error!("Failed to parse chat completion: {}", e);
            CoreError::Llm(LlmError::InvalidResponseFormat {
                provider: PROVIDER.to_string(),
            })
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmError::EmptyResponse {
                provider: PROVIDER.to_string(),
            })?;

        info!("Received {} characters from {}", content.len(), self.model);
        Ok(content)
    }
}

fn retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    headers
        .get("retry-after")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<f64>().ok())
        .map(|secs| secs.ceil() as u64)
}

/// Map a non-success response onto the error taxonomy.
fn classify_failure(
    status: StatusCode,
    retry_after: Option<u64>,
    body: &str,
    model: &str,
) -> LlmError {
    let detail = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error);
    let names_rate_limit = detail.as_ref().is_some_and(|detail| {
        [detail.code.as_deref(), detail.kind.as_deref()]
            .into_iter()
            .flatten()
            .any(|tag| tag == "rate_limit_exceeded" || tag == "rate_limit_error")
    });

    if status == StatusCode::TOO_MANY_REQUESTS || names_rate_limit {
        return LlmError::RateLimitExceeded {
            provider: PROVIDER.to_string(),
            retry_after: retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
        };
    }

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::InvalidApiKey {
            provider: PROVIDER.to_string(),
        },
        StatusCode::NOT_FOUND => LlmError::ModelNotAvailable {
            model: model.to_string(),
        },
        s if s.is_server_error() => LlmError::ServiceUnavailable {
            provider: PROVIDER.to_string(),
        },
        s => LlmError::RequestRejected {
            provider: PROVIDER.to_string(),
            status_code: s.as_u16(),
            message: detail
                .and_then(|detail| detail.message)
                .unwrap_or_else(|| body.to_string()),
        },
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    code: Option<String>,
}
