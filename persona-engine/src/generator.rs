use llm_interface::{GenerationRequest, TextGenerator};
use persona_core::{CoreError, ErrorExt, LlmError, PersonaResult};
use tracing::info;

pub const NO_CONTENT_MARKER: &str = "❌ No content returned by model.";

/// Final synthesis call. A single attempt: failures, rate limits included, come back
/// as error text instead of being retried. Model text is returned exactly as received.
pub struct PersonaGenerator<'a, G> {
    generator: &'a G,
    temperature: f32,
}

impl<'a, G: TextGenerator> PersonaGenerator<'a, G> {
    pub fn new(generator: &'a G, temperature: f32) -> Self {
        Self {
            generator,
            temperature,
        }
    }

    pub async fn generate(&self, prompt: &str) -> PersonaResult {
        let request = GenerationRequest::from_prompt(prompt, self.temperature);

        match self.generator.generate(&request).await {
            Ok(text) if text.is_empty() => PersonaResult::failed(NO_CONTENT_MARKER),
            Ok(text) => {
                info!("Persona generated ({} chars)", text.len());
                PersonaResult::generated(text)
            }
            Err(CoreError::Llm(LlmError::EmptyResponse { .. })) => {
                PersonaResult::failed(NO_CONTENT_MARKER)
            }
            Err(e) => {
                e.log_warn();
                PersonaResult::failed(format!("❌ LLM Error: {}", e))
            }
        }
    }
}
