//! Scripted doubles shared by the unit tests of this crate.

use llm_interface::{GenerationRequest, TextGenerator};
use persona_core::{CoreError, LlmError, TextItem};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub enum Step {
    Reply(&'static str),
    RateLimited,
    Fail,
    Echo,
}

pub struct ScriptedGenerator {
    steps: Mutex<VecDeque<Step>>,
    prompts: Mutex<Vec<String>>,
    temperatures: Mutex<Vec<f32>>,
    stagger: bool,
}

impl ScriptedGenerator {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            prompts: Mutex::new(Vec::new()),
            temperatures: Mutex::new(Vec::new()),
            stagger: false,
        }
    }

    /// Replies with the prompt it was given.
    pub fn echo() -> Self {
        Self::new(Vec::new())
    }

    /// Echoes, with earlier calls finishing later than subsequent ones.
    pub fn echo_with_staggered_delay() -> Self {
        Self {
            stagger: true,
            ..Self::echo()
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn temperatures(&self) -> Vec<f32> {
        self.temperatures.lock().unwrap().clone()
    }
}

impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, CoreError> {
        let call_index = {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(request.prompt().to_string());
            prompts.len() - 1
        };
        self.temperatures.lock().unwrap().push(request.temperature);

        if self.stagger {
            let delay = 40u64.saturating_sub(call_index as u64 * 10);
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        let step = self.steps.lock().unwrap().pop_front().unwrap_or(Step::Echo);
        match step {
            Step::Reply(text) => Ok(text.to_string()),
            Step::Echo => Ok(request.prompt().to_string()),
            Step::RateLimited => Err(LlmError::RateLimitExceeded {
                provider: "scripted".to_string(),
                retry_after: 10,
            }
            .into()),
            Step::Fail => Err(LlmError::RequestRejected {
                provider: "scripted".to_string(),
                status_code: 400,
                message: "bad request".to_string(),
            }
            .into()),
        }
    }
}

/// `n` posts titled "Post 0", "Post 1", ...
pub fn items(n: usize) -> Vec<TextItem> {
    (0..n)
        .map(|i| TextItem::Post {
            title: format!("Post {i}"),
            body: format!("Body {i}"),
            source_url: format!("https://reddit.com/p{i}"),
        })
        .collect()
}
