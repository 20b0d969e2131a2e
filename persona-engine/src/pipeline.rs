//! One persona run: fetch, summarize posts, summarize comments, build the prompt,
//! generate, persist. Stages run strictly in that order.

use crate::generator::PersonaGenerator;
use crate::prompt::build_persona_prompt;
use crate::summarizer::{ChunkedSummarizer, SummarizerConfig};
use llm_interface::TextGenerator;
use persona_core::{AppConfig, CoreError, Notice, Notifier, PersonaResult, ProfileInfo};
use persona_store::PersonaStore;
use reddit_client::ContentFetcher;
use std::path::PathBuf;
use tracing::{info, instrument};

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub fetch_limit: u32,
    pub summarizer: SummarizerConfig,
    pub persona_temperature: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fetch_limit: 30,
            summarizer: SummarizerConfig::default(),
            persona_temperature: 0.7,
        }
    }
}

impl PipelineConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            fetch_limit: config.reddit.fetch_limit,
            summarizer: SummarizerConfig::from_app_config(config),
            persona_temperature: config.llm.persona_temperature,
        }
    }
}

/// Reasons a run stops before the generator is called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineHalt {
    NoContent,
    NotEnoughContent,
}

impl PipelineHalt {
    pub fn message(&self) -> &'static str {
        match self {
            PipelineHalt::NoContent => "No posts or comments found.",
            PipelineHalt::NotEnoughContent => "Not enough content to build a persona.",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PersonaReport {
    pub username: String,
    pub profile: ProfileInfo,
    pub persona: PersonaResult,
    pub post_summaries: Vec<String>,
    pub comment_summaries: Vec<String>,
    pub saved_to: PathBuf,
}

#[derive(Debug, Clone)]
pub enum PipelineOutcome {
    Completed(PersonaReport),
    Halted(PipelineHalt),
}

pub struct PersonaPipeline<F, G> {
    fetcher: F,
    generator: G,
    store: PersonaStore,
    config: PipelineConfig,
}

impl<F: ContentFetcher, G: TextGenerator> PersonaPipeline<F, G> {
    pub fn new(fetcher: F, generator: G, store: PersonaStore, config: PipelineConfig) -> Self {
        Self {
            fetcher,
            generator,
            store,
            config,
        }
    }

    /// Run the whole pipeline for `username`. Stage failures are reported through
    /// `notifier` and degrade the run; only a failed write is returned as an error.
    #[instrument(skip(self, notifier))]
    pub async fn run(
        &self,
        username: &str,
        notifier: &dyn Notifier,
    ) -> Result<PipelineOutcome, CoreError> {
        let content = self
            .fetcher
            .fetch(username, self.config.fetch_limit, notifier)
            .await
            .into_content();

        if content.is_empty() {
            return Ok(halt(PipelineHalt::NoContent, notifier));
        }

        let summarizer = ChunkedSummarizer::new(&self.generator, &self.config.summarizer);
        let post_summaries = summarizer.summarize("posts", &content.posts, notifier).await;
        let comment_summaries = summarizer
            .summarize("comments", &content.comments, notifier)
            .await;

        if post_summaries.is_empty() && comment_summaries.is_empty() {
            return Ok(halt(PipelineHalt::NotEnoughContent, notifier));
        }

        let prompt = build_persona_prompt(
            &post_summaries,
            &comment_summaries,
            &content.source_urls(),
        );
        let persona = PersonaGenerator::new(&self.generator, self.config.persona_temperature)
            .generate(&prompt)
            .await;

        let saved_to = self.store.save(username, &persona.text).await?;
        info!(
            "Persona for u/{} complete (error marker: {})",
            username, persona.is_error
        );

        Ok(PipelineOutcome::Completed(PersonaReport {
            username: username.to_string(),
            profile: content.profile,
            persona,
            post_summaries,
            comment_summaries,
            saved_to,
        }))
    }
}

fn halt(reason: PipelineHalt, notifier: &dyn Notifier) -> PipelineOutcome {
    notifier.notify(Notice::Halted(reason.message().to_string()));
    PipelineOutcome::Halted(reason)
}
