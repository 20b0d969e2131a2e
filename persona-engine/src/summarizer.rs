//! Batch summarization of a user's posts or comments.
//!
//! Items are split into consecutive chunks of `chunk_size`, and every chunk yields
//! exactly one summary, in chunk order. A chunk that fails for any reason other than
//! rate limiting still occupies its slot with [`SUMMARY_FAILED`], so the output length
//! is always `ceil(items / chunk_size)`.

use futures::stream::{self, StreamExt};
use llm_interface::{GenerationRequest, TextGenerator};
use persona_core::{
    AppConfig, ErrorExt, Notice, Notifier, TextItem, SUMMARY_FAILED,
};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct SummarizerConfig {
    pub chunk_size: usize,
    pub temperature: f32,
    /// Fixed wait before retrying a rate-limited chunk.
    pub rate_limit_backoff: Duration,
    /// Give up on a chunk after this many rate-limit waits. `None` retries forever.
    pub max_rate_limit_retries: Option<u32>,
    pub max_in_flight: usize,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 5,
            temperature: 0.3,
            rate_limit_backoff: Duration::from_secs(10),
            max_rate_limit_retries: None,
            max_in_flight: 1,
        }
    }
}

impl SummarizerConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            chunk_size: config.summarizer.chunk_size,
            temperature: config.llm.summary_temperature,
            rate_limit_backoff: config.summarizer.rate_limit_backoff(),
            max_rate_limit_retries: config.summarizer.max_rate_limit_retries,
            max_in_flight: config.summarizer.max_in_flight,
        }
    }
}

/// Number of summaries produced for `item_count` items.
pub fn chunk_count(item_count: usize, chunk_size: usize) -> usize {
    item_count.div_ceil(chunk_size.max(1))
}

/// Prompt sent for one chunk of items.
pub fn chunk_prompt(label: &str, chunk: &[TextItem]) -> String {
    let content = chunk
        .iter()
        .map(TextItem::render)
        .collect::<Vec<_>>()
        .join("\n\n");
    format!(
        "Summarize the following Reddit {} to capture the author's key personality traits and behavior:\n\n{}",
        label, content
    )
}

pub struct ChunkedSummarizer<'a, G> {
    generator: &'a G,
    config: &'a SummarizerConfig,
}

impl<'a, G: TextGenerator> ChunkedSummarizer<'a, G> {
    pub fn new(generator: &'a G, config: &'a SummarizerConfig) -> Self {
        Self { generator, config }
    }

    /// Summarize `items` chunk by chunk. `label` names the collection in the prompt
    /// ("posts", "comments").
    pub async fn summarize(
        &self,
        label: &str,
        items: &[TextItem],
        notifier: &dyn Notifier,
    ) -> Vec<String> {
        let chunk_size = self.config.chunk_size.max(1);
        info!(
            "Summarizing {} {} in {} chunks",
            items.len(),
            label,
            chunk_count(items.len(), chunk_size)
        );

        // `buffered` yields in input order, so summaries[i] always belongs to chunk i.
        let chunks: Vec<_> = items
            .chunks(chunk_size)
            .enumerate()
            .map(|(index, chunk)| self.summarize_chunk(label, index, chunk, notifier))
            .collect();
        stream::iter(chunks)
            .buffered(self.config.max_in_flight.max(1))
            .collect()
            .await
    }

    async fn summarize_chunk(
        &self,
        label: &str,
        index: usize,
        chunk: &[TextItem],
        notifier: &dyn Notifier,
    ) -> String {
        let request = GenerationRequest::from_prompt(chunk_prompt(label, chunk), self.config.temperature);
        let mut waits: u32 = 0;

        loop {
            match self.generator.generate(&request).await {
                Ok(text) => {
                    debug!("Summarized {} chunk {} after {} waits", label, index + 1, waits);
                    return text.trim().to_string();
                }
                Err(e) if e.is_rate_limited() => {
                    if let Some(cap) = self.config.max_rate_limit_retries {
                        if waits >= cap {
                            notifier.notify(Notice::ChunkFailed {
                                label: label.to_string(),
                                chunk: index,
                                message: format!("still rate limited after {} retries", cap),
                            });
                            return SUMMARY_FAILED.to_string();
                        }
                    }

                    notifier.notify(Notice::RateLimited {
                        label: label.to_string(),
                        chunk: index,
                        wait: self.config.rate_limit_backoff,
                    });
                    sleep(self.config.rate_limit_backoff).await;
                    waits += 1;
                }
                Err(e) => {
                    notifier.notify(Notice::ChunkFailed {
                        label: label.to_string(),
                        chunk: index,
                        message: e.to_string(),
                    });
                    return SUMMARY_FAILED.to_string();
                }
            }
        }
    }
}
