pub mod desktop;
pub mod generator;
pub mod pipeline;
pub mod prompt;
pub mod summarizer;

#[cfg(test)]
mod testing;

pub use desktop::DesktopNotifier;
pub use generator::{PersonaGenerator, NO_CONTENT_MARKER};
pub use pipeline::{PersonaPipeline, PersonaReport, PipelineConfig, PipelineHalt, PipelineOutcome};
pub use prompt::{build_persona_prompt, PERSONA_INSTRUCTIONS};
pub use summarizer::{chunk_count, chunk_prompt, ChunkedSummarizer, SummarizerConfig};
