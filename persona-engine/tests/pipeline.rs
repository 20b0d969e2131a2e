use llm_interface::{GenerationRequest, TextGenerator};
use persona_core::{
    CollectingNotifier, CoreError, Notice, Notifier, ProfileInfo, RedditApiError, TextItem,
    UserContent,
};
use persona_engine::{PersonaPipeline, PipelineConfig, PipelineHalt, PipelineOutcome};
use persona_store::PersonaStore;
use reddit_client::{ContentFetcher, FetchOutcome};
use std::env;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

enum FakeFetcher {
    Content(UserContent),
    NotFound,
}

impl ContentFetcher for FakeFetcher {
    async fn fetch(&self, username: &str, limit: u32, notifier: &dyn Notifier) -> FetchOutcome {
        match self {
            FakeFetcher::Content(content) => {
                let mut content = content.clone();
                content.posts.truncate(limit as usize);
                content.comments.truncate(limit as usize);
                FetchOutcome::Fetched(content)
            }
            FakeFetcher::NotFound => {
                notifier.notify(Notice::FetchFailed {
                    username: username.to_string(),
                    message: "User not found".to_string(),
                });
                FetchOutcome::Empty {
                    cause: RedditApiError::UserNotFound {
                        username: username.to_string(),
                    }
                    .into(),
                }
            }
        }
    }
}

#[derive(Default)]
struct Recorded {
    summary_calls: AtomicUsize,
    persona_prompts: Mutex<Vec<String>>,
}

/// Summarization calls answer "summary N"; the persona call (temperature 0.7) answers
/// with a fixed persona. The test keeps a handle on what was recorded.
#[derive(Default, Clone)]
struct RecordingGenerator {
    recorded: Arc<Recorded>,
}

impl RecordingGenerator {
    fn summary_calls(&self) -> usize {
        self.recorded.summary_calls.load(Ordering::SeqCst)
    }

    fn persona_prompts(&self) -> Vec<String> {
        self.recorded.persona_prompts.lock().unwrap().clone()
    }
}

// Surrounding newlines must reach the file untouched.
const PERSONA_TEXT: &str = "\n👤 Basic Info\n- Archetype: The Tinkerer\n";

impl TextGenerator for RecordingGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, CoreError> {
        if request.temperature > 0.5 {
            self.recorded
                .persona_prompts
                .lock()
                .unwrap()
                .push(request.prompt().to_string());
            return Ok(PERSONA_TEXT.to_string());
        }
        let n = self.recorded.summary_calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("summary {n}"))
    }
}

fn post(i: usize) -> TextItem {
    TextItem::Post {
        title: format!("Post {i}"),
        body: format!("Body {i}"),
        source_url: format!("https://reddit.com/r/rust/comments/p{i}"),
    }
}

fn comment(i: usize) -> TextItem {
    TextItem::Comment {
        body: format!("Comment {i}"),
        source_url: format!("https://reddit.com/r/rust/comments/c{i}"),
    }
}

fn temp_dir() -> PathBuf {
    env::temp_dir().join(format!("test_persona_pipeline_{}", uuid::Uuid::new_v4()))
}

fn config() -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.summarizer.rate_limit_backoff = Duration::ZERO;
    config
}

#[tokio::test]
async fn test_end_to_end_persists_generator_text() {
    let content = UserContent {
        posts: (0..7).map(post).collect(),
        comments: (0..3).map(comment).collect(),
        profile: ProfileInfo {
            display_name: "tinkerer".to_string(),
            karma_total: 42,
            ..Default::default()
        },
    };
    let dir = temp_dir();
    let generator = RecordingGenerator::default();
    let pipeline = PersonaPipeline::new(
        FakeFetcher::Content(content),
        generator.clone(),
        PersonaStore::new(&dir),
        config(),
    );
    let notifier = CollectingNotifier::new();

    let outcome = pipeline.run("tinkerer", &notifier).await.unwrap();

    let PipelineOutcome::Completed(report) = outcome else {
        panic!("expected a completed run, got {outcome:?}");
    };
    assert_eq!(report.post_summaries, vec!["summary 1", "summary 2"]);
    assert_eq!(report.comment_summaries, vec!["summary 3"]);
    assert_eq!(report.profile.karma_total, 42);
    assert!(!report.persona.is_error);
    assert_eq!(report.persona.text, PERSONA_TEXT);

    let persona_prompts = generator.persona_prompts();
    assert_eq!(persona_prompts.len(), 1);
    assert!(persona_prompts[0].contains("📌 Post Summary 2:\nsummary 2\nURL: https://reddit.com/r/rust/comments/p1"));
    assert!(persona_prompts[0].contains("💬 Comment Summary 1:\nsummary 3\nURL: https://reddit.com/r/rust/comments/p2"));

    assert_eq!(report.saved_to, dir.join("tinkerer_persona.txt"));
    assert_eq!(std::fs::read_to_string(&report.saved_to).unwrap(), PERSONA_TEXT);
    assert!(notifier.notices().is_empty());

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_no_content_halts_before_generation() {
    let dir = temp_dir();
    let generator = RecordingGenerator::default();
    let pipeline = PersonaPipeline::new(
        FakeFetcher::Content(UserContent::default()),
        generator.clone(),
        PersonaStore::new(&dir),
        config(),
    );
    let notifier = CollectingNotifier::new();

    let outcome = pipeline.run("quiet", &notifier).await.unwrap();

    assert!(matches!(outcome, PipelineOutcome::Halted(PipelineHalt::NoContent)));
    assert_eq!(generator.summary_calls(), 0);
    assert!(generator.persona_prompts().is_empty());
    assert!(!dir.exists());
    assert_eq!(
        notifier.notices(),
        vec![Notice::Halted("No posts or comments found.".to_string())]
    );
}

#[tokio::test]
async fn test_fetch_failure_is_reported_separately_from_halt() {
    let dir = temp_dir();
    let pipeline = PersonaPipeline::new(
        FakeFetcher::NotFound,
        RecordingGenerator::default(),
        PersonaStore::new(&dir),
        config(),
    );
    let notifier = CollectingNotifier::new();

    let outcome = pipeline.run("ghost", &notifier).await.unwrap();

    assert!(matches!(outcome, PipelineOutcome::Halted(PipelineHalt::NoContent)));
    let notices = notifier.notices();
    assert_eq!(notices.len(), 2);
    assert!(matches!(&notices[0], Notice::FetchFailed { username, .. } if username == "ghost"));
    assert_ne!(notices[0].to_string(), notices[1].to_string());
    assert!(!dir.exists());
}

#[tokio::test]
async fn test_fetch_limit_is_passed_to_fetcher() {
    let content = UserContent {
        posts: (0..40).map(post).collect(),
        comments: Vec::new(),
        profile: ProfileInfo::default(),
    };
    let dir = temp_dir();
    let pipeline = PersonaPipeline::new(
        FakeFetcher::Content(content),
        RecordingGenerator::default(),
        PersonaStore::new(&dir),
        config(),
    );

    let outcome = pipeline.run("prolific", &CollectingNotifier::new()).await.unwrap();

    let PipelineOutcome::Completed(report) = outcome else {
        panic!("expected a completed run");
    };
    // 30 posts in chunks of 5.
    assert_eq!(report.post_summaries.len(), 6);
    assert!(report.comment_summaries.is_empty());

    std::fs::remove_dir_all(&dir).ok();
}
