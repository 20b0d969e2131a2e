//! Application configuration.
//!
//! Values come from an optional TOML file, then environment variables (with a `.env`
//! file filling in whatever the process environment lacks), then are validated as a
//! whole.

use crate::error::{ConfigError, CoreError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_CONFIG_FILE: &str = "reddit-persona.toml";
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Variables defined in a dotenv file. A missing file yields an empty map and
/// malformed lines are skipped.
pub fn read_env_file(path: &Path) -> HashMap<String, String> {
    let iter = match dotenvy::from_path_iter(path) {
        Ok(iter) => iter,
        Err(_) => {
            debug!("No env file at {}", path.display());
            return HashMap::new();
        }
    };

    iter.filter_map(|item| match item {
        Ok(pair) => Some(pair),
        Err(e) => {
            warn!("Skipping malformed line in {}: {}", path.display(), e);
            None
        }
    })
    .collect()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub reddit: RedditSettings,
    pub llm: LlmSettings,
    pub summarizer: SummarizerSettings,
    pub output: OutputSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedditSettings {
    pub user_agent: String,
    pub base_url: String,
    /// Maximum number of posts, and separately of comments, fetched per user.
    pub fetch_limit: u32,
    pub requests_per_minute: u32,
    pub timeout_secs: u64,
}

impl Default for RedditSettings {
    fn default() -> Self {
        Self {
            user_agent: String::new(),
            base_url: "https://www.reddit.com".to_string(),
            fetch_limit: 30,
            requests_per_minute: 60,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub summary_temperature: f32,
    pub persona_temperature: f32,
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama3-70b-8192".to_string(),
            summary_temperature: 0.3,
            persona_temperature: 0.7,
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerSettings {
    pub chunk_size: usize,
    pub rate_limit_backoff_secs: u64,
    /// `None` keeps retrying a rate-limited chunk until it succeeds.
    pub max_rate_limit_retries: Option<u32>,
    /// Chunks summarized concurrently. 1 means strictly sequential.
    pub max_in_flight: usize,
}

impl Default for SummarizerSettings {
    fn default() -> Self {
        Self {
            chunk_size: 5,
            rate_limit_backoff_secs: 10,
            max_rate_limit_retries: None,
            max_in_flight: 1,
        }
    }
}

impl SummarizerSettings {
    pub fn rate_limit_backoff(&self) -> Duration {
        Duration::from_secs(self.rate_limit_backoff_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub dir: PathBuf,
    pub export_dir: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("outputs"),
            export_dir: PathBuf::from("."),
        }
    }
}

impl AppConfig {
    /// Load configuration from `path`, or from `./reddit-persona.toml` when it exists,
    /// then apply environment overrides (including `./.env`) and validate.
    pub fn load(path: Option<&Path>) -> Result<Self, CoreError> {
        Self::load_with_env_file(path, Path::new(DEFAULT_ENV_FILE))
    }

    pub fn load_with_env_file(path: Option<&Path>, env_file: &Path) -> Result<Self, CoreError> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::load_from_file(&fallback)?
                } else {
                    info!("No config file found, using defaults");
                    Self::default()
                }
            }
        };

        // The process environment takes precedence over the env file.
        let env_file = read_env_file(env_file);
        config.apply_overrides(|key| {
            std::env::var(key)
                .ok()
                .or_else(|| env_file.get(key).cloned())
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        debug!("Loaded config from {}", path.display());
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, CoreError> {
        let config: AppConfig = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Apply environment-style overrides. `lookup` returns the value for a variable name.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("GROQ_API_KEY") {
            self.llm.api_key = key;
        }
        if let Some(agent) = lookup("REDDIT_USER_AGENT") {
            self.reddit.user_agent = agent;
        }
        if let Some(url) = lookup("REDDIT_BASE_URL") {
            self.reddit.base_url = url;
        }
        if let Some(url) = lookup("LLM_BASE_URL") {
            self.llm.base_url = url;
        }
        if let Some(model) = lookup("LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(dir) = lookup("PERSONA_OUTPUT_DIR") {
            self.output.dir = PathBuf::from(dir);
        }
        if let Some(size) = lookup("PERSONA_CHUNK_SIZE") {
            self.summarizer.chunk_size =
                size.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    field: "PERSONA_CHUNK_SIZE".to_string(),
                    value: size.clone(),
                })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.llm.api_key.trim().is_empty() {
            return Err(ConfigError::MissingEnvironmentVariable {
                var_name: "GROQ_API_KEY".to_string(),
            }
            .into());
        }
        if self.reddit.user_agent.trim().is_empty() {
            return Err(ConfigError::MissingEnvironmentVariable {
                var_name: "REDDIT_USER_AGENT".to_string(),
            }
            .into());
        }
        if self.summarizer.chunk_size == 0 {
            return Err(invalid("summarizer.chunk_size", "must be at least 1"));
        }
        if self.summarizer.max_in_flight == 0 {
            return Err(invalid("summarizer.max_in_flight", "must be at least 1"));
        }
        if self.reddit.fetch_limit == 0 {
            return Err(invalid("reddit.fetch_limit", "must be at least 1"));
        }
        for (field, value) in [
            ("llm.summary_temperature", self.llm.summary_temperature),
            ("llm.persona_temperature", self.llm.persona_temperature),
        ] {
            if !(0.0..=2.0).contains(&value) {
                return Err(invalid(field, "must be between 0 and 2"));
            }
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> CoreError {
    ConfigError::ValidationFailed {
        reason: format!("{} {}", field, reason),
    }
    .into()
}
