//! Side-channel for user-visible warnings raised while a pipeline keeps running.

use std::fmt;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    FetchFailed {
        username: String,
        message: String,
    },
    RateLimited {
        label: String,
        chunk: usize,
        wait: Duration,
    },
    ChunkFailed {
        label: String,
        chunk: usize,
        message: String,
    },
    Halted(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::FetchFailed { username, message } => {
                write!(f, "Failed to fetch data for u/{}: {}", username, message)
            }
            Notice::RateLimited { wait, .. } => {
                write!(f, "Rate limit hit. Waiting {} seconds...", wait.as_secs())
            }
            Notice::ChunkFailed {
                label,
                chunk,
                message,
            } => write!(
                f,
                "Summarization of {} chunk {} failed: {}",
                label,
                chunk + 1,
                message
            ),
            Notice::Halted(message) => write!(f, "{}", message),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Writes every notice to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match &notice {
            Notice::FetchFailed { .. } => error!("{}", notice),
            Notice::RateLimited { label, chunk, .. } => {
                warn!("{} ({} chunk {})", notice, label, chunk + 1)
            }
            Notice::ChunkFailed { .. } => warn!("{}", notice),
            Notice::Halted(_) => info!("{}", notice),
        }
    }
}

/// Buffers notices so a caller can show them after the run.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|notices| notices.clone())
            .unwrap_or_default()
    }

    pub fn take(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|mut notices| std::mem::take(&mut *notices))
            .unwrap_or_default()
    }

    pub fn rate_limit_waits(&self) -> usize {
        self.notices()
            .iter()
            .filter(|notice| matches!(notice, Notice::RateLimited { .. }))
            .count()
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, notice: Notice) {
        TracingNotifier.notify(notice.clone());
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }
}

impl<N: Notifier + ?Sized> Notifier for std::sync::Arc<N> {
    fn notify(&self, notice: Notice) {
        (**self).notify(notice)
    }
}
