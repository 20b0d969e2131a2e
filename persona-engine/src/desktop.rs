use notify_rust::Notification;
use persona_core::{Notice, Notifier, TracingNotifier};
use tracing::warn;

const APP_NAME: &str = "Reddit Persona";

/// Forwards every notice to `inner` and mirrors the important ones to the OS
/// notification center. Chunk failures stay in the log and the status line.
#[derive(Debug, Default, Clone)]
pub struct DesktopNotifier<N = TracingNotifier> {
    inner: N,
}

impl DesktopNotifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<N: Notifier> DesktopNotifier<N> {
    pub fn wrapping(inner: N) -> Self {
        Self { inner }
    }
}

fn summary_for(notice: &Notice) -> Option<&'static str> {
    match notice {
        Notice::FetchFailed { .. } => Some("Fetch failed"),
        Notice::RateLimited { .. } => Some("Rate limited"),
        Notice::Halted(_) => Some("Persona halted"),
        Notice::ChunkFailed { .. } => None,
    }
}

impl<N: Notifier> Notifier for DesktopNotifier<N> {
    fn notify(&self, notice: Notice) {
        let summary = summary_for(&notice);
        let body = notice.to_string();
        self.inner.notify(notice);

        let Some(summary) = summary else {
            return;
        };
        if let Err(e) = Notification::new()
            .appname(APP_NAME)
            .summary(summary)
            .body(&body)
            .show()
        {
            warn!("Failed to show desktop notification: {}", e);
        }
    }
}
