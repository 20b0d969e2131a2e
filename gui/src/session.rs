use persona_core::Notice;
use persona_engine::{PersonaReport, PipelineOutcome};

/// Result of one background run, as handed back to the UI thread.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub outcome: PipelineOutcome,
    pub notices: Vec<Notice>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Idle,
    Running(String),
    Halted(String),
    Failed(String),
    Done(String),
}

impl Status {
    pub fn line(&self) -> String {
        match self {
            Status::Idle => "Enter a Reddit profile URL to begin.".to_string(),
            Status::Running(message) => format!("⏳ {}", message),
            Status::Halted(message) => format!("⚠️ {}", message),
            Status::Failed(message) => format!("❌ {}", message),
            Status::Done(message) => format!("✅ {}", message),
        }
    }
}

/// Everything the window shows. Owned by the app and rebuilt only through these
/// transitions.
#[derive(Debug, Clone)]
pub struct Session {
    pub profile_url: String,
    pub dark_mode: bool,
    pub running: bool,
    pub status: Status,
    pub notices: Vec<String>,
    pub report: Option<PersonaReport>,
    pub export_message: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            profile_url: String::new(),
            dark_mode: true,
            running: false,
            status: Status::Idle,
            notices: Vec::new(),
            report: None,
            export_message: None,
        }
    }
}

impl Session {
    pub fn can_generate(&self) -> bool {
        !self.running && !self.profile_url.trim().is_empty()
    }

    pub fn can_export(&self) -> bool {
        !self.running && self.report.is_some()
    }

    pub fn begin_run(&mut self, username: &str) {
        self.running = true;
        self.report = None;
        self.notices.clear();
        self.export_message = None;
        self.status = Status::Running(format!("Generating persona for u/{}...", username));
    }

    pub fn reject_input(&mut self, message: String) {
        self.status = Status::Failed(message);
    }

    pub fn finish_run(&mut self, result: Result<RunSummary, String>) {
        self.running = false;

        let summary = match result {
            Ok(summary) => summary,
            Err(message) => {
                self.status = Status::Failed(message);
                return;
            }
        };

        // The halt itself is shown in the status line.
        self.notices = summary
            .notices
            .iter()
            .filter(|notice| !matches!(notice, Notice::Halted(_)))
            .map(Notice::to_string)
            .collect();

        match summary.outcome {
            PipelineOutcome::Completed(report) => {
                self.status = if report.persona.is_error {
                    Status::Failed("Persona generation failed.".to_string())
                } else {
                    Status::Done(format!("Persona saved to {}", report.saved_to.display()))
                };
                self.report = Some(report);
            }
            PipelineOutcome::Halted(halt) => {
                self.status = Status::Halted(halt.message().to_string());
            }
        }
    }

    pub fn finish_export(&mut self, result: Result<String, String>) {
        self.export_message = Some(match result {
            Ok(path) => format!("Exported to {}", path),
            Err(message) => format!("Export failed: {}", message),
        });
    }
}
