use anyhow::Context;
use clap::Parser;
use gui::{App, Flags};
use iced::{Application, Settings};
use persona_core::AppConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str =
    "reddit_persona=info,persona_engine=info,reddit_client=info,llm_interface=info,gui=info";

#[derive(Parser, Debug)]
#[command(name = "reddit-persona", about = "Generate a user persona from a Reddit profile")]
struct Cli {
    /// Path to a TOML config file (defaults to ./reddit-persona.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also raise desktop notifications for progress and failures
    #[arg(long)]
    notify: bool,
}

fn main() -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Starting Reddit Persona Generator");

    let args = Cli::parse();
    let config = AppConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    let settings = Settings {
        window: iced::window::Settings {
            size: iced::Size::new(1200.0, 800.0),
            min_size: Some(iced::Size::new(800.0, 600.0)),
            ..Default::default()
        },
        ..Settings::with_flags(Flags {
            config,
            desktop_notifications: args.notify,
        })
    };

    PersonaApp::run(settings).map_err(|e| {
        tracing::error!("Application error: {}", e);
        anyhow::anyhow!("GUI error: {e}")
    })
}

struct PersonaApp {
    app: App,
}

impl Application for PersonaApp {
    type Message = gui::Message;
    type Theme = iced::Theme;
    type Executor = iced::executor::Default;
    type Flags = Flags;

    fn new(flags: Self::Flags) -> (Self, iced::Command<Self::Message>) {
        tracing::info!("Initializing application");
        (
            Self {
                app: App::new(flags),
            },
            iced::Command::none(),
        )
    }

    fn title(&self) -> String {
        "Reddit Persona Generator".to_string()
    }

    fn update(&mut self, message: Self::Message) -> iced::Command<Self::Message> {
        self.app.update(message)
    }

    fn view(&self) -> iced::Element<Self::Message> {
        self.app.view()
    }

    fn theme(&self) -> Self::Theme {
        self.app.theme()
    }
}
