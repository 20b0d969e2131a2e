use iced::widget::{button, column, container, row, scrollable, text, text_input, toggler, Column};
use iced::{Command, Element, Length, Theme};
use llm_interface::GroqProvider;
use persona_core::{
    extract_username, AppConfig, CollectingNotifier, CoreError, ErrorExt, Notifier,
};
use persona_engine::{DesktopNotifier, PersonaPipeline, PersonaReport, PipelineConfig};
use persona_store::PersonaStore;
use reddit_client::RedditApiClient;
use std::sync::Arc;
use tracing::info;

mod session;

pub use session::{RunSummary, Session, Status};

pub type RedditPersonaPipeline = PersonaPipeline<RedditApiClient, GroqProvider>;

#[derive(Debug, Clone, Default)]
pub struct Flags {
    pub config: AppConfig,
    pub desktop_notifications: bool,
}

#[derive(Debug, Clone)]
pub enum Message {
    ProfileUrlChanged(String),
    Generate,
    Finished(Result<RunSummary, String>),
    Export,
    Exported(Result<String, String>),
    ThemeToggled(bool),
}

pub fn build_pipeline(config: &AppConfig) -> Result<RedditPersonaPipeline, CoreError> {
    let fetcher = RedditApiClient::new(&config.reddit)?;
    let generator = GroqProvider::new(&config.llm)?;
    Ok(PersonaPipeline::new(
        fetcher,
        generator,
        PersonaStore::new(&config.output.dir),
        PipelineConfig::from_app_config(config),
    ))
}

pub struct App {
    session: Session,
    // Missing credentials are reported when the user first tries to generate.
    pipeline: Result<Arc<RedditPersonaPipeline>, String>,
    export_store: PersonaStore,
    desktop_notifications: bool,
}

impl App {
    pub fn new(flags: Flags) -> Self {
        let pipeline = build_pipeline(&flags.config).map(Arc::new).map_err(|e| {
            e.log_error();
            e.user_friendly_message()
        });

        Self {
            session: Session::default(),
            pipeline,
            export_store: PersonaStore::new(&flags.config.output.export_dir),
            desktop_notifications: flags.desktop_notifications,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn theme(&self) -> Theme {
        if self.session.dark_mode {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn update(&mut self, message: Message) -> Command<Message> {
        match message {
            Message::ProfileUrlChanged(value) => {
                self.session.profile_url = value;
                Command::none()
            }
            Message::Generate => self.start_run(),
            Message::Finished(result) => {
                self.session.finish_run(result);
                Command::none()
            }
            Message::Export => self.export(),
            Message::Exported(result) => {
                self.session.finish_export(result);
                Command::none()
            }
            Message::ThemeToggled(dark) => {
                self.session.dark_mode = dark;
                Command::none()
            }
        }
    }

    fn start_run(&mut self) -> Command<Message> {
        if !self.session.can_generate() {
            return Command::none();
        }

        let username = match extract_username(self.session.profile_url.trim()) {
            Ok(username) => username,
            Err(e) => {
                self.session.reject_input(e.user_friendly_message());
                return Command::none();
            }
        };
        let pipeline = match &self.pipeline {
            Ok(pipeline) => Arc::clone(pipeline),
            Err(message) => {
                self.session.reject_input(message.clone());
                return Command::none();
            }
        };

        info!("Starting persona run for u/{}", username);
        self.session.begin_run(&username);
        Command::perform(
            run_pipeline(pipeline, username, self.desktop_notifications),
            Message::Finished,
        )
    }

    fn export(&mut self) -> Command<Message> {
        let Some(report) = self.session.report.as_ref().filter(|_| self.session.can_export()) else {
            return Command::none();
        };

        let store = self.export_store.clone();
        let username = report.username.clone();
        let persona = report.persona.text.clone();
        Command::perform(
            async move {
                store
                    .save(&username, &persona)
                    .await
                    .map(|path| path.display().to_string())
                    .map_err(|e| e.user_friendly_message())
            },
            Message::Exported,
        )
    }

    pub fn view(&self) -> Element<'_, Message, Theme> {
        let session = &self.session;

        let notices = Column::with_children(
            session
                .notices
                .iter()
                .map(|notice| text(notice).size(12).into()),
        )
        .spacing(4);

        let controls = column![
            text("Reddit Persona Generator").size(24),
            text_input("https://www.reddit.com/user/<username>", &session.profile_url)
                .on_input(Message::ProfileUrlChanged)
                .on_submit(Message::Generate)
                .padding(10),
            button(text("Generate Persona"))
                .on_press_maybe(session.can_generate().then_some(Message::Generate))
                .padding(10),
            text(session.status.line()).size(14),
            notices,
            toggler(
                String::from("Dark mode"),
                session.dark_mode,
                Message::ThemeToggled
            ),
        ]
        .spacing(12)
        .width(Length::FillPortion(1));

        let result: Element<'_, Message, Theme> = match &session.report {
            Some(report) => self.report_view(report),
            None => text("Your generated persona will appear here.").size(14).into(),
        };

        let content = row![
            controls,
            container(result)
                .width(Length::FillPortion(2))
                .height(Length::Fill)
        ]
        .spacing(20);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .padding(20)
            .into()
    }

    fn report_view<'a>(&'a self, report: &'a PersonaReport) -> Element<'a, Message, Theme> {
        let profile = &report.profile;
        let name = if profile.display_name.is_empty() {
            &report.username
        } else {
            &profile.display_name
        };

        let card = container(
            column![
                text(format!("u/{}", name)).size(20),
                text(format!("Karma: {}", profile.karma_total)),
                text(format!("Cake Day: {}", profile.cake_day())),
                text(format!(
                    "Avatar: {}",
                    profile.avatar_url.as_deref().unwrap_or("none")
                ))
                .size(12),
            ]
            .spacing(4),
        )
        .padding(10)
        .style(iced::theme::Container::Box);

        let export_row = row![
            button(text("Export"))
                .on_press_maybe(self.session.can_export().then_some(Message::Export))
                .padding(8),
            text(self.session.export_message.clone().unwrap_or_default()).size(12),
        ]
        .spacing(10);

        column![
            card,
            scrollable(text(&report.persona.text).size(14)).height(Length::Fill),
            export_row,
        ]
        .spacing(12)
        .into()
    }
}

async fn run_pipeline(
    pipeline: Arc<RedditPersonaPipeline>,
    username: String,
    desktop_notifications: bool,
) -> Result<RunSummary, String> {
    let collected = Arc::new(CollectingNotifier::new());
    let notifier: Box<dyn Notifier> = if desktop_notifications {
        Box::new(DesktopNotifier::wrapping(Arc::clone(&collected)))
    } else {
        Box::new(Arc::clone(&collected))
    };

    let outcome = pipeline.run(&username, &*notifier).await.map_err(|e| {
        e.log_error();
        e.user_friendly_message()
    })?;

    Ok(RunSummary {
        outcome,
        notices: collected.take(),
    })
}
