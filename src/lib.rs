pub mod commands;
pub mod db;
pub mod error;
pub mod notify;
pub mod response;
pub mod server;
pub mod settings;
pub mod sharing;

use std::sync::Arc;

use anyhow::Result;
use log::info;

use db::Database;
use notify::{LogTransport, MailTransport, Notifier, OutboxTransport};
use settings::{MailBackend, Settings};

/// Everything a command needs; cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub notifier: Notifier,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(db: Database, notifier: Notifier, settings: Settings) -> Self {
        Self {
            db,
            notifier,
            settings: Arc::new(settings),
        }
    }

    /// Open the store and mail transport named by `settings`.
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let database = Database::new(settings.database_path.clone())?;

        let transport: Arc<dyn MailTransport> = match settings.mail_backend {
            MailBackend::Log => Arc::new(LogTransport),
            MailBackend::Outbox => Arc::new(OutboxTransport::new(settings.outbox_dir.clone())?),
        };
        let notifier = Notifier::new(transport, settings.default_from_email.clone());

        Ok(Self::new(database, notifier, settings))
    }
}

pub fn run() -> Result<()> {
    let settings_path = Settings::default_path();
    let settings = Settings::load(&settings_path)?;

    // RUST_LOG wins over the configured level.
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(settings.log_level.clone()),
    )
    .init();

    info!("UIForms starting up...");
    info!("Settings loaded from {}", settings_path.display());

    let state = AppState::from_settings(settings)?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        server::serve(&state, stdin, tokio::io::stdout()).await
    })?;

    info!("UIForms shutting down");
    Ok(())
}
