use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::Result;
use crossterm::{event::{DisableMouseCapture, EnableMouseCapture}, execute, terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen}};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use solo_dilo::{
    application::ListSession,
    config::Config,
    domain::{repository::ListStore, speech::RecognizerConfig},
    infrastructure::{json_preferences::JsonPreferences, speech::NoSpeechRecognizer, sqlite_store::SqliteListStore},
    presentation::{self, App},
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // The terminal belongs to the UI, so logs go to a file.
    let log_file = OpenOptions::new().create(true).append(true).open(&config.log_file)?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();

    let store = SqliteListStore::connect(&config.database_url).await?;
    store.init().await?;
    let prefs = JsonPreferences::open(&config.preferences_path);
    let session = ListSession::new(store, prefs, NoSpeechRecognizer, RecognizerConfig::new(config.speech_language.clone()));
    let mut app = App::new(session, config.gesture());
    tracing::info!(database = %config.database_url, "starting");

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = presentation::run_app(&mut terminal, &mut app, None).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    tracing::info!("shutdown");
    res
}
