//! Terminal front end. Draws the session and turns keys and mouse gestures into
//! session operations; it holds no list logic of its own.

pub mod app;
pub mod view;

use std::io::Stdout;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::domain::{
    repository::{ListStore, PreferenceStore},
    speech::{RecognitionEvent, SpeechRecognizer},
};

pub use app::App;

const TICK_RATE: Duration = Duration::from_millis(100);

/// Drives the UI until the user quits. `dictation_events` carries platform speech
/// events when a recognizer that produces them is wired in.
pub async fn run_app<S: ListStore, P: PreferenceStore, R: SpeechRecognizer>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App<S, P, R>,
    mut dictation_events: Option<UnboundedReceiver<RecognitionEvent>>,
) -> Result<()> {
    app.start().await;
    let mut last_tick = Instant::now();

    while !app.quit {
        terminal.draw(|f| view::draw(f, app))?;

        if let Some(events) = dictation_events.as_mut() {
            while let Ok(event) = events.try_recv() {
                app.on_dictation_event(event).await;
            }
        }

        let timeout = TICK_RATE.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => app.on_key(key).await,
                Event::Mouse(mouse) => app.on_mouse(mouse).await,
                _ => {}
            }
        }
        if last_tick.elapsed() >= TICK_RATE {
            app.tick(Instant::now()).await;
            last_tick = Instant::now();
        }
    }
    Ok(())
}
