//! Boundary to the platform speech-recognition capability.
//!
//! The platform is driven through [`SpeechRecognizer`] and reports back by
//! delivering [`RecognitionEvent`]s to whoever owns the dictation adapter. Every
//! event names the recognition session it belongs to, so events that arrive after
//! a session was superseded can be told apart.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizerConfig {
    /// BCP 47 tag of the spoken language.
    pub language: String,
    /// `false` stops recognition after a pause in speech.
    pub continuous: bool,
    pub interim_results: bool,
}

impl RecognizerConfig {
    pub fn new(language: impl Into<String>) -> Self {
        Self { language: language.into(), continuous: false, interim_results: true }
    }
}

impl Default for RecognizerConfig {
    fn default() -> Self { Self::new("es-ES") }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEventKind {
    /// Partial transcript of the utterance so far.
    Interim(String),
    Final(String),
    /// Platform error code, e.g. `no-speech` or `not-allowed`.
    Error(String),
    End,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionEvent {
    pub session: SessionId,
    pub kind: RecognitionEventKind,
}

impl RecognitionEvent {
    pub fn new(session: SessionId, kind: RecognitionEventKind) -> Self { Self { session, kind } }
}

pub trait SpeechRecognizer: Send + 'static {
    fn is_available(&self) -> bool;
    fn start(&mut self, session: SessionId, config: &RecognizerConfig) -> anyhow::Result<()>;
    /// Asks the platform to finish `session`; it answers later with an `End` event.
    fn stop(&mut self, session: SessionId) -> anyhow::Result<()>;
}
