use anyhow::bail;

use crate::domain::speech::{RecognizerConfig, SessionId, SpeechRecognizer};

/// Recognizer for hosts without a speech platform. Dictation is reported as
/// unsupported so the UI can hide it.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSpeechRecognizer;

impl SpeechRecognizer for NoSpeechRecognizer {
    fn is_available(&self) -> bool { false }

    fn start(&mut self, _session: SessionId, config: &RecognizerConfig) -> anyhow::Result<()> {
        bail!("no speech recognition platform for language {}", config.language)
    }

    fn stop(&mut self, _session: SessionId) -> anyhow::Result<()> { Ok(()) }
}
