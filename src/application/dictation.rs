//! Dictation adapter: binds one field at a time to the platform recognizer and
//! turns recognition events into [`DictationOutcome`]s for the session to apply.
//!
//! The adapter never touches field text itself. The session owns the fields, so
//! every effect comes back as an outcome naming its target.

use crate::domain::speech::{RecognitionEvent, RecognitionEventKind, RecognizerConfig, SessionId, SpeechRecognizer};

use super::focus::FieldTarget;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictationState {
    Idle,
    Listening,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictationOutcome {
    /// Write the partial transcript into the field without saving.
    Interim { target: FieldTarget, text: String },
    /// Write the transcript into the field and treat it as a change.
    Final { target: FieldTarget, text: String },
    /// Recognition failed; whatever the field holds stays.
    Failed { target: FieldTarget, code: String },
    /// The session is over; the field's current value counts as a change.
    Ended { target: FieldTarget },
}

#[derive(Debug, Clone, Copy)]
struct Binding {
    session: SessionId,
    target: FieldTarget,
    stop_requested: bool,
}

pub struct DictationAdapter<R> {
    recognizer: R,
    config: RecognizerConfig,
    binding: Option<Binding>,
    next_session: u64,
}

impl<R: SpeechRecognizer> DictationAdapter<R> {
    pub fn new(recognizer: R, config: RecognizerConfig) -> Self {
        Self { recognizer, config, binding: None, next_session: 1 }
    }

    pub fn is_supported(&self) -> bool { self.recognizer.is_available() }

    pub fn state(&self) -> DictationState {
        if self.binding.is_some() { DictationState::Listening } else { DictationState::Idle }
    }

    pub fn target(&self) -> Option<FieldTarget> { self.binding.map(|b| b.target) }

    pub fn session(&self) -> Option<SessionId> { self.binding.map(|b| b.session) }

    pub fn recognizer(&self) -> &R { &self.recognizer }

    /// Binds `target` and starts the platform. A session that is still bound is
    /// closed out first, and its `Ended` outcome comes back ahead of anything
    /// about the new one.
    pub fn start_listening(&mut self, target: FieldTarget) -> Vec<DictationOutcome> {
        let mut outcomes = Vec::new();
        if !self.is_supported() {
            tracing::warn!("speech recognition not available, ignoring dictation request");
            return outcomes;
        }

        if let Some(previous) = self.binding.take() {
            if !previous.stop_requested {
                if let Err(e) = self.recognizer.stop(previous.session) {
                    tracing::warn!(session = previous.session.0, error = %e, "could not stop previous dictation");
                }
            }
            tracing::debug!(session = previous.session.0, "dictation superseded");
            outcomes.push(DictationOutcome::Ended { target: previous.target });
        }

        let session = SessionId(self.next_session);
        self.next_session += 1;
        match self.recognizer.start(session, &self.config) {
            Ok(()) => {
                tracing::debug!(session = session.0, ?target, language = %self.config.language, "dictation started");
                self.binding = Some(Binding { session, target, stop_requested: false });
            }
            Err(e) => {
                tracing::error!(session = session.0, error = %e, "could not start dictation");
                outcomes.push(DictationOutcome::Failed { target, code: e.to_string() });
            }
        }
        outcomes
    }

    /// Asks the platform to finish. The binding stays until the platform's `End`
    /// event arrives; if the platform refuses, the session is closed out right away.
    pub fn stop_listening(&mut self) -> Option<DictationOutcome> {
        let binding = self.binding.as_mut()?;
        if binding.stop_requested { return None; }
        binding.stop_requested = true;
        let (session, target) = (binding.session, binding.target);
        match self.recognizer.stop(session) {
            Ok(()) => {
                tracing::debug!(session = session.0, "dictation stop requested");
                None
            }
            Err(e) => {
                tracing::warn!(session = session.0, error = %e, "platform refused to stop, closing dictation");
                self.binding = None;
                Some(DictationOutcome::Ended { target })
            }
        }
    }

    /// Drops the binding without waiting for the platform. Later events for the
    /// session are ignored.
    pub fn abandon(&mut self) {
        if let Some(binding) = self.binding.take() {
            if !binding.stop_requested {
                if let Err(e) = self.recognizer.stop(binding.session) {
                    tracing::warn!(session = binding.session.0, error = %e, "could not stop abandoned dictation");
                }
            }
            tracing::debug!(session = binding.session.0, "dictation abandoned");
        }
    }

    /// Follows the bound task when an earlier task is deleted, and abandons the
    /// session when its own task is deleted.
    pub fn task_removed(&mut self, removed: usize) {
        let Some(binding) = self.binding.as_mut() else { return };
        match binding.target.after_task_removed(removed) {
            Some(target) => binding.target = target,
            None => self.abandon(),
        }
    }

    pub fn handle_event(&mut self, event: RecognitionEvent) -> Option<DictationOutcome> {
        let binding = match self.binding {
            Some(b) if b.session == event.session => b,
            _ => {
                tracing::debug!(session = event.session.0, "dropping event for a stale dictation session");
                return None;
            }
        };
        let target = binding.target;
        match event.kind {
            RecognitionEventKind::Interim(text) => Some(DictationOutcome::Interim { target, text }),
            RecognitionEventKind::Final(text) => {
                self.binding = None;
                tracing::debug!(session = binding.session.0, "final transcript received");
                Some(DictationOutcome::Final { target, text })
            }
            RecognitionEventKind::Error(code) => {
                self.binding = None;
                tracing::warn!(session = binding.session.0, %code, "speech recognition error");
                Some(DictationOutcome::Failed { target, code })
            }
            RecognitionEventKind::End => {
                self.binding = None;
                tracing::debug!(session = binding.session.0, "dictation ended");
                Some(DictationOutcome::Ended { target })
            }
        }
    }
}
