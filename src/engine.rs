//! Transcription engine seam
//!
//! The recognizer itself lives outside this crate. A session only needs to
//! configure it, start/stop/abort it, and receive its callbacks. Callbacks are
//! delivered as [`EngineMessage`]s through an [`EventSink`] handed to the engine
//! when it is created; each sink is tagged with the generation of the handle
//! it belongs to, so messages from a replaced handle can be told apart.

use std::fmt;

use thiserror::Error;

use crate::transcript::RawResult;

/// Settings copied onto every engine handle at creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub continuous: bool,
    pub lang: String,
    pub interim_results: bool,
    pub max_alternatives: u32,
}

/// Imperative side of an engine handle. All calls are fire-and-forget; their
/// effects come back later through the handle's [`EventSink`].
pub trait TranscriptionEngine: Send {
    fn start(&mut self);
    /// Stop gracefully; the engine should eventually report `End`
    fn stop(&mut self);
    /// Stop immediately; the engine should report an `aborted` error
    fn abort(&mut self);
}

/// Builds a fresh, configured engine handle. Resolved once by the host
/// environment and injected into the session.
pub trait EngineFactory: Send {
    fn create(&mut self, settings: &EngineSettings, sink: EventSink)
    -> Box<dyn TranscriptionEngine>;
}

impl<F> EngineFactory for F
where
    F: FnMut(&EngineSettings, EventSink) -> Box<dyn TranscriptionEngine> + Send,
{
    fn create(
        &mut self,
        settings: &EngineSettings,
        sink: EventSink,
    ) -> Box<dyn TranscriptionEngine> {
        self(settings, sink)
    }
}

/// How the session treats an engine error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Nothing was heard; not a failure
    TransientNoSignal,
    /// The engine was aborted, which is a normal end
    UserAborted,
    /// Anything else, surfaced to listeners
    EngineFailure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineErrorKind {
    NoSpeech,
    Aborted,
    Other(String),
}

impl EngineErrorKind {
    pub fn from_code(code: &str) -> Self {
        match code {
            "no-speech" => EngineErrorKind::NoSpeech,
            "aborted" => EngineErrorKind::Aborted,
            other => EngineErrorKind::Other(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            EngineErrorKind::NoSpeech => "no-speech",
            EngineErrorKind::Aborted => "aborted",
            EngineErrorKind::Other(code) => code,
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            EngineErrorKind::NoSpeech => ErrorClass::TransientNoSignal,
            EngineErrorKind::Aborted => ErrorClass::UserAborted,
            EngineErrorKind::Other(_) => ErrorClass::EngineFailure,
        }
    }
}

impl fmt::Display for EngineErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct EngineError {
    pub kind: EngineErrorKind,
    pub message: String,
}

impl EngineError {
    pub fn new(kind: EngineErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// The full ordered result list for the current turn
    Result(Vec<RawResult>),
    Error(EngineError),
    End,
}

impl EngineEvent {
    pub fn is_aborted(&self) -> bool {
        matches!(self, EngineEvent::Error(err) if err.kind == EngineErrorKind::Aborted)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineMessage {
    pub generation: u64,
    pub event: EngineEvent,
}

/// Callback half handed to an engine handle
#[derive(Debug, Clone)]
pub struct EventSink {
    generation: u64,
    tx: flume::Sender<EngineMessage>,
}

impl EventSink {
    pub fn new(generation: u64, tx: flume::Sender<EngineMessage>) -> Self {
        Self { generation, tx }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns false once the session is gone
    pub fn send(&self, event: EngineEvent) -> bool {
        self.tx
            .send(EngineMessage {
                generation: self.generation,
                event,
            })
            .is_ok()
    }

    pub fn result(&self, results: Vec<RawResult>) -> bool {
        self.send(EngineEvent::Result(results))
    }

    pub fn error(&self, kind: EngineErrorKind, message: impl Into<String>) -> bool {
        self.send(EngineEvent::Error(EngineError::new(kind, message)))
    }

    pub fn end(&self) -> bool {
        self.send(EngineEvent::End)
    }
}
