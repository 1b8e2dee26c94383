//! Grammar detection over a live speech-to-text stream
//!
//! A [`RecognitionSession`] keeps an external transcription engine running,
//! turns its hypotheses into [`Sentence`]s and emits `match` events when a
//! sentence contains one of the configured phrases. A [`MatchThrottle`] sits
//! between those events and the application.

pub mod accumulator;
pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod events;
pub mod grammar;
pub mod replay;
pub mod session;
pub mod similarity;
pub mod throttle;
pub mod transcript;
pub mod watchdog;

pub use accumulator::{SelectionPolicy, SentenceSelectionPolicy};
pub use config::{Configuration, DetectorConfig};
pub use driver::{SessionCommand, run_session};
pub use engine::{
    EngineError, EngineErrorKind, EngineEvent, EngineFactory, EngineMessage, EngineSettings,
    ErrorClass, EventSink, TranscriptionEngine,
};
pub use error::{DetectorError, Result};
pub use events::{EventKind, SessionEvent, Subscription};
pub use grammar::Grammar;
pub use session::{RecognitionSession, SessionState};
pub use similarity::similarity;
pub use throttle::MatchThrottle;
pub use transcript::{Alternative, RawResult, Sentence};
