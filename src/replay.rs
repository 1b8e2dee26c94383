//! Replay engine - feeds text lines to a session as if they were recognized
//!
//! Line format:
//! - `hello there` a final result at full confidence
//! - `~hello the` an interim result (skipped unless interim results are on)
//! - `[{"alternatives":[{"transcript":"hi","confidence":0.4}],"is_final":false}]`
//!   a full JSON result list, sent as is
//! - `!network connection lost` an engine error with code and message
//!
//! Results accumulate for the current turn the way a continuous recognizer
//! does: an interim entry is replaced by the next line, a final one stays.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::thread;
use std::time::Duration;

use flume::{Receiver, RecvTimeoutError};
use tracing::{debug, warn};

use crate::engine::{
    EngineErrorKind, EngineFactory, EngineSettings, EventSink, TranscriptionEngine,
};
use crate::transcript::RawResult;

const RUNNING: u8 = 0;
const STOPPING: u8 = 1;
const ABORTING: u8 = 2;
const DROPPED: u8 = 3;

/// A parsed input line
#[derive(Debug, Clone, PartialEq)]
pub enum ReplayLine {
    Interim(String),
    Final(String),
    Results(Vec<RawResult>),
    Error { code: String, message: String },
}

impl ReplayLine {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        if let Some(rest) = line.strip_prefix('!') {
            let (code, message) = rest.split_once(' ').unwrap_or((rest, ""));
            return Some(ReplayLine::Error {
                code: code.to_string(),
                message: message.trim().to_string(),
            });
        }
        if let Some(rest) = line.strip_prefix('~') {
            return Some(ReplayLine::Interim(rest.trim().to_string()));
        }
        if line.starts_with('[') {
            match serde_json::from_str::<Vec<RawResult>>(line) {
                Ok(results) => return Some(ReplayLine::Results(results)),
                Err(e) => warn!("not a result list, treating as text: {}", e),
            }
        }
        Some(ReplayLine::Final(line.to_string()))
    }
}

/// Creates [`ReplayEngine`] handles that all read from one line source
pub struct ReplayFactory {
    lines: Receiver<String>,
}

impl ReplayFactory {
    pub fn new(lines: Receiver<String>) -> Self {
        Self { lines }
    }
}

impl EngineFactory for ReplayFactory {
    fn create(
        &mut self,
        settings: &EngineSettings,
        sink: EventSink,
    ) -> Box<dyn TranscriptionEngine> {
        debug!(lang = %settings.lang, generation = sink.generation(), "creating replay engine");
        Box::new(ReplayEngine::new(
            self.lines.clone(),
            settings.clone(),
            sink,
        ))
    }
}

pub struct ReplayEngine {
    lines: Receiver<String>,
    settings: EngineSettings,
    sink: EventSink,
    control: Arc<AtomicU8>,
    handle: Option<thread::JoinHandle<()>>,
}

impl ReplayEngine {
    pub fn new(lines: Receiver<String>, settings: EngineSettings, sink: EventSink) -> Self {
        Self {
            lines,
            settings,
            sink,
            control: Arc::new(AtomicU8::new(RUNNING)),
            handle: None,
        }
    }
}

impl TranscriptionEngine for ReplayEngine {
    fn start(&mut self) {
        if self.handle.is_some() {
            return;
        }
        self.control.store(RUNNING, Ordering::SeqCst);
        let lines = self.lines.clone();
        let settings = self.settings.clone();
        let sink = self.sink.clone();
        let control = self.control.clone();
        self.handle = Some(thread::spawn(move || {
            run_replay(lines, settings, sink, control)
        }));
    }

    fn stop(&mut self) {
        let _ = self
            .control
            .compare_exchange(RUNNING, STOPPING, Ordering::SeqCst, Ordering::SeqCst);
    }

    fn abort(&mut self) {
        let _ = self
            .control
            .compare_exchange(RUNNING, ABORTING, Ordering::SeqCst, Ordering::SeqCst);
    }
}

impl Drop for ReplayEngine {
    fn drop(&mut self) {
        // A replaced handle exits without reporting
        let _ = self
            .control
            .compare_exchange(RUNNING, DROPPED, Ordering::SeqCst, Ordering::SeqCst);
        // The reader notices within one poll interval
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!(generation = self.sink.generation(), "replay thread panicked");
            }
        }
    }
}

fn run_replay(
    lines: Receiver<String>,
    settings: EngineSettings,
    sink: EventSink,
    control: Arc<AtomicU8>,
) {
    let mut results: Vec<RawResult> = Vec::new();

    while control.load(Ordering::SeqCst) == RUNNING {
        let line = match lines.recv_timeout(Duration::from_millis(100)) {
            Ok(line) => line,
            Err(RecvTimeoutError::Timeout) => continue,
            // Input closed; the host decides what happens next
            Err(RecvTimeoutError::Disconnected) => return,
        };
        let Some(parsed) = ReplayLine::parse(&line) else {
            continue;
        };

        let ended_turn = match parsed {
            ReplayLine::Error { code, message } => {
                sink.error(EngineErrorKind::from_code(&code), message);
                continue;
            }
            ReplayLine::Interim(text) => {
                if !settings.interim_results {
                    continue;
                }
                push_entry(&mut results, RawResult::interim(text, 1.0));
                false
            }
            ReplayLine::Final(text) => {
                push_entry(&mut results, RawResult::finalized(text, 1.0));
                true
            }
            ReplayLine::Results(list) => {
                results = list
                    .into_iter()
                    .map(|mut r| {
                        r.alternatives.truncate(settings.max_alternatives as usize);
                        r
                    })
                    .collect();
                results.last().map(|r| r.is_final).unwrap_or(false)
            }
        };

        if !sink.result(results.clone()) {
            return;
        }
        if ended_turn && !settings.continuous {
            break;
        }
    }

    match control.load(Ordering::SeqCst) {
        DROPPED => {}
        ABORTING => {
            sink.error(EngineErrorKind::Aborted, "aborted");
            sink.end();
        }
        _ => {
            sink.end();
        }
    }
}

/// Replace a trailing interim entry, otherwise append
fn push_entry(results: &mut Vec<RawResult>, entry: RawResult) {
    if results.last().is_some_and(|r| !r.is_final) {
        results.pop();
    }
    results.push(entry);
}
