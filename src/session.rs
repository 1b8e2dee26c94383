//! Recognition session - keeps one engine handle alive while active
//!
//! The session restarts the engine whenever it ends on its own, routes results
//! through the selection policy, and arms the watchdog on every result. All
//! state changes happen on the caller's thread, one message at a time.

use std::fmt;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::accumulator::SentenceSelectionPolicy;
use crate::config::Configuration;
use crate::engine::{
    EngineError, EngineEvent, EngineFactory, EngineMessage, ErrorClass, EventSink,
    TranscriptionEngine,
};
use crate::events::{EventKind, Listeners, SessionEvent, Subscription};
use crate::transcript::{RawResult, Sentence};
use crate::watchdog::Watchdog;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Inactive,
    Active,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Inactive => write!(f, "Inactive"),
            SessionState::Active => write!(f, "Active"),
        }
    }
}

pub struct RecognitionSession {
    config: Configuration,
    factory: Box<dyn EngineFactory>,
    state: SessionState,
    engine: Option<Box<dyn TranscriptionEngine>>,
    /// Generation of the live handle; messages from older handles are dropped
    generation: u64,
    /// Generation aborted by `stop()` whose `aborted` report is still owed
    aborted: Option<u64>,
    policy: Box<dyn SentenceSelectionPolicy>,
    watchdog: Watchdog,
    listeners: Listeners,
    events_tx: flume::Sender<EngineMessage>,
    events_rx: flume::Receiver<EngineMessage>,
}

impl RecognitionSession {
    pub fn new(config: Configuration, factory: impl EngineFactory + 'static) -> Self {
        let policy = config
            .policy()
            .build(config.confidence(), config.same_sentence_tolerance());
        let watchdog = match config.watchdog() {
            Some(interval) => Watchdog::new(interval),
            None => Watchdog::disabled(),
        };
        let (events_tx, events_rx) = flume::unbounded();

        Self {
            config,
            factory: Box::new(factory),
            state: SessionState::Inactive,
            engine: None,
            generation: 0,
            aborted: None,
            policy,
            watchdog,
            listeners: Listeners::new(),
            events_tx,
            events_rx,
        }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn current_sentence(&self) -> &Sentence {
        self.policy.current()
    }

    /// Receiver for engine callbacks, for drivers that wait on it
    pub fn engine_events(&self) -> flume::Receiver<EngineMessage> {
        self.events_rx.clone()
    }

    pub fn on<F>(&mut self, kind: EventKind, handler: F) -> Subscription
    where
        F: FnMut(&SessionEvent) + Send + 'static,
    {
        self.listeners.on(kind, handler)
    }

    pub fn off(&mut self, sub: Subscription) -> bool {
        self.listeners.off(sub)
    }

    pub fn start(&mut self) {
        if self.is_active() {
            return;
        }
        self.state = SessionState::Active;
        info!(lang = %self.config.engine().lang, policy = self.config.policy().name(), "session started");
        self.spawn_engine();
        self.notify(SessionEvent::Start);
    }

    pub fn stop(&mut self) {
        if !self.is_active() {
            return;
        }
        self.state = SessionState::Inactive;
        self.watchdog.cancel();
        if let Some(engine) = self.engine.as_mut() {
            engine.abort();
            self.aborted = Some(self.generation);
        }
        info!("session stopped");
    }

    /// Replace the engine handle wholesale and start it
    fn spawn_engine(&mut self) {
        // The old handle goes before the new one exists
        self.engine = None;
        self.generation += 1;
        let sink = EventSink::new(self.generation, self.events_tx.clone());
        let mut engine = self.factory.create(self.config.engine(), sink);
        engine.start();
        self.engine = Some(engine);
    }

    /// Apply every message already queued, without waiting
    pub fn drain_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(msg) = self.events_rx.try_recv() {
            self.handle(msg);
            handled += 1;
        }
        handled
    }

    pub fn handle(&mut self, msg: EngineMessage) {
        self.handle_at(msg, Instant::now())
    }

    pub fn handle_at(&mut self, msg: EngineMessage, now: Instant) {
        if msg.generation != self.generation {
            // A quick restart replaces the aborted handle before it reports
            if self.aborted == Some(msg.generation) && msg.event.is_aborted() {
                self.aborted = None;
                self.notify(SessionEvent::End);
                return;
            }
            debug!(
                generation = msg.generation,
                current = self.generation,
                "ignoring message from replaced engine"
            );
            return;
        }
        match msg.event {
            EngineEvent::Result(results) => self.on_result(&results, now),
            EngineEvent::Error(err) => self.on_error(err),
            EngineEvent::End => self.on_end(),
        }
    }

    fn on_result(&mut self, results: &[RawResult], now: Instant) {
        if !self.is_active() {
            debug!("ignoring result while inactive");
            return;
        }
        self.watchdog.arm(now);
        let events = self.policy.accept(results, self.config.grammar());
        for event in events {
            self.notify(event);
        }
    }

    fn on_error(&mut self, err: EngineError) {
        match err.kind.class() {
            ErrorClass::TransientNoSignal => debug!("no speech detected"),
            ErrorClass::UserAborted => {
                self.aborted = None;
                self.notify(SessionEvent::End);
            }
            ErrorClass::EngineFailure => {
                warn!(kind = %err.kind, message = %err.message, "engine error");
                self.notify(SessionEvent::Error(err));
            }
        }
    }

    fn on_end(&mut self) {
        if self.is_active() {
            info!(generation = self.generation, "engine ended on its own, restarting");
            self.spawn_engine();
        }
    }

    pub fn watchdog_deadline(&self) -> Option<Instant> {
        self.watchdog.deadline()
    }

    /// Stop a stalled engine once its deadline has passed. Returns true if it fired.
    pub fn check_watchdog(&mut self, now: Instant) -> bool {
        if !self.is_active() {
            self.watchdog.cancel();
            return false;
        }
        if !self.watchdog.poll(now) {
            return false;
        }
        warn!("no result within watchdog interval, stopping engine");
        if let Some(engine) = self.engine.as_mut() {
            engine.stop();
        }
        true
    }

    fn notify(&mut self, event: SessionEvent) {
        self.listeners.notify(&event);
    }
}

impl fmt::Debug for RecognitionSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecognitionSession")
            .field("state", &self.state)
            .field("generation", &self.generation)
            .field("policy", &self.config.policy())
            .field("watchdog", &self.watchdog.deadline())
            .field("listeners", &self.listeners)
            .finish()
    }
}
