//! Stall detection for the transcription channel
//!
//! The engine can go quiet without erroring (lost connection while audio keeps
//! flowing). Every result rearms the deadline; if it passes, the session stops
//! the engine and the auto-restart path takes over.

use std::time::{Duration, Instant};

pub const DEFAULT_WATCHDOG_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct Watchdog {
    interval: Option<Duration>,
    deadline: Option<Instant>,
}

impl Watchdog {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: Some(interval),
            deadline: None,
        }
    }

    /// A watchdog that never arms
    pub fn disabled() -> Self {
        Self {
            interval: None,
            deadline: None,
        }
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    /// Cancel any pending deadline and start a new one from `now`
    pub fn arm(&mut self, now: Instant) {
        self.deadline = self.interval.map(|i| now + i);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns true once when the deadline has passed, and disarms
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
