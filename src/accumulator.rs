//! Sentence selection - turns the engine's result list into session events
//!
//! Two policies exist and they are not interchangeable halves of one design:
//!
//! - [`ConfidenceScan`] picks the most recent entry above the confidence
//!   threshold, latches `matched` once per sentence, and drops a final sentence
//!   that is too similar to the previous final one.
//! - [`WindowedConcatenation`] joins the last two entries, recomputes the
//!   match on every callback and leaves duplicate gating to the throttle.

use serde::Deserialize;
use tracing::debug;

use crate::events::SessionEvent;
use crate::grammar::Grammar;
use crate::similarity::similarity;
use crate::transcript::{RawResult, Sentence};

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionPolicy {
    #[default]
    ConfidenceScan,
    #[serde(alias = "windowed")]
    WindowedConcatenation,
}

impl SelectionPolicy {
    pub fn build(self, confidence: f32, tolerance: f64) -> Box<dyn SentenceSelectionPolicy> {
        match self {
            SelectionPolicy::ConfidenceScan => Box::new(ConfidenceScan::new(confidence, tolerance)),
            SelectionPolicy::WindowedConcatenation => Box::new(WindowedConcatenation::default()),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SelectionPolicy::ConfidenceScan => "confidence-scan",
            SelectionPolicy::WindowedConcatenation => "windowed",
        }
    }
}

impl std::str::FromStr for SelectionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confidence-scan" => Ok(SelectionPolicy::ConfidenceScan),
            "windowed" | "windowed-concatenation" => Ok(SelectionPolicy::WindowedConcatenation),
            other => Err(format!("unknown policy '{}'", other)),
        }
    }
}

pub trait SentenceSelectionPolicy: Send {
    /// Process one result callback, returning the events to emit in order
    fn accept(&mut self, results: &[RawResult], grammar: &Grammar) -> Vec<SessionEvent>;

    /// The working sentence for the turn in progress
    fn current(&self) -> &Sentence;
}

pub struct ConfidenceScan {
    confidence: f32,
    tolerance: f64,
    current: Sentence,
    last: Sentence,
}

impl ConfidenceScan {
    pub fn new(confidence: f32, tolerance: f64) -> Self {
        Self {
            confidence,
            tolerance,
            current: Sentence::default(),
            last: Sentence::default(),
        }
    }

    /// Last accepted final sentence, the dedup baseline
    pub fn last(&self) -> &Sentence {
        &self.last
    }

    fn select<'a>(&self, results: &'a [RawResult]) -> Option<&'a RawResult> {
        if results.len() > 1 {
            results
                .iter()
                .rev()
                .find(|r| r.confidence() >= self.confidence)
        } else {
            results.first()
        }
    }

    fn match_current(&mut self, grammar: &Grammar, events: &mut Vec<SessionEvent>) {
        if !self.current.matched && grammar.test(&self.current.value) {
            self.current.matched = true;
            events.push(SessionEvent::Match(self.current.clone()));
        }
    }
}

impl SentenceSelectionPolicy for ConfidenceScan {
    fn accept(&mut self, results: &[RawResult], grammar: &Grammar) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if results.is_empty() {
            return events;
        }

        // Nothing confident enough: keep the previous value, still interim
        let (value, is_final) = match self.select(results) {
            Some(result) => (result.transcript().trim().to_string(), result.is_final),
            None => (self.current.value.clone(), false),
        };

        // A repeated final leaves the working sentence and its latch alone
        if is_final {
            let ratio = similarity(&self.last.value, &value);
            if ratio > self.tolerance {
                debug!(value = %value, ratio, "dropping repeated sentence");
                return events;
            }
        }

        self.current.value = value;
        self.current.is_final = is_final;
        self.match_current(grammar, &mut events);
        events.push(SessionEvent::Sentence(self.current.clone()));

        if is_final {
            self.last = std::mem::take(&mut self.current);
        }
        events
    }

    fn current(&self) -> &Sentence {
        &self.current
    }
}

#[derive(Default)]
pub struct WindowedConcatenation {
    current: Sentence,
}

impl WindowedConcatenation {
    fn working_value(results: &[RawResult]) -> Option<(String, bool)> {
        let last = results.last()?;
        let tail = last.transcript().trim();
        let value = match results.len().checked_sub(2).map(|i| results[i].transcript().trim()) {
            Some(prev) if !prev.is_empty() => format!("{} {}", prev, tail),
            _ => tail.to_string(),
        };
        Some((value.trim().to_string(), last.is_final))
    }
}

impl SentenceSelectionPolicy for WindowedConcatenation {
    fn accept(&mut self, results: &[RawResult], grammar: &Grammar) -> Vec<SessionEvent> {
        let Some((value, is_final)) = Self::working_value(results) else {
            return Vec::new();
        };

        let matched = grammar.test(&value);
        let sentence = Sentence::new(value, matched, is_final);

        self.current = if is_final {
            Sentence::default()
        } else {
            sentence.clone()
        };

        let mut events = vec![SessionEvent::Sentence(sentence.clone())];
        if matched {
            events.push(SessionEvent::Match(sentence));
        }
        events
    }

    fn current(&self) -> &Sentence {
        &self.current
    }
}
