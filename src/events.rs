//! Session notifications and listener registry

use crate::engine::EngineError;
use crate::transcript::Sentence;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Start,
    End,
    Error,
    Sentence,
    Match,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    Start,
    End,
    Error(EngineError),
    Sentence(Sentence),
    Match(Sentence),
}

impl SessionEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            SessionEvent::Start => EventKind::Start,
            SessionEvent::End => EventKind::End,
            SessionEvent::Error(_) => EventKind::Error,
            SessionEvent::Sentence(_) => EventKind::Sentence,
            SessionEvent::Match(_) => EventKind::Match,
        }
    }

    pub fn sentence(&self) -> Option<&Sentence> {
        match self {
            SessionEvent::Sentence(s) | SessionEvent::Match(s) => Some(s),
            _ => None,
        }
    }
}

/// Handle returned by [`Listeners::on`], used to unregister
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

type Handler = Box<dyn FnMut(&SessionEvent) + Send>;

/// Handlers run in registration order
#[derive(Default)]
pub struct Listeners {
    next_id: u64,
    handlers: Vec<(Subscription, EventKind, Handler)>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(&mut self, kind: EventKind, handler: F) -> Subscription
    where
        F: FnMut(&SessionEvent) + Send + 'static,
    {
        let sub = Subscription(self.next_id);
        self.next_id += 1;
        self.handlers.push((sub, kind, Box::new(handler)));
        sub
    }

    /// Returns false if the subscription was already removed
    pub fn off(&mut self, sub: Subscription) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(s, _, _)| *s != sub);
        self.handlers.len() != before
    }

    pub fn notify(&mut self, event: &SessionEvent) {
        let kind = event.kind();
        for (_, k, handler) in self.handlers.iter_mut() {
            if *k == kind {
                handler(event);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_dispatch_by_kind_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut listeners = Listeners::new();

        let s = seen.clone();
        listeners.on(EventKind::Start, move |_| s.lock().unwrap().push("first"));
        let s = seen.clone();
        listeners.on(EventKind::End, move |_| s.lock().unwrap().push("end"));
        let s = seen.clone();
        listeners.on(EventKind::Start, move |_| s.lock().unwrap().push("second"));

        listeners.notify(&SessionEvent::Start);
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_off() {
        let count = Arc::new(Mutex::new(0));
        let mut listeners = Listeners::new();
        let c = count.clone();
        let sub = listeners.on(EventKind::Match, move |_| *c.lock().unwrap() += 1);

        let event = SessionEvent::Match(Sentence::new("salut", true, true));
        listeners.notify(&event);
        assert!(listeners.off(sub));
        assert!(!listeners.off(sub));
        listeners.notify(&event);

        assert_eq!(*count.lock().unwrap(), 1);
        assert!(listeners.is_empty());
    }

    #[test]
    fn test_sentence_payload() {
        let sentence = Sentence::new("bonjour", true, false);
        assert_eq!(
            SessionEvent::Match(sentence.clone()).sentence(),
            Some(&sentence)
        );
        assert_eq!(SessionEvent::End.sentence(), None);
    }
}
