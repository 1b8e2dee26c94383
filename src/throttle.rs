//! Cooldown gate between `match` notifications and the application callback

use std::time::{Duration, Instant};

use tracing::debug;

use crate::transcript::Sentence;

pub struct MatchThrottle<F> {
    cooldown: Duration,
    last_accepted: Option<Instant>,
    accepted: u64,
    on_match: F,
}

impl<F> MatchThrottle<F>
where
    F: FnMut(&str, bool),
{
    /// `on_match` receives the sentence value and its finality flag
    pub fn new(cooldown: Duration, on_match: F) -> Self {
        Self {
            cooldown,
            last_accepted: None,
            accepted: 0,
            on_match,
        }
    }

    pub fn offer(&mut self, sentence: &Sentence) -> bool {
        self.offer_at(sentence, Instant::now())
    }

    /// Deliver `sentence` unless the previous delivery is within the cooldown
    pub fn offer_at(&mut self, sentence: &Sentence, now: Instant) -> bool {
        if let Some(last) = self.last_accepted {
            let elapsed = now.saturating_duration_since(last);
            if elapsed < self.cooldown {
                debug!(
                    value = %sentence.value,
                    remaining_ms = (self.cooldown - elapsed).as_millis() as u64,
                    "match throttled"
                );
                return false;
            }
        }
        self.last_accepted = Some(now);
        self.accepted += 1;
        (self.on_match)(&sentence.value, sentence.is_final);
        true
    }

    /// Number of deliveries so far
    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cooldown_window() {
        let mut delivered = Vec::new();
        let t0 = Instant::now();
        {
            let mut throttle = MatchThrottle::new(Duration::from_secs(10), |value: &str, _: bool| {
                delivered.push(value.to_string())
            });
            let s = |v: &str| Sentence::new(v, true, true);
            assert!(throttle.offer_at(&s("t0"), t0));
            assert!(!throttle.offer_at(&s("t5"), t0 + Duration::from_secs(5)));
            assert!(throttle.offer_at(&s("t12"), t0 + Duration::from_secs(12)));
            assert_eq!(throttle.accepted(), 2);
        }
        assert_eq!(delivered, vec!["t0", "t12"]);
    }

    #[test]
    fn test_boundary_is_accepted() {
        let t0 = Instant::now();
        let mut throttle = MatchThrottle::new(Duration::from_secs(10), |_: &str, _: bool| {});
        let s = Sentence::new("salut", true, false);
        assert!(throttle.offer_at(&s, t0));
        assert!(throttle.offer_at(&s, t0 + Duration::from_secs(10)));
    }

    #[test]
    fn test_discarded_offer_does_not_extend_window() {
        let t0 = Instant::now();
        let mut throttle = MatchThrottle::new(Duration::from_secs(10), |_: &str, _: bool| {});
        let s = Sentence::new("salut", true, false);
        assert!(throttle.offer_at(&s, t0));
        assert!(!throttle.offer_at(&s, t0 + Duration::from_secs(9)));
        assert!(throttle.offer_at(&s, t0 + Duration::from_secs(10)));
    }

    #[test]
    fn test_passes_finality() {
        let mut finals = Vec::new();
        {
            let mut throttle =
                MatchThrottle::new(Duration::ZERO, |_: &str, is_final: bool| finals.push(is_final));
            throttle.offer(&Sentence::new("bonjour", true, false));
            throttle.offer(&Sentence::new("bonjour toi", true, true));
        }
        assert_eq!(finals, vec![false, true]);
    }
}
