use std::time::{Duration, Instant};

/// Fixed-period deadline timer, ticked from the UI loop.
///
/// Views own their cadences, so dropping a view stops its timer with it.
#[derive(Debug, Clone)]
pub struct Cadence {
    interval: Duration,
    next: Instant,
}

impl Cadence {
    /// First deadline is one interval after `now`
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next: now + interval,
        }
    }

    /// True once per elapsed deadline. Missed periods are not replayed.
    pub fn due(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        self.next = now + self.interval;
        true
    }
}
