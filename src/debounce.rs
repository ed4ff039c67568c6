use std::time::{Duration, Instant};

/// Resettable delayed value: each `schedule` pushes the deadline forward.
///
/// Time is supplied by the caller, which keeps the host's event loop in
/// charge of when due work actually runs.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replaces any pending value and restarts the timer from `now`.
    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((now + self.delay, value));
    }

    /// Like [`schedule`](Self::schedule) with a one-off delay.
    pub fn schedule_after(&mut self, value: T, now: Instant, delay: Duration) {
        self.pending = Some((now + delay, value));
    }

    /// Drops the pending value. Returns whether there was one.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(deadline, _)| *deadline)
    }

    pub fn peek(&self) -> Option<&T> {
        self.pending.as_ref().map(|(_, value)| value)
    }

    /// Takes the pending value if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((deadline, _)) if *deadline <= now => self.pending.take().map(|(_, v)| v),
            _ => None,
        }
    }

    /// Takes the pending value regardless of its deadline.
    pub fn flush_now(&mut self) -> Option<T> {
        self.pending.take().map(|(_, value)| value)
    }
}
