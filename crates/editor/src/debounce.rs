//! Restartable debounce timer.
//!
//! A cancellable deadline over caller-supplied [`Instant`]s: each `start`
//! pushes the deadline out by the full window, so a continuous stream of
//! events postpones firing until input genuinely pauses. No scheduler is
//! involved; the owner polls [`fire_if_due`](DebounceTimer::fire_if_due)
//! from its own loop, which keeps batcher and queue logic testable without
//! wall-clock waits.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct DebounceTimer {
    window: Duration,
    deadline: Option<Instant>,
}

impl DebounceTimer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    /// Arm the timer, or push an armed timer's deadline out to
    /// `now + window`.
    pub fn start(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    /// Disarm without firing.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// The pending deadline, if armed. Lets an async driver sleep until
    /// exactly the right moment instead of busy-polling.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fire when the deadline has passed. Firing disarms the timer.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(300);

    #[test]
    fn fires_only_after_the_window_elapses() {
        let t0 = Instant::now();
        let mut timer = DebounceTimer::new(WINDOW);
        timer.start(t0);

        assert!(!timer.fire_if_due(t0 + Duration::from_millis(299)));
        assert!(timer.fire_if_due(t0 + WINDOW));
        // Firing disarms.
        assert!(!timer.fire_if_due(t0 + Duration::from_secs(10)));
    }

    #[test]
    fn restart_postpones_the_deadline() {
        let t0 = Instant::now();
        let mut timer = DebounceTimer::new(WINDOW);
        timer.start(t0);
        timer.start(t0 + Duration::from_millis(200));

        assert!(!timer.fire_if_due(t0 + Duration::from_millis(400)));
        assert!(timer.fire_if_due(t0 + Duration::from_millis(500)));
    }

    #[test]
    fn cancel_disarms() {
        let t0 = Instant::now();
        let mut timer = DebounceTimer::new(WINDOW);
        timer.start(t0);
        timer.cancel();
        assert!(!timer.is_armed());
        assert!(!timer.fire_if_due(t0 + Duration::from_secs(1)));
    }

    #[test]
    fn unarmed_timer_never_fires() {
        let mut timer = DebounceTimer::new(WINDOW);
        assert!(!timer.fire_if_due(Instant::now()));
    }
}
