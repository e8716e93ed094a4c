//! Worker-owned retry backoff.
//!
//! One interval for the whole worker loop, not per unit: every consecutive
//! failure grows it by a fixed increment, the first success resets it to the
//! configured floor. The value is only ever touched by the delivery worker
//! task, which keeps it single-writer by ownership rather than locking.

use std::time::Duration;

/// Linear, unbounded backoff state.
#[derive(Debug, Clone)]
pub struct Backoff {
    current: Duration,
    increment: Duration,
    floor: Duration,
}

impl Backoff {
    /// Creates backoff state starting at `floor`.
    pub fn new(increment: Duration, floor: Duration) -> Self {
        Self { current: floor, increment, floor }
    }

    /// Current wait interval applied before the next dequeue.
    pub fn current(&self) -> Duration {
        self.current
    }

    /// Grows the interval after a failed delivery. There is no ceiling;
    /// retries are unbounded and so is the wait they accumulate.
    pub fn grow(&mut self) {
        self.current = self.current.saturating_add(self.increment);
    }

    /// Resets the interval after a successful delivery.
    pub fn reset(&mut self) {
        self.current = self.floor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grows_strictly_per_failure() {
        let mut backoff = Backoff::new(Duration::from_secs(3), Duration::ZERO);
        let mut previous = backoff.current();
        for attempt in 1..=5 {
            backoff.grow();
            assert!(
                backoff.current() > previous,
                "interval must grow on failure {attempt}"
            );
            assert_eq!(backoff.current(), Duration::from_secs(3 * attempt));
            previous = backoff.current();
        }
    }

    #[test]
    fn resets_to_floor_on_success() {
        let floor = Duration::from_millis(250);
        let mut backoff = Backoff::new(Duration::from_secs(3), floor);
        backoff.grow();
        backoff.grow();
        backoff.reset();
        assert_eq!(backoff.current(), floor);
    }

    #[test]
    fn default_floor_is_zero() {
        let mut backoff = Backoff::new(Duration::from_secs(1), Duration::ZERO);
        assert_eq!(backoff.current(), Duration::ZERO);
        backoff.grow();
        backoff.reset();
        assert_eq!(backoff.current(), Duration::ZERO);
    }
}
