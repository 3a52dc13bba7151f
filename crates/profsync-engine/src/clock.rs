//! Time source and blocking sleep used for pacing.

use std::cell::{Cell, RefCell};
use std::time::{Duration, Instant};

/// Monotonic time plus a blocking sleep.
///
/// Every suspension in the engine goes through [`Clock::sleep`], so tests can
/// swap in [`ManualClock`] and observe pauses without waiting for them.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

/// The real clock: `Instant::now` and `std::thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// A clock that only moves when told to. Sleeping advances it and is recorded.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    elapsed: Cell<Duration>,
    sleeps: RefCell<Vec<Duration>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Cell::new(Duration::ZERO),
            sleeps: RefCell::new(Vec::new()),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.elapsed.set(self.elapsed.get() + by);
    }

    /// Every duration passed to [`Clock::sleep`], in order.
    #[must_use]
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.borrow().clone()
    }

    /// How many sleeps of exactly `duration` happened.
    #[must_use]
    pub fn sleeps_of(&self, duration: Duration) -> usize {
        self.sleeps.borrow().iter().filter(|d| **d == duration).count()
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed.get()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed.get()
    }

    fn sleep(&self, duration: Duration) {
        self.sleeps.borrow_mut().push(duration);
        self.advance(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances_on_sleep() {
        let clock = ManualClock::new();
        let start = clock.now();
        clock.sleep(Duration::from_secs(5));
        clock.advance(Duration::from_secs(1));
        assert_eq!(clock.now().duration_since(start), Duration::from_secs(6));
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(5)]);
    }

    #[test]
    fn system_clock_zero_sleep_returns_immediately() {
        let clock = SystemClock;
        let before = clock.now();
        clock.sleep(Duration::ZERO);
        assert!(clock.now().duration_since(before) < Duration::from_secs(1));
    }
}
