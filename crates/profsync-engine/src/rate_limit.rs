//! Preventive per-minute quota for store operations.
//!
//! The limiter never looks at responses. Before each operation the caller
//! records it; once the sliding one-minute window holds `quota` operations
//! the caller is blocked for the configured pause and the window is cleared.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use profsync_core::SyncConfig;

use crate::clock::Clock;

/// Length of the sliding window.
pub const WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct RateLimiter {
    window: VecDeque<Instant>,
    quota: usize,
    pause: Duration,
}

impl RateLimiter {
    /// `quota` is clamped to at least 1.
    #[must_use]
    pub fn new(quota: usize, pause: Duration) -> Self {
        Self {
            window: VecDeque::new(),
            quota: quota.max(1),
            pause,
        }
    }

    #[must_use]
    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(
            config.effective_quota(),
            Duration::from_secs(config.rate_pause_secs),
        )
    }

    /// Records one operation at `clock.now()`, pausing first if the window is full.
    ///
    /// Returns `true` when a pause was taken.
    pub fn record_and_check(&mut self, clock: &dyn Clock) -> bool {
        let now = clock.now();
        while self
            .window
            .front()
            .is_some_and(|t| now.duration_since(*t) >= WINDOW)
        {
            self.window.pop_front();
        }
        self.window.push_back(now);

        if self.window.len() < self.quota {
            return false;
        }

        tracing::warn!(
            operations = self.window.len(),
            quota = self.quota,
            pause_secs = self.pause.as_secs(),
            "store quota reached, pausing"
        );
        clock.sleep(self.pause);
        self.window.clear();
        true
    }

    /// Operations currently inside the window.
    #[must_use]
    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    #[must_use]
    pub fn quota(&self) -> usize {
        self.quota
    }
}
