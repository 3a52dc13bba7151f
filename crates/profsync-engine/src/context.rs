//! Per-run guard around every store operation.
//!
//! A [`RunContext`] is built once per run and threaded through the exporter
//! and the target queue. Each operation is recorded with the rate limiter
//! first; a throttled operation is retried exactly once after the configured
//! backoff; a successful write is followed by the inter-request delay.

use std::time::Duration;

use profsync_core::SyncConfig;

use crate::clock::Clock;
use crate::error::StoreError;
use crate::rate_limit::RateLimiter;

pub struct RunContext<'c> {
    limiter: RateLimiter,
    request_delay: Duration,
    throttle_backoff: Duration,
    clock: &'c dyn Clock,
}

impl std::fmt::Debug for RunContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunContext")
            .field("limiter", &self.limiter)
            .field("request_delay", &self.request_delay)
            .field("throttle_backoff", &self.throttle_backoff)
            .finish_non_exhaustive()
    }
}

impl<'c> RunContext<'c> {
    #[must_use]
    pub fn new(config: &SyncConfig, clock: &'c dyn Clock) -> Self {
        Self {
            limiter: RateLimiter::from_config(config),
            request_delay: Duration::from_millis(config.request_delay_ms),
            throttle_backoff: Duration::from_secs(config.throttle_backoff_secs),
            clock,
        }
    }

    #[must_use]
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Runs a read. No pacing delay follows it.
    ///
    /// # Errors
    ///
    /// The operation's error, after at most one throttle retry.
    pub fn read<T>(
        &mut self,
        operation: impl FnMut() -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        self.guarded(operation)
    }

    /// Runs a write, then sleeps the inter-request delay if it succeeded.
    ///
    /// # Errors
    ///
    /// The operation's error, after at most one throttle retry.
    pub fn write<T>(
        &mut self,
        operation: impl FnMut() -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let value = self.guarded(operation)?;
        self.clock.sleep(self.request_delay);
        Ok(value)
    }

    fn guarded<T>(
        &mut self,
        mut operation: impl FnMut() -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        self.limiter.record_and_check(self.clock);
        match operation() {
            Ok(value) => Ok(value),
            Err(err) if err.is_retriable() => {
                tracing::warn!(
                    error = %err,
                    backoff_secs = self.throttle_backoff.as_secs(),
                    "store throttled, retrying once after backoff"
                );
                self.clock.sleep(self.throttle_backoff);
                self.limiter.record_and_check(self.clock);
                operation()
            }
            Err(err) => Err(err),
        }
    }
}
