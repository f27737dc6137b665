//! Retry logic.
//!
//! # Responsibilities
//! - Bound the number of additional attempts
//! - Supply the backoff delay before each retry
//!
//! # Design Decisions
//! - Only transient faults are retried; the executor makes that call
//! - Jittered backoff prevents thundering herd
//! - Waits use the Tokio timer and never block a thread

use std::sync::Arc;
use std::time::Duration;

use crate::config::schema::RetryConfig;
use crate::resilience::backoff::{Backoff, ExponentialBackoff};

/// Retry budget and backoff schedule.
#[derive(Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Arc<dyn Backoff>,
}

impl RetryPolicy {
    /// `max_attempts` counts retries beyond the first attempt.
    pub fn new(max_attempts: u32, backoff: impl Backoff + 'static) -> Self {
        Self {
            max_attempts,
            backoff: Arc::new(backoff),
        }
    }

    /// Never retry.
    pub fn none() -> Self {
        Self::new(0, ExponentialBackoff::default())
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        let backoff = ExponentialBackoff {
            base: Duration::from_millis(config.base_delay_ms),
            max: Duration::from_millis(config.max_delay_ms),
            jitter: config.jitter,
        };
        Self::new(config.max_attempts, backoff)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Upper bound on invocations per execution.
    pub fn total_attempts(&self) -> u32 {
        self.max_attempts.saturating_add(1)
    }

    /// Delay before retry number `retry` (1-based), or `None` once the
    /// budget is spent.
    pub fn delay_before(&self, retry: u32) -> Option<Duration> {
        if retry == 0 || retry > self.max_attempts {
            return None;
        }
        Some(self.backoff.delay(retry))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl std::fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}
