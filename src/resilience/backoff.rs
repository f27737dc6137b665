//! Exponential backoff with jitter.

use std::time::Duration;
use rand::Rng;

/// Calculate exponential backoff delay with jitter.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    let capped_delay = exponential_delay_ms(attempt, base_ms, max_ms);

    // Apply jitter (0 to 10% of the delay)
    let jitter_range = capped_delay / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay + jitter)
}

fn exponential_delay_ms(attempt: u32, base_ms: u64, max_ms: u64) -> u64 {
    let exponential_base = 2u64.saturating_pow(attempt.saturating_sub(1));
    base_ms.saturating_mul(exponential_base).min(max_ms)
}

/// Delay schedule between retry attempts.
///
/// `retry` is 1 for the wait before the first retry. Implementations must be
/// monotonically non-decreasing in `retry` (jitter aside).
pub trait Backoff: Send + Sync {
    fn delay(&self, retry: u32) -> Duration;
}

/// Doubling delay from `base`, capped at `max`.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    pub base: Duration,
    pub max: Duration,
    /// Add up to 10% random jitter to spread out concurrent callers.
    pub jitter: bool,
}

impl ExponentialBackoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self { base, max, jitter: true }
    }

    /// Disable jitter for a deterministic schedule.
    pub fn without_jitter(mut self) -> Self {
        self.jitter = false;
        self
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::new(Duration::from_millis(128), Duration::from_secs(30))
    }
}

impl Backoff for ExponentialBackoff {
    fn delay(&self, retry: u32) -> Duration {
        let base_ms = self.base.as_millis() as u64;
        let max_ms = self.max.as_millis() as u64;

        if self.jitter {
            calculate_backoff(retry, base_ms, max_ms)
        } else if retry == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(exponential_delay_ms(retry, base_ms, max_ms))
        }
    }
}
