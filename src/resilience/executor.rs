//! Retry + circuit breaker composition.
//!
//! # Data Flow
//! ```text
//! execute(operation)
//!     → retry loop (attempt, classify, back off)
//!         → circuit_breaker.call (admit or fail fast)
//!             → operation()
//! ```
//!
//! # Design Decisions
//! - Retry outside, breaker inside: every attempt is admitted individually
//! - A breaker rejection ends the loop at once (it is never transient)
//! - No backoff sleep when the breaker would still be open afterwards
//! - The caller sees only the most recent error

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::config::loader::ConfigError;
use crate::config::schema::ResilienceConfig;
use crate::config::validation::validate_config;
use crate::observability::metrics;
use crate::resilience::circuit_breaker::CircuitBreaker;
use crate::resilience::error::{AttemptError, ExecuteError};
use crate::resilience::fault::{FaultClassifier, TransientHttpFaults};
use crate::resilience::retries::RetryPolicy;

/// Runs fallible async operations with retry and a shared circuit breaker.
///
/// Create one per protected dependency and reuse it; the breaker state
/// persists across `execute` calls.
#[derive(Debug)]
pub struct ResilientExecutor<C = TransientHttpFaults> {
    name: String,
    retry: RetryPolicy,
    breaker: Arc<CircuitBreaker>,
    classifier: C,
}

impl ResilientExecutor<TransientHttpFaults> {
    /// Build from validated configuration with the HTTP fault policy.
    pub fn from_config(config: &ResilienceConfig) -> Result<Self, ConfigError> {
        Self::with_classifier(config, TransientHttpFaults)
    }
}

impl<C> ResilientExecutor<C> {
    pub fn with_classifier(config: &ResilienceConfig, classifier: C) -> Result<Self, ConfigError> {
        validate_config(config).map_err(ConfigError::Validation)?;

        let breaker = CircuitBreaker::new(
            config.name.clone(),
            config.circuit_breaker.consecutive_threshold,
            Duration::from_millis(config.circuit_breaker.half_open_after_ms),
        );

        tracing::debug!(
            executor = %config.name,
            retry_count = config.retry.max_attempts,
            threshold = config.circuit_breaker.consecutive_threshold,
            half_open_after_ms = config.circuit_breaker.half_open_after_ms,
            "Resilient executor created"
        );

        Ok(Self::from_parts(
            config.name.clone(),
            RetryPolicy::from_config(&config.retry),
            Arc::new(breaker),
            classifier,
        ))
    }

    /// Assemble from an existing breaker, e.g. one shared with other code
    /// that guards the same dependency.
    pub fn from_parts(
        name: impl Into<String>,
        retry: RetryPolicy,
        breaker: Arc<CircuitBreaker>,
        classifier: C,
    ) -> Self {
        Self {
            name: name.into(),
            retry,
            breaker,
            classifier,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Run `operation`, retrying transient faults while the breaker admits
    /// attempts.
    ///
    /// Invokes `operation` at most `retry_count + 1` times. Dropping the
    /// returned future abandons the current attempt or backoff wait.
    pub async fn execute<F, Fut, T, E>(&self, mut operation: F) -> Result<T, ExecuteError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        C: FaultClassifier<E>,
    {
        let mut attempt: u32 = 0;

        loop {
            attempt = attempt.saturating_add(1);

            let err = match self.breaker.call(&mut operation, &self.classifier).await {
                Ok(value) => {
                    metrics::record_attempt(&self.name, "success");
                    return Ok(value);
                }
                Err(err) => err,
            };

            let delay = match &err {
                AttemptError::CircuitOpen(open) => {
                    metrics::record_attempt(&self.name, "rejected");
                    tracing::debug!(
                        executor = %self.name,
                        attempt,
                        retry_after = ?open.retry_after,
                        "Attempt blocked by open circuit"
                    );
                    None
                }
                AttemptError::Fault { transient: false, .. } => {
                    metrics::record_attempt(&self.name, "permanent_failure");
                    None
                }
                AttemptError::Fault { transient: true, .. } => {
                    metrics::record_attempt(&self.name, "transient_failure");
                    self.retry.delay_before(attempt)
                }
            };

            let Some(delay) = delay else {
                if err.is_transient() {
                    tracing::warn!(executor = %self.name, attempts = attempt, "Retries exhausted");
                }
                return Err(err.into());
            };

            // The breaker may have opened on this failure; don't sleep just
            // to be rejected.
            if let Some(open) = self.breaker.blocked_for(delay) {
                metrics::record_attempt(&self.name, "rejected");
                tracing::debug!(
                    executor = %self.name,
                    attempt,
                    retry_after = ?open.retry_after,
                    "Circuit open, skipping backoff"
                );
                return Err(ExecuteError::CircuitOpen(open));
            }

            tracing::info!(executor = %self.name, attempt, delay = ?delay, "Retrying operation");
            metrics::record_retry(&self.name);
            tokio::time::sleep(delay).await;
        }
    }
}
