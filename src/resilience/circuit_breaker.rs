//! Circuit breaker for dependency protection.
//!
//! # States
//! - Closed: normal operation, calls pass through
//! - Open: dependency assumed down, calls fail fast
//! - Half-Open: a single probe tests whether the dependency recovered
//!
//! # State Transitions
//! ```text
//! Closed → Open: consecutive transient failures == threshold
//! Open → Half-Open: first call after the cool-down (admitted as the probe)
//! Half-Open → Closed: probe succeeds
//! Half-Open → Open: probe fails (cool-down restarts)
//! ```
//!
//! # Design Decisions
//! - One breaker per protected dependency (not global)
//! - Fail fast in Open state (the operation is never invoked)
//! - Single probe in Half-Open (prevents hammering a recovering dependency)
//! - Non-transient failures are invisible while Closed
//! - State lives behind one mutex that is never held across an await

use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

use crate::observability::metrics;
use crate::resilience::error::{AttemptError, CircuitOpenError};
use crate::resilience::fault::FaultClassifier;

/// Externally visible breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        }
    }
}

/// Point-in-time view of a breaker.
#[derive(Debug, Clone, Serialize)]
pub struct BreakerSnapshot {
    pub name: String,
    pub state: CircuitState,
    pub consecutive_failures: u32,
    pub failure_threshold: u32,
    pub half_open_after_ms: u64,
    /// Time left before an open breaker admits a probe.
    pub cool_down_remaining_ms: Option<u64>,
}

#[derive(Debug)]
struct BreakerState {
    status: CircuitState,
    consecutive_failures: u32,
    opened_at: Instant,
    /// Bumped every time the breaker opens.
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Admission {
    Closed,
    Probe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Success,
    TransientFailure,
    PermanentFailure,
}

/// Permission to invoke the operation once.
///
/// Dropping an unsettled probe permit hands the probe slot back.
struct Permit<'a> {
    breaker: &'a CircuitBreaker,
    admission: Admission,
    generation: u64,
    settled: bool,
}

impl Permit<'_> {
    fn settle(mut self, outcome: Outcome) {
        self.settled = true;
        self.breaker.on_outcome(self.admission, self.generation, outcome);
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        if !self.settled && self.admission == Admission::Probe {
            self.breaker.abandon_probe();
        }
    }
}

/// Consecutive-failure circuit breaker.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    failure_threshold: u32,
    half_open_after: Duration,
    state: Mutex<BreakerState>,
}

impl CircuitBreaker {
    /// Create a closed breaker. A zero threshold is treated as 1.
    pub fn new(name: impl Into<String>, failure_threshold: u32, half_open_after: Duration) -> Self {
        Self {
            name: name.into(),
            failure_threshold: failure_threshold.max(1),
            half_open_after,
            state: Mutex::new(BreakerState {
                status: CircuitState::Closed,
                consecutive_failures: 0,
                opened_at: Instant::now(),
                generation: 0,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn failure_threshold(&self) -> u32 {
        self.failure_threshold
    }

    pub fn half_open_after(&self) -> Duration {
        self.half_open_after
    }

    /// Current state. An elapsed cool-down is reported as Open until a call
    /// arrives to become the probe.
    pub fn state(&self) -> CircuitState {
        self.lock().status
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.lock().consecutive_failures
    }

    pub fn snapshot(&self) -> BreakerSnapshot {
        let state = self.lock();
        let cool_down_remaining_ms = (state.status == CircuitState::Open).then(|| {
            self.half_open_after
                .saturating_sub(state.opened_at.elapsed())
                .as_millis() as u64
        });

        BreakerSnapshot {
            name: self.name.clone(),
            state: state.status,
            consecutive_failures: state.consecutive_failures,
            failure_threshold: self.failure_threshold,
            half_open_after_ms: self.half_open_after.as_millis() as u64,
            cool_down_remaining_ms,
        }
    }

    /// Invoke `operation` once if the breaker admits it.
    ///
    /// The failure is classified exactly once; the answer is both counted
    /// here and returned in [`AttemptError::Fault`] for the caller's retry
    /// decision.
    pub async fn call<F, Fut, T, E, C>(&self, operation: F, classifier: &C) -> Result<T, AttemptError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        C: FaultClassifier<E> + ?Sized,
    {
        let permit = self.acquire().map_err(AttemptError::CircuitOpen)?;

        match operation().await {
            Ok(value) => {
                permit.settle(Outcome::Success);
                Ok(value)
            }
            Err(error) => {
                let transient = classifier.is_transient(&error);
                permit.settle(if transient {
                    Outcome::TransientFailure
                } else {
                    Outcome::PermanentFailure
                });
                Err(AttemptError::Fault { error, transient })
            }
        }
    }

    /// Admission check. Open → Half-Open and probe admission are one step
    /// under the lock, so concurrent callers cannot both become the probe.
    fn acquire(&self) -> Result<Permit<'_>, CircuitOpenError> {
        let mut state = self.lock();

        let admission = match state.status {
            CircuitState::Closed => Admission::Closed,
            CircuitState::Open => {
                let elapsed = state.opened_at.elapsed();
                if elapsed < self.half_open_after {
                    return Err(self.reject(Some(self.half_open_after - elapsed)));
                }
                self.transition_to_half_open(&mut state);
                Admission::Probe
            }
            CircuitState::HalfOpen => return Err(self.reject(None)),
        };

        Ok(Permit {
            breaker: self,
            admission,
            generation: state.generation,
            settled: false,
        })
    }

    /// Rejection the next attempt would get if it arrived after `wait`.
    ///
    /// Lets a retry loop give up before a backoff sleep that could only end
    /// in fail-fast.
    pub fn blocked_for(&self, wait: Duration) -> Option<CircuitOpenError> {
        let state = self.lock();
        if state.status != CircuitState::Open {
            return None;
        }

        let remaining = self.half_open_after.saturating_sub(state.opened_at.elapsed());
        (remaining > wait).then(|| self.reject(Some(remaining)))
    }

    fn on_outcome(&self, admission: Admission, generation: u64, outcome: Outcome) {
        let mut state = self.lock();

        match admission {
            // Calls admitted while closed only count if the breaker has not
            // opened since, even if it has closed again.
            Admission::Closed if state.generation != generation => {}
            Admission::Closed => match outcome {
                Outcome::Success => state.consecutive_failures = 0,
                Outcome::TransientFailure => {
                    state.consecutive_failures += 1;
                    tracing::debug!(
                        breaker = %self.name,
                        failures = state.consecutive_failures,
                        threshold = self.failure_threshold,
                        "Transient failure recorded"
                    );
                    if state.consecutive_failures >= self.failure_threshold {
                        self.transition_to_open(&mut state);
                    }
                }
                Outcome::PermanentFailure => {}
            },
            Admission::Probe => match outcome {
                Outcome::Success => self.transition_to_closed(&mut state),
                // A non-transient probe failure still reopens: one probe decides.
                Outcome::TransientFailure | Outcome::PermanentFailure => {
                    self.transition_to_open(&mut state)
                }
            },
        }
    }

    /// The probe's caller went away before it resolved.
    fn abandon_probe(&self) {
        let mut state = self.lock();
        if state.status == CircuitState::HalfOpen {
            tracing::debug!(breaker = %self.name, "Probe abandoned, re-arming half-open");
            // opened_at is kept, so the next caller becomes the probe.
            state.status = CircuitState::Open;
            metrics::record_breaker_transition(&self.name, CircuitState::Open.as_str());
        }
    }

    fn reject(&self, retry_after: Option<Duration>) -> CircuitOpenError {
        tracing::debug!(breaker = %self.name, retry_after = ?retry_after, "Circuit open, rejecting call");
        metrics::record_breaker_rejection(&self.name);
        CircuitOpenError {
            breaker: self.name.clone(),
            retry_after,
        }
    }

    fn transition_to_open(&self, state: &mut BreakerState) {
        tracing::warn!(
            breaker = %self.name,
            from = state.status.as_str(),
            cool_down = ?self.half_open_after,
            "Circuit breaker opened"
        );
        state.status = CircuitState::Open;
        state.opened_at = Instant::now();
        state.generation += 1;
        metrics::record_breaker_transition(&self.name, CircuitState::Open.as_str());
    }

    fn transition_to_half_open(&self, state: &mut BreakerState) {
        tracing::info!(breaker = %self.name, "Circuit breaker half-open, admitting probe");
        state.status = CircuitState::HalfOpen;
        metrics::record_breaker_transition(&self.name, CircuitState::HalfOpen.as_str());
    }

    fn transition_to_closed(&self, state: &mut BreakerState) {
        tracing::info!(breaker = %self.name, "Circuit breaker closed");
        state.status = CircuitState::Closed;
        state.consecutive_failures = 0;
        metrics::record_breaker_transition(&self.name, CircuitState::Closed.as_str());
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        // Every critical section leaves the state consistent, so a poisoned
        // lock is still usable.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
