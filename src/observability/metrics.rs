//! Metrics collection.
//!
//! # Metrics
//! - `resilience_attempts_total` (counter): attempts by executor, outcome
//! - `resilience_retries_total` (counter): scheduled retries by executor
//! - `resilience_breaker_transitions_total` (counter): state changes by breaker, target state
//! - `resilience_breaker_rejections_total` (counter): calls failed fast by breaker
//!
//! # Design Decisions
//! - Facade only; the embedding application installs an exporter
//! - Labels are names, never per-request values

use metrics::counter;

/// Record the outcome of one executor attempt.
pub fn record_attempt(executor: &str, outcome: &'static str) {
    counter!(
        "resilience_attempts_total",
        "executor" => executor.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Record a scheduled retry.
pub fn record_retry(executor: &str) {
    counter!("resilience_retries_total", "executor" => executor.to_string()).increment(1);
}

/// Record a breaker state transition.
pub fn record_breaker_transition(breaker: &str, to: &'static str) {
    counter!(
        "resilience_breaker_transitions_total",
        "breaker" => breaker.to_string(),
        "to" => to
    )
    .increment(1);
}

/// Record a call rejected by an open breaker.
pub fn record_breaker_rejection(breaker: &str) {
    counter!("resilience_breaker_rejections_total", "breaker" => breaker.to_string()).increment(1);
}
