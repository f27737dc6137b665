//! Resilience error types.

use std::time::Duration;
use thiserror::Error;

/// Raised by the circuit breaker instead of invoking the operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("circuit breaker '{breaker}' is open")]
pub struct CircuitOpenError {
    /// Name of the rejecting breaker.
    pub breaker: String,
    /// Remaining cool-down. `None` while a half-open probe is in flight.
    pub retry_after: Option<Duration>,
}

/// Failure of a single breaker-guarded attempt.
#[derive(Debug, Error)]
pub enum AttemptError<E> {
    /// Rejected without invoking the operation.
    #[error(transparent)]
    CircuitOpen(CircuitOpenError),

    /// The operation ran and failed.
    #[error("attempt failed (transient: {transient})")]
    Fault { error: E, transient: bool },
}

impl<E> AttemptError<E> {
    /// Only classified operation faults are worth another attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, AttemptError::Fault { transient: true, .. })
    }
}

/// Error observed by callers of the executor.
#[derive(Debug, Error)]
pub enum ExecuteError<E> {
    /// The breaker blocked the last attempt.
    #[error(transparent)]
    CircuitOpen(CircuitOpenError),

    /// The operation's own error from the last attempt.
    #[error(transparent)]
    Operation(E),
}

impl<E> ExecuteError<E> {
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, ExecuteError::CircuitOpen(_))
    }

    /// The operation error, if the operation ran.
    pub fn into_operation_error(self) -> Option<E> {
        match self {
            ExecuteError::Operation(e) => Some(e),
            ExecuteError::CircuitOpen(_) => None,
        }
    }
}

impl<E> From<AttemptError<E>> for ExecuteError<E> {
    fn from(err: AttemptError<E>) -> Self {
        match err {
            AttemptError::CircuitOpen(open) => ExecuteError::CircuitOpen(open),
            AttemptError::Fault { error, .. } => ExecuteError::Operation(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CircuitOpenError {
            breaker: "payments".to_string(),
            retry_after: Some(Duration::from_secs(3)),
        };
        assert_eq!(err.to_string(), "circuit breaker 'payments' is open");

        let err: ExecuteError<std::io::Error> = ExecuteError::CircuitOpen(err);
        assert!(err.is_circuit_open());
        assert!(err.into_operation_error().is_none());
    }

    #[test]
    fn test_attempt_error_conversion() {
        let attempt = AttemptError::Fault { error: "boom", transient: true };
        assert!(attempt.is_transient());

        let err = ExecuteError::from(attempt);
        assert_eq!(err.into_operation_error(), Some("boom"));
    }
}
