//! Fault classification.
//!
//! # Responsibilities
//! - Describe why a wrapped operation failed as a closed set of causes
//! - Decide whether a failure is transient (retried, counted by the breaker)
//!
//! # Design Decisions
//! - Errors are adapted into `FaultCause` at the operation boundary
//! - One classifier instance feeds both the retry loop and the breaker
//! - Connection refusal and 5xx are transient; 4xx and everything else are not

use std::fmt;

/// Why a wrapped operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultCause {
    /// Target unreachable at the transport level.
    ConnectionRefused,
    /// The target answered with an HTTP-style status code.
    HttpStatus(u16),
    /// Anything else.
    Other,
}

impl FaultCause {
    /// Server errors (500-599).
    pub fn is_server_error(&self) -> bool {
        matches!(self, FaultCause::HttpStatus(status) if status / 100 == 5)
    }
}

impl fmt::Display for FaultCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultCause::ConnectionRefused => write!(f, "connection refused"),
            FaultCause::HttpStatus(status) => write!(f, "http status {}", status),
            FaultCause::Other => write!(f, "other"),
        }
    }
}

/// Error types that can describe their own cause.
pub trait Classify {
    fn fault_cause(&self) -> FaultCause;
}

impl Classify for FaultCause {
    fn fault_cause(&self) -> FaultCause {
        *self
    }
}

/// Decides whether an error is a transient fault.
///
/// Must be pure: the same error always yields the same answer.
pub trait FaultClassifier<E>: Send + Sync {
    fn is_transient(&self, error: &E) -> bool;
}

impl<E, F> FaultClassifier<E> for F
where
    F: Fn(&E) -> bool + Send + Sync,
{
    fn is_transient(&self, error: &E) -> bool {
        self(error)
    }
}

/// Reference policy for HTTP dependencies.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransientHttpFaults;

impl<E: Classify> FaultClassifier<E> for TransientHttpFaults {
    fn is_transient(&self, error: &E) -> bool {
        let cause = error.fault_cause();
        tracing::debug!(cause = %cause, "Resilience handler received an error");

        match cause {
            FaultCause::ConnectionRefused => true,
            FaultCause::HttpStatus(_) => cause.is_server_error(),
            FaultCause::Other => false,
        }
    }
}
