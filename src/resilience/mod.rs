//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to a dependency:
//!     → executor.rs (attempt loop)
//!     → circuit_breaker.rs (admit, or fail fast while open)
//!     → operation
//!     → fault.rs (transient or permanent?)
//!     → retries.rs + backoff.rs (wait, then attempt again)
//! ```
//!
//! # Design Decisions
//! - Only transient faults (connection refused, 5xx) are retried or counted
//! - Breaker state is per executor and shared by all of its callers
//! - Jittered backoff prevents synchronized retry storms

pub mod backoff;
pub mod circuit_breaker;
pub mod error;
pub mod executor;
pub mod fault;
pub mod retries;

pub use backoff::{Backoff, ExponentialBackoff};
pub use circuit_breaker::{BreakerSnapshot, CircuitBreaker, CircuitState};
pub use error::{AttemptError, CircuitOpenError, ExecuteError};
pub use executor::ResilientExecutor;
pub use fault::{Classify, FaultCause, FaultClassifier, TransientHttpFaults};
pub use retries::RetryPolicy;
