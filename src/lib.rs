//! Resilient execution of fallible async operations.
//!
//! Wraps a remote call with retry (exponential backoff) and a consecutive
//! failure circuit breaker. The retry loop runs outside, so every attempt is
//! individually subject to breaker admission.
//!
//! ```no_run
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! use resilient_executor::{http, ResilienceConfig, ResilientExecutor};
//!
//! let executor = ResilientExecutor::from_config(&ResilienceConfig::default())?;
//! let client = reqwest::Client::new();
//!
//! let response = executor
//!     .execute(|| http::send(client.get("http://localhost:3000/orders")))
//!     .await?;
//! # let _ = response;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod http;
pub mod observability;
pub mod resilience;

pub use config::schema::ResilienceConfig;
pub use resilience::{
    CircuitBreaker, CircuitOpenError, CircuitState, ExecuteError, FaultCause, ResilientExecutor,
    RetryPolicy, TransientHttpFaults,
};
