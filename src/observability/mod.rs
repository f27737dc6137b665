//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! resilience/* produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Whatever metrics recorder the application installs
//! ```
//!
//! # Design Decisions
//! - Structured fields (executor, breaker, attempt) on every event
//! - Metrics are cheap (atomic increments behind the facade)
//! - Neither sink is required for correctness

pub mod logging;
pub mod metrics;
