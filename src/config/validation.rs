//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (threshold > 0, cool-down > 0, delays ordered)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ResilienceConfig → Result<(), Vec<ValidationError>>
//! - Runs before an executor is built

use thiserror::Error;

use crate::config::schema::ResilienceConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("circuit_breaker.consecutive_threshold must be at least 1")]
    ZeroThreshold,

    #[error("circuit_breaker.half_open_after_ms must be positive")]
    ZeroHalfOpenAfter,

    #[error("retry.base_delay_ms ({base_ms}) exceeds retry.max_delay_ms ({max_ms})")]
    BackoffOrder { base_ms: u64, max_ms: u64 },

    #[error("unknown log level '{0}'")]
    UnknownLogLevel(String),
}

/// Check a configuration, collecting every problem.
pub fn validate_config(config: &ResilienceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.name.trim().is_empty() {
        errors.push(ValidationError::EmptyName);
    }

    if config.circuit_breaker.consecutive_threshold == 0 {
        errors.push(ValidationError::ZeroThreshold);
    }

    if config.circuit_breaker.half_open_after_ms == 0 {
        errors.push(ValidationError::ZeroHalfOpenAfter);
    }

    if config.retry.base_delay_ms > config.retry.max_delay_ms {
        errors.push(ValidationError::BackoffOrder {
            base_ms: config.retry.base_delay_ms,
            max_ms: config.retry.max_delay_ms,
        });
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(config.observability.log_level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
