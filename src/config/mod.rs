//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ResilienceConfig (validated, immutable)
//!     → ResilientExecutor::from_config
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; a new executor is built for new values
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{CircuitBreakerConfig, LogFormat, ObservabilityConfig, ResilienceConfig, RetryConfig};
pub use validation::{validate_config, ValidationError};
