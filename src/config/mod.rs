//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! built-in defaults
//!     → loader.rs (optional TOML file)
//!     → loader.rs (environment overrides: PORT, CORS_ORIGIN, DATABASE_*, ...)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    CorsConfig, DatabaseConfig, ListenerConfig, LogFormat, NameSource, ObservabilityConfig,
    RecordsConfig, ServiceConfig, TimeoutConfig,
};
pub use validation::ValidationError;
