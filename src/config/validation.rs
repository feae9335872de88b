//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ports valid)
//! - Check that the CORS origin and metrics address parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system
//! - Credential completeness is checked by the resolver, not here, since a
//!   secret reference can supply every field at startup

use std::net::SocketAddr;

use axum::http::HeaderValue;
use thiserror::Error;

use crate::config::schema::ServiceConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a loaded configuration.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.port == 0 {
        errors.push(ValidationError::new("listener.port", "must be non-zero"));
    }

    if !config.cors.allows_any() && HeaderValue::from_str(config.cors.origin.trim()).is_err() {
        errors.push(ValidationError::new(
            "cors.origin",
            format!("'{}' is not a valid header value", config.cors.origin),
        ));
    }

    let db = &config.database;
    if db.pool_size == 0 {
        errors.push(ValidationError::new("database.pool_size", "must be at least 1"));
    }
    if db.connect_attempts == 0 {
        errors.push(ValidationError::new(
            "database.connect_attempts",
            "must be at least 1",
        ));
    }
    if db.connect_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "database.connect_timeout_secs",
            "must be non-zero",
        ));
    }
    if db.retry_base_delay_ms > db.retry_max_delay_ms {
        errors.push(ValidationError::new(
            "database.retry_base_delay_ms",
            "must not exceed retry_max_delay_ms",
        ));
    }

    if config.timeouts.request_secs == Some(0) {
        errors.push(ValidationError::new("timeouts.request_secs", "must be non-zero"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!(
                "'{}' is not a socket address",
                config.observability.metrics_address
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
