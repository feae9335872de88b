//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: '{value}' ({reason})")]
    Env {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: defaults, then the optional TOML file, then the
/// process environment, then validation.
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    let config = match path {
        Some(path) => load_file(path)?,
        None => ServiceConfig::default(),
    };
    let config = apply_env(config, |var| std::env::var(var).ok())?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Parse a TOML file. Missing sections and fields fall back to defaults.
pub fn load_file(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Overlay environment variables onto `config`.
///
/// `lookup` returns the raw value of a variable; empty values count as unset.
pub fn apply_env<F>(mut config: ServiceConfig, lookup: F) -> Result<ServiceConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

    if let Some(v) = get("PORT") {
        config.listener.port = parse_var("PORT", &v)?;
    }
    if let Some(v) = get("CORS_ORIGIN") {
        config.cors.origin = v;
    }
    if let Some(v) = get("REGION") {
        config.database.region = Some(v);
    }
    if let Some(v) = get("DATABASE_HOST") {
        config.database.host = Some(v);
    }
    if let Some(v) = get("DATABASE_PORT") {
        config.database.port = parse_var("DATABASE_PORT", &v)?;
    }
    if let Some(v) = get("DATABASE_NAME") {
        config.database.name = Some(v);
    }
    if let Some(v) = get("DATABASE_USERNAME") {
        config.database.username = Some(v);
    }
    if let Some(v) = get("DATABASE_PASSWORD") {
        config.database.password = Some(v);
    }
    if let Some(v) = get("DB_SECRET_ARN") {
        config.database.secret_arn = Some(v);
    }
    if let Some(v) = get("REQUEST_TIMEOUT_SECS") {
        config.timeouts.request_secs = Some(parse_var("REQUEST_TIMEOUT_SECS", &v)?);
    }
    if let Some(v) = get("NAME_SOURCE") {
        config.records.name_source = parse_var("NAME_SOURCE", &v)?;
    }
    if let Some(v) = get("BACKEND_ECHO") {
        config.records.backend_echo = parse_var("BACKEND_ECHO", &v)?;
    }
    if let Some(v) = get("LOG_FORMAT") {
        config.observability.log_format = parse_var("LOG_FORMAT", &v)?;
    }
    if let Some(v) = get("METRICS_ADDRESS") {
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = v;
    }

    Ok(config)
}

fn parse_var<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Env {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })
}
