//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the record service.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (port).
    pub listener: ListenerConfig,

    /// Cross-origin request policy.
    pub cors: CorsConfig,

    /// Database connection parameters and credential source.
    pub database: DatabaseConfig,

    /// Record naming and optional routes.
    pub records: RecordsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind.
    pub host: String,

    /// TCP port to listen on.
    pub port: u16,
}

impl ListenerConfig {
    /// Address string suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origin; `*` allows any.
    pub origin: String,
}

impl CorsConfig {
    pub fn allows_any(&self) -> bool {
        self.origin.trim() == "*"
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origin: "*".to_string(),
        }
    }
}

/// Database configuration.
///
/// Either the four direct fields are set, or `secret_arn` points at a
/// Secrets Manager secret holding them. Direct `host` wins when both are present.
#[derive(Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: Option<String>,
    pub port: u16,
    pub name: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,

    /// Reference to a stored secret (ARN or name).
    pub secret_arn: Option<String>,

    /// Secrets Manager region; unset defers to the AWS default chain.
    pub region: Option<String>,

    /// Maximum pooled connections.
    pub pool_size: usize,

    /// Connect timeout per attempt in seconds.
    pub connect_timeout_secs: u64,

    /// Startup attempts before giving up on the store.
    pub connect_attempts: u32,

    /// Base delay for startup backoff.
    pub retry_base_delay_ms: u64,

    /// Cap for startup backoff.
    pub retry_max_delay_ms: u64,
}

impl DatabaseConfig {
    /// Whether credentials come from the secret store rather than direct fields.
    pub fn uses_secret(&self) -> bool {
        self.secret_arn.is_some() && self.host.is_none()
    }
}

// Hand-written so the password never reaches a log line.
impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("secret_arn", &self.secret_arn)
            .field("region", &self.region)
            .field("pool_size", &self.pool_size)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("connect_attempts", &self.connect_attempts)
            .finish_non_exhaustive()
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: 5432,
            name: None,
            username: None,
            password: None,
            secret_arn: None,
            region: None,
            pool_size: 16,
            connect_timeout_secs: 5,
            connect_attempts: 5,
            retry_base_delay_ms: 500,
            retry_max_delay_ms: 5_000,
        }
    }
}

/// How new record names are produced.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NameSource {
    /// Random entry from the built-in character dictionary.
    #[default]
    Generated,
    /// Current UTC time, RFC 3339.
    Timestamp,
}

impl std::str::FromStr for NameSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "generated" => Ok(Self::Generated),
            "timestamp" => Ok(Self::Timestamp),
            other => Err(format!("unknown name source '{}'", other)),
        }
    }
}

/// Record endpoint behaviour.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
#[serde(default)]
pub struct RecordsConfig {
    pub name_source: NameSource,

    /// Register the `/backend/*` echo route.
    pub backend_echo: bool,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total request timeout in seconds; unset means requests never time out.
    pub request_secs: Option<u64>,

    /// Drain window after a shutdown signal; 0 exits immediately.
    pub shutdown_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: None,
            shutdown_secs: 0,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_format: LogFormat,

    /// Default filter when `RUST_LOG` is unset.
    pub log_filter: String,

    /// Enable the Prometheus scrape listener.
    pub metrics_enabled: bool,

    /// Scrape listener address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            log_filter: "record_service=info,tower_http=info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
