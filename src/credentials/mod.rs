//! Database credential resolution.
//!
//! # Data Flow
//! ```text
//! DatabaseConfig
//!     ├─ host set (or no secret_arn) → direct fields
//!     └─ secret_arn set, no host     → secrets.rs (one Secrets Manager fetch)
//!                                      → resolver.rs (parse JSON payload)
//!     → Credentials (fully populated)
//! ```
//!
//! # Design Decisions
//! - Resolution runs once, at startup, before the listener binds
//! - The result is all-or-nothing; no mix of direct and secret fields
//! - Passwords stay wrapped in `SecretString` until the pool is built

pub mod resolver;
pub mod secrets;

use secrecy::SecretString;
use thiserror::Error;

pub use resolver::{parse_secret, resolve_credentials};
pub use secrets::{SecretSource, SecretsManagerSource};

/// Where a set of credentials came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Read directly from configuration.
    Direct,
    /// Fetched from the secret store by reference.
    Secret(String),
}

impl std::fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Direct => write!(f, "configuration"),
            Self::Secret(id) => write!(f, "secret {}", id),
        }
    }
}

/// Resolved database connection parameters.
#[derive(Debug)]
pub struct Credentials {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub username: String,
    pub password: SecretString,
    pub source: CredentialSource,
}

/// Errors that can occur while resolving credentials.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("missing database setting: {0}")]
    MissingField(&'static str),

    #[error("secret fetch failed: {0}")]
    SecretFetch(String),

    #[error("secret has no string payload")]
    EmptySecret,

    #[error("malformed secret payload: {0}")]
    MalformedSecret(#[from] serde_json::Error),
}
