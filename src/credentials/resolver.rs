//! Credential resolution: direct configuration or one secret fetch.

use secrecy::SecretString;
use serde::Deserialize;

use crate::config::DatabaseConfig;
use crate::credentials::{CredentialError, CredentialSource, Credentials, SecretSource};

const DEFAULT_PG_PORT: u16 = 5432;

/// Shape of a database secret as stored by RDS.
#[derive(Debug, Deserialize)]
struct SecretPayload {
    host: Option<String>,
    port: Option<u16>,
    dbname: Option<String>,
    username: Option<String>,
    password: Option<String>,
}

/// Resolve the database credentials for `config`.
///
/// When a secret reference is configured and no direct host is, exactly one
/// fetch is made through `secrets` and all fields come from the payload.
/// Otherwise `secrets` is not touched.
pub async fn resolve_credentials(
    config: &DatabaseConfig,
    secrets: &dyn SecretSource,
) -> Result<Credentials, CredentialError> {
    let credentials = match config.secret_arn.as_deref() {
        Some(secret_id) if config.uses_secret() => {
            let raw = secrets.fetch(secret_id).await?;
            parse_secret(&raw, secret_id)?
        }
        _ => direct(config)?,
    };
    tracing::info!(
        host = %credentials.host,
        dbname = %credentials.dbname,
        source = %credentials.source,
        "Database credentials resolved"
    );
    Ok(credentials)
}

fn direct(config: &DatabaseConfig) -> Result<Credentials, CredentialError> {
    Ok(Credentials {
        host: required(&config.host, "DATABASE_HOST")?,
        port: config.port,
        dbname: required(&config.name, "DATABASE_NAME")?,
        username: required(&config.username, "DATABASE_USERNAME")?,
        password: SecretString::from(required(&config.password, "DATABASE_PASSWORD")?),
        source: CredentialSource::Direct,
    })
}

fn required(value: &Option<String>, name: &'static str) -> Result<String, CredentialError> {
    value
        .as_ref()
        .filter(|v| !v.is_empty())
        .cloned()
        .ok_or(CredentialError::MissingField(name))
}

/// Parse a JSON secret payload into credentials.
pub fn parse_secret(raw: &str, secret_id: &str) -> Result<Credentials, CredentialError> {
    let payload: SecretPayload = serde_json::from_str(raw)?;
    Ok(Credentials {
        host: required(&payload.host, "host")?,
        port: payload.port.unwrap_or(DEFAULT_PG_PORT),
        dbname: required(&payload.dbname, "dbname")?,
        username: required(&payload.username, "username")?,
        password: SecretString::from(required(&payload.password, "password")?),
        source: CredentialSource::Secret(secret_id.to_string()),
    })
}
