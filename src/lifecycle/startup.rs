//! Startup orchestration.
//!
//! # Responsibilities
//! - Start the metrics exporter when enabled
//! - Resolve credentials, build the pool, ensure the schema
//! - Bind the listener and serve until a shutdown signal
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listener binds last (traffic only when the store is ready)

use std::future::Future;
use std::net::{AddrParseError, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinError;

use crate::config::{DatabaseConfig, ServiceConfig};
use crate::credentials::{resolve_credentials, CredentialError, SecretsManagerSource};
use crate::http::{AppState, HttpServer};
use crate::lifecycle::{shutdown::Shutdown, signals};
use crate::names::NameGenerator;
use crate::observability::metrics;
use crate::resilience::Backoff;
use crate::store::{PgRecordStore, RecordStore, StoreError};

/// Fatal startup failures.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("credential resolution failed: {0}")]
    Credentials(#[from] CredentialError),

    #[error("store initialization failed: {0}")]
    Store(#[from] StoreError),

    #[error("invalid metrics address: {0}")]
    MetricsAddress(#[from] AddrParseError),

    #[error("metrics exporter failed: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("server task failed: {0}")]
    Join(#[from] JoinError),
}

/// Run the service with a validated configuration.
pub async fn run(config: ServiceConfig) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let secrets = SecretsManagerSource::new(config.database.region.as_deref());
    let credentials = resolve_credentials(&config.database, &secrets).await?;
    let store = PgRecordStore::connect(&credentials, &config.database)?;
    prepare_store(&store, &config.database).await?;

    let names = NameGenerator::new(config.records.name_source);
    tracing::info!(
        name_source = ?names.source(),
        backend_echo = config.records.backend_echo,
        request_timeout_secs = ?config.timeouts.request_secs,
        "Record endpoints configured"
    );
    let state = AppState::new(Arc::new(store), names);
    let server = HttpServer::new(&config, state);

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        "Server running"
    );

    serve_until(
        server,
        listener,
        Duration::from_secs(config.timeouts.shutdown_secs),
        signals::shutdown_signal(),
    )
    .await
}

/// Ensure the schema exists, retrying with backoff while the store is
/// unreachable.
pub async fn prepare_store(
    store: &dyn RecordStore,
    config: &DatabaseConfig,
) -> Result<(), StoreError> {
    let backoff = Backoff::for_database(config);
    let mut attempt = 0;
    loop {
        attempt += 1;
        match store.ensure_schema().await {
            Ok(()) => return Ok(()),
            Err(err) if attempt < config.connect_attempts => {
                let delay = backoff.delay(attempt);
                tracing::warn!(
                    attempt,
                    max_attempts = config.connect_attempts,
                    delay = ?delay,
                    error = %err,
                    "Store not ready; retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Serve until `signal` resolves, then stop accepting and wait at most
/// `drain` for the server to finish before returning.
pub async fn serve_until<F>(
    server: HttpServer,
    listener: TcpListener,
    drain: Duration,
    signal: F,
) -> Result<(), StartupError>
where
    F: Future<Output = ()>,
{
    let shutdown = Shutdown::new();
    let mut task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    tokio::select! {
        joined = &mut task => return Ok(joined??),
        _ = signal => {}
    }

    shutdown.trigger();
    match tokio::time::timeout(drain, task).await {
        Ok(joined) => Ok(joined??),
        Err(_) => {
            tracing::warn!(drain_secs = drain.as_secs(), "Exiting with requests in flight");
            Ok(())
        }
    }
}
