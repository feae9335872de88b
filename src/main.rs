//! Record service binary.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use record_service::config::load_config;
use record_service::lifecycle::startup;
use record_service::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "record-service", version)]
#[command(about = "HTTP backend that records and lists named entries", long_about = None)]
struct Args {
    /// TOML configuration file; environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen port, overriding PORT and the config file.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let mut config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("record-service: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(port) = args.port {
        config.listener.port = port;
    }

    init_logging(&config.observability);

    tracing::info!("record-service v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        cors_origin = %config.cors.origin,
        name_source = ?config.records.name_source,
        secret = config.database.uses_secret(),
        "Configuration loaded"
    );

    match startup::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "Fatal error");
            ExitCode::FAILURE
        }
    }
}
