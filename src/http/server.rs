//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, CORS, timeout, metrics)
//! - Serve on a bound listener until told to stop

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{CorsConfig, ServiceConfig};
use crate::http::handlers::{
    add_record, backend_echo, clean_records, health, list_records, ADD_PATH, CLEAN_PATH,
    ECHO_ROUTE, HEALTH_PATH, RECORDS_PATH,
};
use crate::http::request::{propagate_request_id_layer, request_span, set_request_id_layer};
use crate::http::response::{json_timeouts, TIMEOUT_STATUS};
use crate::names::NameGenerator;
use crate::observability::metrics::track_requests;
use crate::store::RecordStore;

/// Application state injected into handlers.
///
/// Built once at startup; cloning shares the same store.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub names: NameGenerator,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, names: NameGenerator) -> Self {
        Self { store, names }
    }
}

/// HTTP server for the record service.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: &ServiceConfig, state: AppState) -> Self {
        Self {
            router: Self::build_router(config, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        let mut routes = Router::new()
            .route(HEALTH_PATH, get(health))
            .route(RECORDS_PATH, get(list_records))
            .route(ADD_PATH, get(add_record))
            .route(CLEAN_PATH, get(clean_records));

        if config.records.backend_echo {
            routes = routes.route(ECHO_ROUTE, get(backend_echo));
        }

        let timeout = config
            .timeouts
            .request_secs
            .map(|secs| TimeoutLayer::with_status_code(TIMEOUT_STATUS, Duration::from_secs(secs)));

        routes
            .route_layer(middleware::from_fn(track_requests))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(TraceLayer::new_for_http().make_span_with(request_span::<Body>))
                    .layer(propagate_request_id_layer())
                    .layer(cors_layer(&config.cors))
                    .layer(middleware::from_fn(json_timeouts))
                    .option_layer(timeout),
            )
    }

    /// The fully layered router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    if config.allows_any() {
        return layer.allow_origin(Any);
    }
    match HeaderValue::from_str(config.origin.trim()) {
        Ok(origin) => layer.allow_origin(origin),
        Err(err) => {
            // Validation rejects this earlier; fall back to same-origin only.
            tracing::warn!(origin = %config.origin, error = %err, "Ignoring invalid CORS origin");
            layer
        }
    }
}
