//! Metrics collection and exposition.
//!
//! # Metrics
//! - `record_service_requests_total` (counter): requests by route, status
//! - `record_service_request_duration_seconds` (histogram): latency by route
//!
//! # Design Decisions
//! - Routes are labelled by their matched pattern, not the raw path
//! - Without an installed exporter the macros are no-ops

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware::Next,
    response::Response,
};
use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

const REQUESTS_TOTAL: &str = "record_service_requests_total";
const REQUEST_DURATION: &str = "record_service_request_duration_seconds";

/// Install the Prometheus recorder and start its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;

    describe_counter!(REQUESTS_TOTAL, "Requests handled, by route and status");
    describe_histogram!(
        REQUEST_DURATION,
        Unit::Seconds,
        "Request latency, by route"
    );

    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one finished request.
pub fn record_request(route: &str, status: u16, start: Instant) {
    counter!(REQUESTS_TOTAL, "route" => route.to_owned(), "status" => status.to_string())
        .increment(1);
    histogram!(REQUEST_DURATION, "route" => route.to_owned())
        .record(start.elapsed().as_secs_f64());
}

/// Middleware recording [record_request] for every routed request.
pub async fn track_requests(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());

    let response = next.run(request).await;
    record_request(&route, response.status().as_u16(), start);
    response
}
