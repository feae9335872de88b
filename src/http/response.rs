//! Response envelopes.
//!
//! # Responsibilities
//! - Serialize handler results into the JSON envelopes clients expect
//! - Always send `application/json; charset=utf-8`
//! - Map store failures to 500 with a JSON error body
//! - Give request timeouts the same JSON error shape

use axum::extract::Request;
use axum::http::{header, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::store::{Record, StoreError};

pub const JSON_UTF8: &str = "application/json; charset=utf-8";

/// JSON body sent with an explicit UTF-8 charset.
#[derive(Debug, Clone)]
pub struct JsonUtf8<T>(pub T);

impl<T: Serialize> IntoResponse for JsonUtf8<T> {
    fn into_response(self) -> Response {
        json_response(StatusCode::OK, &self.0)
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    match serde_json::to_vec(body) {
        Ok(bytes) => (
            status,
            [(header::CONTENT_TYPE, HeaderValue::from_static(JSON_UTF8))],
            bytes,
        )
            .into_response(),
        Err(err) => {
            tracing::error!(error = %err, "Failed to serialize response");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// `{path}`: liveness and echo responses.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PathBody {
    pub path: &'static str,
}

/// `{path, names, count}`: the records listing.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RecordsBody {
    pub path: &'static str,
    pub names: Vec<Option<String>>,
    pub count: usize,
}

/// `{path, method, value}`: result of a write operation.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MutationBody<T> {
    pub path: &'static str,
    pub method: &'static str,
    pub value: T,
}

pub type AddBody = MutationBody<Record>;
pub type CleanBody = MutationBody<Removed>;

/// Value of a clean response.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Removed {
    pub removed: u64,
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    path: &'a str,
    error: &'a str,
}

/// A request that failed in the store.
#[derive(Debug)]
pub struct ApiError {
    path: &'static str,
    source: StoreError,
}

impl ApiError {
    /// Adapter for `map_err` tagging the failure with its route.
    pub fn at(path: &'static str) -> impl FnOnce(StoreError) -> ApiError {
        move |source| ApiError { path, source }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.source.to_string();
        tracing::error!(path = self.path, error = %message, "Store operation failed");
        json_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            &ErrorBody {
                path: self.path,
                error: &message,
            },
        )
    }
}

/// Status sent when a request outlives `timeouts.request_secs`.
pub const TIMEOUT_STATUS: StatusCode = StatusCode::GATEWAY_TIMEOUT;

/// Middleware giving the timeout layer's empty response a JSON body.
///
/// Must wrap the timeout layer so it sees the response the layer produces.
pub async fn json_timeouts(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let response = next.run(request).await;

    if response.status() != TIMEOUT_STATUS || response.headers().contains_key(header::CONTENT_TYPE)
    {
        return response;
    }
    tracing::error!(path = %path, "Request timed out");
    json_response(
        TIMEOUT_STATUS,
        &ErrorBody {
            path: &path,
            error: "request timed out",
        },
    )
}
