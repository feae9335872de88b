//! Route handlers.
//!
//! Each handler performs at most one store operation and returns a JSON
//! envelope. None of them read a body or query string.

use axum::extract::State;

use crate::http::response::{
    AddBody, ApiError, CleanBody, JsonUtf8, MutationBody, PathBody, RecordsBody, Removed,
};
use crate::http::server::AppState;

pub const HEALTH_PATH: &str = "/health";
pub const RECORDS_PATH: &str = "/backend/records";
pub const ADD_PATH: &str = "/backend/record/add";
pub const CLEAN_PATH: &str = "/backend/records/clean";

/// Route pattern for the echo handler, and the path it reports.
pub const ECHO_ROUTE: &str = "/backend/{*rest}";
pub const ECHO_PATH: &str = "/backend/*";

/// Liveness. Never touches the store.
pub async fn health() -> JsonUtf8<PathBody> {
    tracing::info!(path = HEALTH_PATH);
    JsonUtf8(PathBody { path: HEALTH_PATH })
}

/// Catch-all under `/backend/`. Never touches the store.
pub async fn backend_echo() -> JsonUtf8<PathBody> {
    tracing::info!(path = ECHO_PATH);
    JsonUtf8(PathBody { path: ECHO_PATH })
}

pub async fn list_records(
    State(state): State<AppState>,
) -> Result<JsonUtf8<RecordsBody>, ApiError> {
    tracing::info!(path = RECORDS_PATH);
    let listing = state.store.list().await.map_err(ApiError::at(RECORDS_PATH))?;

    Ok(JsonUtf8(RecordsBody {
        path: RECORDS_PATH,
        count: listing.count(),
        names: listing.names,
    }))
}

pub async fn add_record(State(state): State<AppState>) -> Result<JsonUtf8<AddBody>, ApiError> {
    let name = state.names.generate();
    tracing::info!(path = ADD_PATH, name = %name);
    let record = state.store.insert(&name).await.map_err(ApiError::at(ADD_PATH))?;
    tracing::debug!(id = record.id, "Record inserted");

    Ok(JsonUtf8(MutationBody {
        path: ADD_PATH,
        method: "add",
        value: record,
    }))
}

pub async fn clean_records(
    State(state): State<AppState>,
) -> Result<JsonUtf8<CleanBody>, ApiError> {
    tracing::info!(path = CLEAN_PATH);
    let removed = state.store.clean().await.map_err(ApiError::at(CLEAN_PATH))?;
    tracing::info!(removed, "Records table truncated");

    Ok(JsonUtf8(MutationBody {
        path: CLEAN_PATH,
        method: "clean",
        value: Removed { removed },
    }))
}
