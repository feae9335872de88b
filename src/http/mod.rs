//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, span)
//!     → handlers.rs (one store operation per route)
//!     → response.rs (JSON envelope, error mapping)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use response::{ApiError, JsonUtf8, JSON_UTF8};
pub use server::{AppState, HttpServer};
