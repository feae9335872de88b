//! Record Service Library
//!
//! A small HTTP backend that adds, lists and clears named records in one
//! PostgreSQL table.
//!
//! # Architecture Overview
//!
//! ```text
//!   startup:  config ─▶ credentials ─▶ store (pool + schema) ─▶ http listener
//!
//!   request:  client ─▶ request id / trace / cors / timeout
//!                     ─▶ handler ─▶ RecordStore ─▶ PostgreSQL
//!                     ◀─ JSON envelope
//! ```

// Core subsystems
pub mod config;
pub mod credentials;
pub mod http;
pub mod names;
pub mod store;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::ServiceConfig;
pub use http::{AppState, HttpServer};
pub use lifecycle::Shutdown;
pub use names::NameGenerator;
pub use store::{Listing, Record, RecordStore, StoreError};
