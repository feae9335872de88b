//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → Credentials → Pool → Schema → Listener
//!
//! Signals (signals.rs):
//!     SIGINT/SIGTERM → log "Shutting down..." → trigger shutdown
//!
//! Shutdown (shutdown.rs):
//!     Broadcast → server stops accepting → exit after the drain window
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then store, then listener
//! - The drain window defaults to zero, so a signal exits immediately

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::StartupError;
