//! Resilience helpers.
//!
//! Startup treats an unreachable store as transient for a bounded number of
//! attempts. Requests themselves are never retried.

pub mod backoff;

pub use backoff::Backoff;
