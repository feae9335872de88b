//! Record persistence.
//!
//! # Responsibilities
//! - Own the single `my_table` table (create-if-absent at startup)
//! - Insert one record, list all names, truncate the table
//!
//! # Design Decisions
//! - The store is the only source of truth; nothing is cached in-process
//! - Handlers see the store through [RecordStore] so the HTTP layer does
//!   not depend on PostgreSQL
//! - A concurrent clean and add are not coordinated here; whichever reaches
//!   the database first wins

pub mod postgres;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

pub use postgres::PgRecordStore;

/// Name of the table holding records.
pub const TABLE_NAME: &str = "my_table";

/// One persisted row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub id: i32,
    pub name: String,
}

/// Every stored name, most recently inserted first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Listing {
    pub names: Vec<Option<String>>,
}

impl Listing {
    pub fn count(&self) -> usize {
        self.names.len()
    }
}

/// Errors surfaced by a [RecordStore].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("connection pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("failed to build connection pool: {0}")]
    Build(#[from] deadpool_postgres::BuildError),

    #[error("query failed: {0}")]
    Query(#[from] tokio_postgres::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Storage operations behind the record endpoints.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Create the table if it does not exist. Safe to run from several
    /// instances at once.
    async fn ensure_schema(&self) -> Result<(), StoreError>;

    /// Insert a row and return it with its assigned id.
    async fn insert(&self, name: &str) -> Result<Record, StoreError>;

    /// All names, ordered by descending id.
    async fn list(&self) -> Result<Listing, StoreError>;

    /// Remove every row in one operation, returning how many were removed.
    async fn clean(&self) -> Result<u64, StoreError>;
}
