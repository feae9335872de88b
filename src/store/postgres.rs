//! PostgreSQL [RecordStore] on a `deadpool-postgres` pool.

use std::time::Duration;

use async_trait::async_trait;
use deadpool_postgres::{
    Manager, ManagerConfig, Object, Pool, PoolError, RecyclingMethod, Runtime,
};
use secrecy::ExposeSecret;
use tokio_postgres::NoTls;

use crate::config::DatabaseConfig;
use crate::credentials::Credentials;
use crate::store::{Listing, Record, RecordStore, StoreError};

/// Advisory lock key serializing schema creation across instances.
const SCHEMA_LOCK_KEY: i64 = 5_147_310;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS my_table (id SERIAL PRIMARY KEY, name TEXT)";
const INSERT_RECORD: &str = "INSERT INTO my_table (name) VALUES ($1) RETURNING id, name";
const LIST_NAMES: &str = "SELECT name FROM my_table ORDER BY id DESC";
const LOCK_TABLE: &str = "LOCK TABLE my_table IN ACCESS EXCLUSIVE MODE";
const COUNT_RECORDS: &str = "SELECT COUNT(*) FROM my_table";
const TRUNCATE: &str = "TRUNCATE my_table";

pub struct PgRecordStore {
    pool: Pool,
    wait_timeout: Duration,
}

impl PgRecordStore {
    /// Build a pool for the resolved credentials. No connection is opened
    /// until the first query.
    pub fn connect(credentials: &Credentials, config: &DatabaseConfig) -> Result<Self, StoreError> {
        let wait_timeout = Duration::from_secs(config.connect_timeout_secs.max(1));
        let mut pg = tokio_postgres::Config::new();
        pg.host(&credentials.host)
            .port(credentials.port)
            .dbname(&credentials.dbname)
            .user(&credentials.username)
            .password(credentials.password.expose_secret())
            .application_name(env!("CARGO_PKG_NAME"))
            .connect_timeout(wait_timeout);

        let manager_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };
        let manager = Manager::from_config(pg, NoTls, manager_config);
        let pool = Pool::builder(manager)
            .max_size(config.pool_size)
            .wait_timeout(Some(wait_timeout))
            .runtime(Runtime::Tokio1)
            .build()?;

        tracing::debug!(
            host = %credentials.host,
            port = credentials.port,
            max_size = config.pool_size,
            "Connection pool created"
        );
        Ok(Self { pool, wait_timeout })
    }

    /// Check out a connection, giving up once every slot has been busy for
    /// the connect timeout.
    async fn client(&self) -> Result<Object, StoreError> {
        self.pool.get().await.map_err(|err| match err {
            PoolError::Timeout(_) => StoreError::Unavailable(format!(
                "no database connection free after {}s",
                self.wait_timeout.as_secs()
            )),
            other => StoreError::Pool(other),
        })
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        let mut client = self.client().await?;
        let tx = client.transaction().await?;
        // Racing CREATE TABLE IF NOT EXISTS can hit a duplicate catalog row.
        tx.execute("SELECT pg_advisory_xact_lock($1)", &[&SCHEMA_LOCK_KEY])
            .await?;
        tx.batch_execute(CREATE_TABLE).await?;
        tx.commit().await?;
        tracing::info!(table = crate::store::TABLE_NAME, "Schema ready");
        Ok(())
    }

    async fn insert(&self, name: &str) -> Result<Record, StoreError> {
        let client = self.client().await?;
        let stmt = client.prepare_cached(INSERT_RECORD).await?;
        let row = client.query_one(&stmt, &[&name]).await?;
        Ok(Record {
            id: row.try_get(0)?,
            name: row.try_get(1)?,
        })
    }

    async fn list(&self) -> Result<Listing, StoreError> {
        let client = self.client().await?;
        let stmt = client.prepare_cached(LIST_NAMES).await?;
        let rows = client.query(&stmt, &[]).await?;
        let names = rows
            .iter()
            .map(|row| row.try_get::<_, Option<String>>(0))
            .collect::<Result<_, _>>()?;
        Ok(Listing { names })
    }

    async fn clean(&self) -> Result<u64, StoreError> {
        let mut client = self.client().await?;
        let tx = client.transaction().await?;
        tx.batch_execute(LOCK_TABLE).await?;
        let removed: i64 = tx.query_one(COUNT_RECORDS, &[]).await?.try_get(0)?;
        tx.batch_execute(TRUNCATE).await?;
        tx.commit().await?;
        Ok(removed.max(0) as u64)
    }
}
