use crate::database::error::StoreError;
use sqlx::pool::PoolConnection;
use sqlx::{PgPool, Postgres};
use std::future::Future;
use std::time::Duration;

pub type Lease = PoolConnection<Postgres>;

#[derive(Clone)]
pub struct PostgresRepository {
    pub pool: PgPool,
    pub query_timeout: Duration,
}

impl PostgresRepository {
    pub fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self { pool, query_timeout }
    }

    /// Checks a connection out of the pool. It goes back when the lease is dropped.
    pub async fn lease(&self) -> Result<Lease, StoreError> {
        self.pool.acquire().await.map_err(|e| StoreError::storage("Failed to lease a connection", e))
    }

    /// Runs `query` under the configured query timeout.
    pub async fn bounded<T, F>(&self, query: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.query_timeout, query).await {
            Ok(result) => result.map_err(StoreError::from),
            Err(_) => Err(StoreError::Timeout(self.query_timeout)),
        }
    }
}
