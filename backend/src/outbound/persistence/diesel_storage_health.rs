//! Round-trip probe for the PostgreSQL backend.

use async_trait::async_trait;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{StorageHealth, StorageHealthError, StorageHealthProbe};

use super::pool::DbPool;

/// Storage check that runs `SELECT 1`.
#[derive(Clone)]
pub struct DieselStorageHealthProbe {
    pool: DbPool,
}

impl DieselStorageHealthProbe {
    /// Construct over a shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StorageHealthProbe for DieselStorageHealthProbe {
    async fn probe(&self) -> Result<StorageHealth, StorageHealthError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| StorageHealthError::unavailable(err.to_string()))?;
        diesel::sql_query("SELECT 1")
            .execute(&mut conn)
            .await
            .map_err(|err| {
                tracing::debug!(%err, "storage probe query failed");
                StorageHealthError::unavailable("database query failed")
            })?;
        Ok(StorageHealth::new("postgres", "connected"))
    }
}
