//! Builders for the storage ports selected at startup.

use capacity_backend::domain::ports::StoragePorts;
use capacity_backend::outbound::memory::MemoryStore;
use capacity_backend::outbound::persistence::{
    DbPool, MigrationError, PoolError, diesel_ports, run_pending_migrations,
};
use capacity_backend::outbound::remote::RemoteStore;
use tracing::{info, warn};

use super::config::StorageSettings;

/// Startup failures while preparing a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageBuildError {
    /// The pool could not be built.
    #[error("database pool could not be created: {0}")]
    Pool(#[from] PoolError),
    /// Migrations failed.
    #[error(transparent)]
    Migration(#[from] MigrationError),
    /// The blocking migration task panicked or was cancelled.
    #[error("migration task failed: {0}")]
    MigrationTask(String),
    /// The reqwest client could not be built.
    #[error("remote client could not be created: {0}")]
    Remote(#[from] reqwest::Error),
}

/// Build every storage port for the configured backend.
///
/// # Errors
/// Returns [`StorageBuildError`] when the pool, migrations or HTTP client
/// cannot be set up.
pub async fn build_storage_ports(
    settings: &StorageSettings,
) -> Result<StoragePorts, StorageBuildError> {
    match settings {
        StorageSettings::Memory => {
            warn!("using in-memory storage; data is lost on restart");
            Ok(MemoryStore::new().ports())
        }
        StorageSettings::Postgres {
            pool,
            run_migrations,
        } => {
            if *run_migrations {
                let url = pool.database_url.clone();
                let applied = tokio::task::spawn_blocking(move || run_pending_migrations(&url))
                    .await
                    .map_err(|err| StorageBuildError::MigrationTask(err.to_string()))??;
                info!(applied, "database migrations up to date");
            }
            let db_pool = DbPool::new(pool.pool_config()).await?;
            info!(max_connections = pool.max_connections, "postgres storage ready");
            Ok(diesel_ports(&db_pool))
        }
        StorageSettings::Remote { base_url, timeout } => {
            let store = RemoteStore::new(base_url.clone(), *timeout)?;
            info!(%base_url, "proxying storage to remote service");
            Ok(store.ports())
        }
    }
}
