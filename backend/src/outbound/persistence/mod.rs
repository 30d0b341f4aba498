//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repositories translate between Diesel rows (`models.rs`, `schema.rs`)
//! and domain types. Connections come from a `bb8` pool through
//! `diesel-async`; every database failure is mapped onto the owning port's
//! error enum.
//!
//! # Example
//!
//! ```no_run
//! use capacity_backend::outbound::persistence::{DbPool, PoolConfig, diesel_ports};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/capacity")).await?;
//! let ports = diesel_ports(&pool);
//! # let _ = ports;
//! # Ok(())
//! # }
//! ```

mod diesel_basic_error_mapping;
mod diesel_master_data_repository;
mod diesel_storage_health;
mod diesel_table_data_repository;
mod diesel_user_account_repository;
mod diesel_variable_repository;
mod migrations;
mod models;
mod pool;
mod schema;

use std::sync::Arc;

use crate::domain::ports::StoragePorts;

pub use diesel_master_data_repository::DieselMasterDataRepository;
pub use diesel_storage_health::DieselStorageHealthProbe;
pub use diesel_table_data_repository::DieselTableDataRepository;
pub use diesel_user_account_repository::DieselUserAccountRepository;
pub use diesel_variable_repository::DieselVariableRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};

/// Every storage port backed by `pool`.
pub fn diesel_ports(pool: &DbPool) -> StoragePorts {
    let master_data = Arc::new(DieselMasterDataRepository::new(pool.clone()));
    StoragePorts {
        tables: Arc::new(DieselTableDataRepository::new(pool.clone())),
        dropdowns: master_data.clone(),
        relationships: master_data,
        accounts: Arc::new(DieselUserAccountRepository::new(pool.clone())),
        variables: Arc::new(DieselVariableRepository::new(pool.clone())),
        health: Arc::new(DieselStorageHealthProbe::new(pool.clone())),
    }
}
