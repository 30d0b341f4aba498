//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and remain testable against any storage
//! backend.

use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::ports::{StoragePorts, StorageHealthProbe};
use crate::domain::{
    AccountService, CapacityTableService, DEFAULT_HASH_COST, MasterDataService, VariableService,
};

/// Settings that shape service construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpStateConfig {
    /// Directory scanned by the fixture import endpoint.
    pub fixtures_dir: PathBuf,
    /// bcrypt work factor for new password hashes.
    pub hash_cost: u32,
}

impl Default for HttpStateConfig {
    fn default() -> Self {
        Self {
            fixtures_dir: PathBuf::from("fixtures"),
            hash_cost: DEFAULT_HASH_COST,
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Table data, backups and import.
    pub tables: CapacityTableService,
    /// Dropdowns and location relationships.
    pub master_data: MasterDataService,
    /// Registration and login.
    pub accounts: AccountService,
    /// Named variables.
    pub variables: VariableService,
    /// Storage check for `/api/health`.
    pub storage_health: Arc<dyn StorageHealthProbe>,
}

impl HttpState {
    /// Build every service from one backend's ports.
    ///
    /// # Examples
    /// ```
    /// use capacity_backend::inbound::http::state::{HttpState, HttpStateConfig};
    /// use capacity_backend::outbound::memory::MemoryStore;
    ///
    /// let state = HttpState::new(MemoryStore::new().ports(), HttpStateConfig::default());
    /// let _tables = state.tables.clone();
    /// ```
    pub fn new(ports: StoragePorts, config: HttpStateConfig) -> Self {
        let StoragePorts {
            tables,
            dropdowns,
            relationships,
            accounts,
            variables,
            health,
        } = ports;
        Self {
            tables: CapacityTableService::new(tables, Arc::clone(&relationships), config.fixtures_dir),
            master_data: MasterDataService::new(dropdowns, relationships),
            accounts: AccountService::with_hash_cost(accounts, config.hash_cost),
            variables: VariableService::new(variables),
            storage_health: health,
        }
    }
}
