//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Each storage backend (Diesel, in-memory, remote proxy) implements every
//! port below and hands them to the services as a [`StoragePorts`] bundle.

mod macros;
pub(crate) use macros::define_port_error;

mod dropdown_options_repository;
mod location_relationship_repository;
mod storage_health;
mod table_data_repository;
mod user_account_repository;
mod variable_repository;

use std::sync::Arc;

#[cfg(test)]
pub use dropdown_options_repository::MockDropdownOptionsRepository;
pub use dropdown_options_repository::{DropdownOptionsRepository, DropdownOptionsRepositoryError};
#[cfg(test)]
pub use location_relationship_repository::MockLocationRelationshipRepository;
pub use location_relationship_repository::{
    LocationRelationshipRepository, LocationRelationshipRepositoryError,
};
#[cfg(test)]
pub use storage_health::MockStorageHealthProbe;
pub use storage_health::{StorageHealth, StorageHealthError, StorageHealthProbe};
#[cfg(test)]
pub use table_data_repository::MockTableDataRepository;
pub use table_data_repository::{TableDataRepository, TableDataRepositoryError};
#[cfg(test)]
pub use user_account_repository::MockUserAccountRepository;
pub use user_account_repository::{UserAccountRepository, UserAccountRepositoryError};
#[cfg(test)]
pub use variable_repository::MockVariableRepository;
pub use variable_repository::{VariableRepository, VariableRepositoryError};

/// Every driven port a storage backend provides.
#[derive(Clone)]
pub struct StoragePorts {
    /// Versioned record sets.
    pub tables: Arc<dyn TableDataRepository>,
    /// Dropdown option lists.
    pub dropdowns: Arc<dyn DropdownOptionsRepository>,
    /// Location to code mappings.
    pub relationships: Arc<dyn LocationRelationshipRepository>,
    /// Registered accounts.
    pub accounts: Arc<dyn UserAccountRepository>,
    /// Named JSON values.
    pub variables: Arc<dyn VariableRepository>,
    /// Backend reachability.
    pub health: Arc<dyn StorageHealthProbe>,
}
