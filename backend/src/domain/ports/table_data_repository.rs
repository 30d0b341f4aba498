//! Port for versioned table-data persistence.
//!
//! A fiscal year owns a sequence of snapshots. At most one is active; the
//! rest are archived backups. Adapters must keep that invariant across
//! concurrent saves.

use async_trait::async_trait;

use crate::domain::{CapacityRecord, DeleteOutcome, FiscalYear, TableSnapshot};

use super::define_port_error;

define_port_error! {
    /// Errors raised by table-data repository adapters.
    pub enum TableDataRepositoryError {
        /// Storage could not be reached.
        Connection { message: String } =>
            "table data store connection failed: {message}" as ServiceUnavailable,
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "table data store query failed: {message}" as InternalError,
    }
}

/// Port for reading and writing fiscal-year record sets.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TableDataRepository: Send + Sync {
    /// Fetch the active snapshot, if any.
    async fn find_active(
        &self,
        fiscal_year: &FiscalYear,
    ) -> Result<Option<TableSnapshot>, TableDataRepositoryError>;

    /// Archive the active snapshot and store `records` as the next version.
    ///
    /// Returns the version number assigned to the new snapshot.
    async fn save(
        &self,
        fiscal_year: &FiscalYear,
        records: &[CapacityRecord],
    ) -> Result<i32, TableDataRepositoryError>;

    /// Archive the active snapshot without replacing it.
    async fn soft_delete(
        &self,
        fiscal_year: &FiscalYear,
    ) -> Result<DeleteOutcome, TableDataRepositoryError>;

    /// Every stored snapshot, newest version first.
    async fn list_versions(
        &self,
        fiscal_year: &FiscalYear,
    ) -> Result<Vec<TableSnapshot>, TableDataRepositoryError>;

    /// Copy the data of `version` forward as a new active version, archiving
    /// the current one. Restoring the active version bumps it.
    ///
    /// Returns the active version number afterwards, or `None` when
    /// `version` does not exist.
    async fn restore_version(
        &self,
        fiscal_year: &FiscalYear,
        version: i32,
    ) -> Result<Option<i32>, TableDataRepositoryError>;

    /// Hard-delete one archived version. Returns `false` when the version is
    /// missing or active.
    async fn purge_version(
        &self,
        fiscal_year: &FiscalYear,
        version: i32,
    ) -> Result<bool, TableDataRepositoryError>;
}
