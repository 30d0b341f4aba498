//! Port for per-fiscal-year dropdown option sets.

use async_trait::async_trait;

use crate::domain::{DropdownOptions, FiscalYear};

use super::define_port_error;

define_port_error! {
    /// Errors raised by dropdown option adapters.
    pub enum DropdownOptionsRepositoryError {
        /// Storage could not be reached.
        Connection { message: String } =>
            "dropdown option store connection failed: {message}" as ServiceUnavailable,
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "dropdown option store query failed: {message}" as InternalError,
    }
}

/// Port for reading and replacing dropdown option sets.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DropdownOptionsRepository: Send + Sync {
    /// Fetch the stored option set. `None` means nothing has been saved.
    async fn find(
        &self,
        fiscal_year: &FiscalYear,
    ) -> Result<Option<DropdownOptions>, DropdownOptionsRepositoryError>;

    /// Replace the whole option set for a fiscal year.
    async fn replace(
        &self,
        fiscal_year: &FiscalYear,
        options: &DropdownOptions,
    ) -> Result<(), DropdownOptionsRepositoryError>;
}
