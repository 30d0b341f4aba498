//! Port for location → location-code lookups.

use async_trait::async_trait;

use crate::domain::{FiscalYear, LocationRelationship};

use super::define_port_error;

define_port_error! {
    /// Errors raised by location relationship adapters.
    pub enum LocationRelationshipRepositoryError {
        /// Storage could not be reached.
        Connection { message: String } =>
            "location relationship store connection failed: {message}" as ServiceUnavailable,
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "location relationship store query failed: {message}" as InternalError,
    }
}

/// Port for per-fiscal-year location to code mappings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocationRelationshipRepository: Send + Sync {
    /// Fetch stored relationships. `None` means nothing has been saved.
    async fn find(
        &self,
        fiscal_year: &FiscalYear,
    ) -> Result<Option<Vec<LocationRelationship>>, LocationRelationshipRepositoryError>;

    /// Replace every relationship for a fiscal year.
    async fn replace(
        &self,
        fiscal_year: &FiscalYear,
        relationships: &[LocationRelationship],
    ) -> Result<(), LocationRelationshipRepositoryError>;
}
