//! Port for the named-variable store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{SetOutcome, VariableKey, VariableScope};

use super::define_port_error;

define_port_error! {
    /// Errors raised by variable store adapters.
    pub enum VariableRepositoryError {
        /// Storage could not be reached.
        Connection { message: String } =>
            "variable store connection failed: {message}" as ServiceUnavailable,
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "variable store query failed: {message}" as InternalError,
        /// The configured backend cannot store variables.
        Unsupported { operation: String } =>
            "{operation} not implemented in proxy mode" as NotImplemented,
    }
}

/// Port for key → JSON value storage, partitioned by scope.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VariableRepository: Send + Sync {
    /// Fetch one value. `None` when the key is unset in `scope`.
    async fn get(
        &self,
        key: &VariableKey,
        scope: VariableScope,
    ) -> Result<Option<Value>, VariableRepositoryError>;

    /// Every variable in `scope`, ordered by key.
    async fn list(
        &self,
        scope: VariableScope,
    ) -> Result<BTreeMap<String, Value>, VariableRepositoryError>;

    /// Insert or replace a value.
    async fn set(
        &self,
        key: &VariableKey,
        scope: VariableScope,
        value: &Value,
    ) -> Result<SetOutcome, VariableRepositoryError>;

    /// Remove a value. Returns `false` when nothing was stored.
    async fn delete(
        &self,
        key: &VariableKey,
        scope: VariableScope,
    ) -> Result<bool, VariableRepositoryError>;
}
