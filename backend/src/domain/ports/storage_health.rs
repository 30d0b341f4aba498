//! Port for checking that the configured storage backend is reachable.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised when a storage probe fails.
    pub enum StorageHealthError {
        /// The backend did not answer.
        Unavailable { message: String } =>
            "storage unavailable: {message}" as ServiceUnavailable,
    }
}

/// Result of a successful probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageHealth {
    /// Backend label, e.g. `postgres`.
    pub backend: String,
    /// Human-readable detail such as `connected`.
    pub detail: String,
}

impl StorageHealth {
    /// Build a health report.
    pub fn new(backend: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            detail: detail.into(),
        }
    }
}

/// Port used by readiness and `/api/health` to check storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StorageHealthProbe: Send + Sync {
    /// Round-trip to the backend.
    async fn probe(&self) -> Result<StorageHealth, StorageHealthError>;
}
