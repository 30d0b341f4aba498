//! Port for account persistence used by registration and login.
//!
//! Email lookups are exact: callers pass the normalised (lower-cased)
//! address. Username uniqueness is case-insensitive.

use async_trait::async_trait;

use crate::domain::{StoredAccount, UserAccount};

use super::define_port_error;

define_port_error! {
    /// Errors raised by account repository adapters.
    pub enum UserAccountRepositoryError {
        /// Storage could not be reached.
        Connection { message: String } =>
            "account store connection failed: {message}" as ServiceUnavailable,
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "account store query failed: {message}" as InternalError,
        /// A unique constraint rejected the insert.
        Conflict { message: String } => "{message}" as Conflict,
        /// The configured backend cannot store accounts.
        Unsupported { operation: String } =>
            "{operation} not implemented in proxy mode" as NotImplemented,
    }
}

/// Port for account storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserAccountRepository: Send + Sync {
    /// Load an account and its password hash by email.
    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<StoredAccount>, UserAccountRepositoryError>;

    /// Whether any account already uses `email` or `username`.
    async fn exists(&self, email: &str, username: &str) -> Result<bool, UserAccountRepositoryError>;

    /// Insert a new account.
    ///
    /// Returns [`UserAccountRepositoryError::Conflict`] when a concurrent
    /// registration claimed the email or username first.
    async fn insert(
        &self,
        account: &UserAccount,
        password_hash: &str,
    ) -> Result<(), UserAccountRepositoryError>;
}
