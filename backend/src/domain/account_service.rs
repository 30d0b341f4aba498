//! Registration and login.
//!
//! Password hashing runs on the blocking pool. Login failures never reveal
//! whether the email is registered.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::domain::ports::{UserAccountRepository, UserAccountRepositoryError};
use crate::domain::{
    Error, LoginCredentials, Registration, UserAccount, UserId, spawn_blocking_scoped,
};

/// bcrypt work factor for new hashes.
pub const DEFAULT_HASH_COST: u32 = 10;

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const DUPLICATE_ACCOUNT: &str = "User with this email or username already exists";

/// Registration and login over the account port.
#[derive(Clone)]
pub struct AccountService {
    accounts: Arc<dyn UserAccountRepository>,
    hash_cost: u32,
}

impl AccountService {
    /// Construct with the default bcrypt cost.
    pub fn new(accounts: Arc<dyn UserAccountRepository>) -> Self {
        Self::with_hash_cost(accounts, DEFAULT_HASH_COST)
    }

    /// Construct with a custom bcrypt cost (4..=31).
    pub fn with_hash_cost(accounts: Arc<dyn UserAccountRepository>, hash_cost: u32) -> Self {
        Self {
            accounts,
            hash_cost,
        }
    }

    /// Create an account. Email and username must both be unused.
    pub async fn register(&self, registration: &Registration) -> Result<UserAccount, Error> {
        if self
            .accounts
            .exists(registration.email(), registration.username())
            .await?
        {
            return Err(Error::conflict(DUPLICATE_ACCOUNT));
        }

        let password = Zeroizing::new(registration.password().to_owned());
        let cost = self.hash_cost;
        let password_hash = spawn_blocking_scoped(move || bcrypt::hash(password.as_str(), cost))
            .await
            .map_err(|err| Error::internal(format!("password hashing task failed: {err}")))?
            .map_err(|err| Error::internal(format!("password hashing failed: {err}")))?;

        let account = UserAccount {
            id: UserId::random(),
            username: registration.username().to_owned(),
            email: registration.email().to_owned(),
            created_at: Utc::now(),
        };
        self.accounts
            .insert(&account, &password_hash)
            .await
            .map_err(|err| match err {
                UserAccountRepositoryError::Conflict { .. } => Error::conflict(DUPLICATE_ACCOUNT),
                other => other.into(),
            })?;
        info!(user_id = %account.id, "account registered");
        Ok(account)
    }

    /// Verify credentials and return the matching account.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<UserAccount, Error> {
        let Some(stored) = self.accounts.find_by_email(credentials.email()).await? else {
            debug!("login for unknown email");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        let password = Zeroizing::new(credentials.password().to_owned());
        let hash = stored.password_hash;
        let verified = spawn_blocking_scoped(move || bcrypt::verify(password.as_str(), &hash))
            .await
            .map_err(|err| Error::internal(format!("password check task failed: {err}")))?
            .unwrap_or_else(|err| {
                debug!(%err, "stored password hash is unreadable");
                false
            });
        if !verified {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        info!(user_id = %stored.account.id, "login succeeded");
        Ok(stored.account)
    }
}
