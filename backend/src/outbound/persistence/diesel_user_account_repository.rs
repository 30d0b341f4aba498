//! PostgreSQL-backed `UserAccountRepository`.
//!
//! `users.email` and `users.username` carry case-insensitive unique indexes;
//! a race between two registrations surfaces as a conflict from `insert`.

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserAccountRepository, UserAccountRepositoryError};
use crate::domain::{StoredAccount, UserAccount, UserId};

use super::diesel_basic_error_mapping::{map_basic_pool_error, map_diesel_error_with_conflict};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

diesel::define_sql_function!(fn lower(value: Text) -> Text);

/// Diesel-backed [`UserAccountRepository`].
#[derive(Clone)]
pub struct DieselUserAccountRepository {
    pool: DbPool,
}

impl DieselUserAccountRepository {
    /// Construct over a shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserAccountRepositoryError {
    map_basic_pool_error(error, UserAccountRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserAccountRepositoryError {
    map_diesel_error_with_conflict(
        error,
        UserAccountRepositoryError::query,
        UserAccountRepositoryError::connection,
        UserAccountRepositoryError::conflict,
    )
}

fn row_to_stored(row: UserRow) -> StoredAccount {
    StoredAccount {
        account: UserAccount {
            id: UserId::from_uuid(row.id),
            username: row.username,
            email: row.email,
            created_at: row.created_at,
        },
        password_hash: row.password_hash,
    }
}

#[async_trait]
impl UserAccountRepository for DieselUserAccountRepository {
    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<StoredAccount>, UserAccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(lower(users::email).eq(email.to_lowercase()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(row_to_stored))
    }

    async fn exists(&self, email: &str, username: &str) -> Result<bool, UserAccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(exists(
            users::table.filter(
                lower(users::email)
                    .eq(email.to_lowercase())
                    .or(lower(users::username).eq(username.to_lowercase())),
            ),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn insert(
        &self,
        account: &UserAccount,
        password_hash: &str,
    ) -> Result<(), UserAccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(users::table)
            .values(&NewUserRow {
                id: *account.id.as_uuid(),
                username: &account.username,
                email: &account.email,
                password_hash,
                created_at: account.created_at,
            })
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }
}
