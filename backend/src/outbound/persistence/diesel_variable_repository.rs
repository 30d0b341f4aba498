//! PostgreSQL-backed `VariableRepository`.
//!
//! Global variables have a `NULL` owner. Uniqueness of `(owner, key)` is
//! enforced by an expression index that treats `NULL` as one owner.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use serde_json::Value;

use crate::domain::ports::{VariableRepository, VariableRepositoryError};
use crate::domain::{SetOutcome, VariableKey, VariableScope};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewVariableRow, VariableRow};
use super::pool::{DbPool, PoolError};
use super::schema::variables;

/// Diesel-backed [`VariableRepository`](crate::domain::ports::VariableRepository).
#[derive(Clone)]
pub struct DieselVariableRepository {
    pool: DbPool,
}

impl DieselVariableRepository {
    /// Construct over a shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> VariableRepositoryError {
    map_basic_pool_error(error, VariableRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> VariableRepositoryError {
    map_basic_diesel_error(
        error,
        VariableRepositoryError::query,
        VariableRepositoryError::connection,
    )
}

/// Rows owned by `scope`.
fn in_scope(scope: VariableScope) -> variables::BoxedQuery<'static, Pg> {
    let query = variables::table.into_boxed();
    match scope {
        Some(user_id) => query.filter(variables::user_id.eq(*user_id.as_uuid())),
        None => query.filter(variables::user_id.is_null()),
    }
}

#[async_trait]
impl VariableRepository for DieselVariableRepository {
    async fn get(
        &self,
        key: &VariableKey,
        scope: VariableScope,
    ) -> Result<Option<Value>, VariableRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        in_scope(scope)
            .filter(variables::key.eq(key.as_str().to_owned()))
            .select(variables::value)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)
    }

    async fn list(
        &self,
        scope: VariableScope,
    ) -> Result<BTreeMap<String, Value>, VariableRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = in_scope(scope)
            .select(VariableRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(|row| (row.key, row.value)).collect())
    }

    async fn set(
        &self,
        key: &VariableKey,
        scope: VariableScope,
        value: &Value,
    ) -> Result<SetOutcome, VariableRepositoryError> {
        let key = key.as_str();
        let owner = scope.map(|user_id| *user_id.as_uuid());
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| {
            async move {
                let existing: Option<i64> = in_scope(scope)
                    .filter(variables::key.eq(key.to_owned()))
                    .select(variables::id)
                    .first(conn)
                    .await
                    .optional()?;
                match existing {
                    Some(id) => {
                        diesel::update(variables::table.find(id))
                            .set((
                                variables::value.eq(value),
                                variables::updated_at.eq(Utc::now()),
                            ))
                            .execute(conn)
                            .await?;
                        Ok(SetOutcome::Updated)
                    }
                    None => {
                        diesel::insert_into(variables::table)
                            .values(&NewVariableRow {
                                key,
                                user_id: owner,
                                value,
                            })
                            .execute(conn)
                            .await?;
                        Ok(SetOutcome::Created)
                    }
                }
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn delete(
        &self,
        key: &VariableKey,
        scope: VariableScope,
    ) -> Result<bool, VariableRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let by_key = variables::table.filter(variables::key.eq(key.as_str()));
        let deleted = match scope {
            Some(user_id) => {
                diesel::delete(by_key.filter(variables::user_id.eq(*user_id.as_uuid())))
                    .execute(&mut conn)
                    .await
            }
            None => {
                diesel::delete(by_key.filter(variables::user_id.is_null()))
                    .execute(&mut conn)
                    .await
            }
        }
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
