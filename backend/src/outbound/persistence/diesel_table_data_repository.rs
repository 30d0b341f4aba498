//! PostgreSQL-backed `TableDataRepository`.
//!
//! Every mutation of a fiscal year takes a transaction-scoped advisory lock
//! on that fiscal year first, so concurrent saves cannot both compute the
//! same next version or leave two active rows.

use async_trait::async_trait;
use chrono::Utc;
use diesel::dsl::{exists, max};
use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{TableDataRepository, TableDataRepositoryError};
use crate::domain::{CapacityRecord, DeleteOutcome, FiscalYear, TableSnapshot, next_version};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewTableDataRow, TableDataRow};
use super::pool::{DbPool, PoolError};
use super::schema::table_data;

/// Diesel-backed [`TableDataRepository`](crate::domain::ports::TableDataRepository).
#[derive(Clone)]
pub struct DieselTableDataRepository {
    pool: DbPool,
}

impl DieselTableDataRepository {
    /// Construct over a shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> TableDataRepositoryError {
    map_basic_pool_error(error, TableDataRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> TableDataRepositoryError {
    map_basic_diesel_error(
        error,
        TableDataRepositoryError::query,
        TableDataRepositoryError::connection,
    )
}

fn row_to_snapshot(row: TableDataRow) -> Result<TableSnapshot, TableDataRepositoryError> {
    let fiscal_year = FiscalYear::new(&row.fiscal_year).map_err(|err| {
        TableDataRepositoryError::query(format!("stored fiscal year is invalid: {err}"))
    })?;
    let data: Vec<CapacityRecord> = serde_json::from_value(row.data).map_err(|err| {
        TableDataRepositoryError::query(format!(
            "stored records for {fiscal_year} v{} are unreadable: {err}",
            row.version
        ))
    })?;
    Ok(TableSnapshot {
        id: row.id,
        fiscal_year,
        data,
        version: row.version,
        is_deleted: row.is_deleted,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

async fn lock_fiscal_year(
    conn: &mut AsyncPgConnection,
    fiscal_year: &str,
) -> Result<(), diesel::result::Error> {
    diesel::sql_query("SELECT pg_advisory_xact_lock(hashtext($1))")
        .bind::<Text, _>(fiscal_year)
        .execute(conn)
        .await?;
    Ok(())
}

async fn archive_active(
    conn: &mut AsyncPgConnection,
    fiscal_year: &str,
) -> Result<usize, diesel::result::Error> {
    diesel::update(
        table_data::table
            .filter(table_data::fiscal_year.eq(fiscal_year))
            .filter(table_data::is_deleted.eq(false)),
    )
    .set((
        table_data::is_deleted.eq(true),
        table_data::updated_at.eq(Utc::now()),
    ))
    .execute(conn)
    .await
}

/// Archive the active row and insert `data` as the next version.
async fn insert_next_version(
    conn: &mut AsyncPgConnection,
    fiscal_year: &str,
    data: &serde_json::Value,
) -> Result<i32, diesel::result::Error> {
    let current: Option<i32> = table_data::table
        .filter(table_data::fiscal_year.eq(fiscal_year))
        .select(max(table_data::version))
        .first(conn)
        .await?;
    archive_active(conn, fiscal_year).await?;
    let version = next_version(current);
    diesel::insert_into(table_data::table)
        .values(&NewTableDataRow {
            fiscal_year,
            data,
            version,
        })
        .execute(conn)
        .await?;
    Ok(version)
}

#[async_trait]
impl TableDataRepository for DieselTableDataRepository {
    async fn find_active(
        &self,
        fiscal_year: &FiscalYear,
    ) -> Result<Option<TableSnapshot>, TableDataRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = table_data::table
            .filter(table_data::fiscal_year.eq(fiscal_year.as_str()))
            .filter(table_data::is_deleted.eq(false))
            .order(table_data::version.desc())
            .select(TableDataRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_snapshot).transpose()
    }

    async fn save(
        &self,
        fiscal_year: &FiscalYear,
        records: &[CapacityRecord],
    ) -> Result<i32, TableDataRepositoryError> {
        let data = serde_json::to_value(records).map_err(|err| {
            TableDataRepositoryError::query(format!("records could not be encoded: {err}"))
        })?;
        let fiscal_year = fiscal_year.as_str();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| {
            async move {
                lock_fiscal_year(conn, fiscal_year).await?;
                insert_next_version(conn, fiscal_year, &data).await
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn soft_delete(
        &self,
        fiscal_year: &FiscalYear,
    ) -> Result<DeleteOutcome, TableDataRepositoryError> {
        let fiscal_year = fiscal_year.as_str();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| {
            async move {
                lock_fiscal_year(conn, fiscal_year).await?;
                if archive_active(conn, fiscal_year).await? > 0 {
                    return Ok(DeleteOutcome::Deleted);
                }
                let has_history: bool = diesel::select(exists(
                    table_data::table.filter(table_data::fiscal_year.eq(fiscal_year)),
                ))
                .get_result(conn)
                .await?;
                Ok(if has_history {
                    DeleteOutcome::AlreadyDeleted
                } else {
                    DeleteOutcome::NotFound
                })
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn list_versions(
        &self,
        fiscal_year: &FiscalYear,
    ) -> Result<Vec<TableSnapshot>, TableDataRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = table_data::table
            .filter(table_data::fiscal_year.eq(fiscal_year.as_str()))
            .order(table_data::version.desc())
            .select(TableDataRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_snapshot).collect()
    }

    async fn restore_version(
        &self,
        fiscal_year: &FiscalYear,
        version: i32,
    ) -> Result<Option<i32>, TableDataRepositoryError> {
        let fiscal_year = fiscal_year.as_str();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| {
            async move {
                lock_fiscal_year(conn, fiscal_year).await?;
                let source: Option<serde_json::Value> = table_data::table
                    .filter(table_data::fiscal_year.eq(fiscal_year))
                    .filter(table_data::version.eq(version))
                    .select(table_data::data)
                    .first(conn)
                    .await
                    .optional()?;
                match source {
                    None => Ok(None),
                    Some(data) => insert_next_version(conn, fiscal_year, &data).await.map(Some),
                }
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn purge_version(
        &self,
        fiscal_year: &FiscalYear,
        version: i32,
    ) -> Result<bool, TableDataRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            table_data::table
                .filter(table_data::fiscal_year.eq(fiscal_year.as_str()))
                .filter(table_data::version.eq(version))
                .filter(table_data::is_deleted.eq(true)),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
