//! PostgreSQL-backed dropdown option and location relationship storage.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{
    DropdownOptionsRepository, DropdownOptionsRepositoryError, LocationRelationshipRepository,
    LocationRelationshipRepositoryError,
};
use crate::domain::{DropdownOptions, FiscalYear, LocationRelationship};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{
    DropdownOptionsRow, DropdownOptionsUpsert, LocationRelationshipRow,
    NewLocationRelationshipRow,
};
use super::pool::DbPool;
use super::schema::{dropdown_options, location_relationships};

/// Diesel adapter for both master-data ports.
#[derive(Clone)]
pub struct DieselMasterDataRepository {
    pool: DbPool,
}

impl DieselMasterDataRepository {
    /// Construct over a shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_options_error(error: diesel::result::Error) -> DropdownOptionsRepositoryError {
    map_basic_diesel_error(
        error,
        DropdownOptionsRepositoryError::query,
        DropdownOptionsRepositoryError::connection,
    )
}

fn map_relationship_error(error: diesel::result::Error) -> LocationRelationshipRepositoryError {
    map_basic_diesel_error(
        error,
        LocationRelationshipRepositoryError::query,
        LocationRelationshipRepositoryError::connection,
    )
}

#[async_trait]
impl DropdownOptionsRepository for DieselMasterDataRepository {
    async fn find(
        &self,
        fiscal_year: &FiscalYear,
    ) -> Result<Option<DropdownOptions>, DropdownOptionsRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_basic_pool_error(err, DropdownOptionsRepositoryError::connection))?;
        let row = dropdown_options::table
            .filter(dropdown_options::fiscal_year.eq(fiscal_year.as_str()))
            .select(DropdownOptionsRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_options_error)?;
        row.map(|row| {
            serde_json::from_value(row.options).map_err(|err| {
                DropdownOptionsRepositoryError::query(format!(
                    "stored options for {fiscal_year} are unreadable: {err}"
                ))
            })
        })
        .transpose()
    }

    async fn replace(
        &self,
        fiscal_year: &FiscalYear,
        options: &DropdownOptions,
    ) -> Result<(), DropdownOptionsRepositoryError> {
        let encoded = serde_json::to_value(options).map_err(|err| {
            DropdownOptionsRepositoryError::query(format!("options could not be encoded: {err}"))
        })?;
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_basic_pool_error(err, DropdownOptionsRepositoryError::connection))?;
        diesel::insert_into(dropdown_options::table)
            .values(&DropdownOptionsUpsert {
                fiscal_year: fiscal_year.as_str(),
                options: &encoded,
                updated_at: Utc::now(),
            })
            .on_conflict(dropdown_options::fiscal_year)
            .do_update()
            .set((
                dropdown_options::options.eq(excluded(dropdown_options::options)),
                dropdown_options::updated_at.eq(excluded(dropdown_options::updated_at)),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_options_error)?;
        Ok(())
    }
}

#[async_trait]
impl LocationRelationshipRepository for DieselMasterDataRepository {
    async fn find(
        &self,
        fiscal_year: &FiscalYear,
    ) -> Result<Option<Vec<LocationRelationship>>, LocationRelationshipRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| {
            map_basic_pool_error(err, LocationRelationshipRepositoryError::connection)
        })?;
        let rows = location_relationships::table
            .filter(location_relationships::fiscal_year.eq(fiscal_year.as_str()))
            .order(location_relationships::position.asc())
            .select(LocationRelationshipRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_relationship_error)?;
        if rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(
            rows.into_iter()
                .map(|row| LocationRelationship::new(row.location, row.location_code))
                .collect(),
        ))
    }

    async fn replace(
        &self,
        fiscal_year: &FiscalYear,
        relationships: &[LocationRelationship],
    ) -> Result<(), LocationRelationshipRepositoryError> {
        let rows = relationships
            .iter()
            .enumerate()
            .map(|(index, relationship)| {
                i32::try_from(index)
                    .map(|position| NewLocationRelationshipRow {
                        fiscal_year: fiscal_year.as_str(),
                        location: &relationship.location,
                        location_code: &relationship.location_code,
                        position,
                    })
                    .map_err(|_| {
                        LocationRelationshipRepositoryError::query("too many relationships")
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let fiscal_year = fiscal_year.as_str();
        let mut conn = self.pool.get().await.map_err(|err| {
            map_basic_pool_error(err, LocationRelationshipRepositoryError::connection)
        })?;
        conn.transaction(|conn| {
            async move {
                diesel::delete(
                    location_relationships::table
                        .filter(location_relationships::fiscal_year.eq(fiscal_year)),
                )
                .execute(conn)
                .await?;
                if !rows.is_empty() {
                    diesel::insert_into(location_relationships::table)
                        .values(&rows)
                        .execute(conn)
                        .await?;
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_relationship_error)
    }
}
