//! Backup (archived version) API handlers.
//!
//! ```text
//! GET    /api/backup-data?fiscalYear=FY_25
//! POST   /api/backup-data/restore {"fiscalYear":"FY_25","version":2}
//! DELETE /api/backup-data?fiscalYear=FY_25&version=2
//! ```
//!
//! `POST /api/backup-data` is accepted as an alias for the restore call.

use actix_web::{delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Error, FiscalYear, TableSnapshot};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::table_data::{FiscalYearQuery, MessageResponse};
use crate::inbound::http::validation::required_fiscal_year;

const VERSION_REQUIRED: &str = "fiscalYear and version are required";

/// Version history for one fiscal year.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BackupList {
    /// Fiscal year listed.
    #[schema(value_type = String, example = "FY_25")]
    pub fiscal_year: FiscalYear,
    /// Newest version first, including the active one.
    pub backups: Vec<TableSnapshot>,
    /// Number of entries in `backups`.
    pub count: usize,
}

/// Selects one stored version.
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct VersionSelector {
    /// Fiscal year; required.
    pub fiscal_year: Option<String>,
    /// Version number; required and positive.
    pub version: Option<i32>,
}

impl VersionSelector {
    fn parse(&self) -> Result<(FiscalYear, i32), Error> {
        let (Some(raw), Some(version)) = (self.fiscal_year.as_deref(), self.version) else {
            return Err(Error::invalid_request(VERSION_REQUIRED));
        };
        if raw.trim().is_empty() {
            return Err(Error::invalid_request(VERSION_REQUIRED));
        }
        if version < 1 {
            return Err(Error::invalid_request("version must be a positive integer"));
        }
        Ok((required_fiscal_year(Some(raw))?, version))
    }
}

/// Reply to a restore.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RestoreResponse {
    /// Fixed confirmation text.
    #[schema(example = "Backup restored successfully")]
    pub message: &'static str,
    /// Fiscal year restored.
    #[schema(value_type = String, example = "FY_25")]
    pub fiscal_year: FiscalYear,
    /// Version whose data was copied.
    pub restored_from: i32,
    /// Version now active.
    pub version: i32,
}

/// List stored versions for a fiscal year.
#[utoipa::path(
    get,
    path = "/api/backup-data",
    params(FiscalYearQuery),
    responses(
        (status = 200, description = "Version history", body = BackupList),
        (status = 400, description = "Missing fiscal year", body = Error)
    ),
    tags = ["backups"],
    operation_id = "listBackups",
    security([])
)]
#[get("/backup-data")]
pub async fn list_backups(
    state: web::Data<HttpState>,
    query: web::Query<FiscalYearQuery>,
) -> ApiResult<web::Json<BackupList>> {
    let fiscal_year = required_fiscal_year(query.fiscal_year.as_deref())?;
    let backups = state.tables.backups(&fiscal_year).await?;
    Ok(web::Json(BackupList {
        fiscal_year,
        count: backups.len(),
        backups,
    }))
}

async fn restore(
    state: &HttpState,
    session: &SessionContext,
    selector: &VersionSelector,
) -> ApiResult<web::Json<RestoreResponse>> {
    session.require_user_id()?;
    let (fiscal_year, version) = selector.parse()?;
    let active = state.tables.restore(&fiscal_year, version).await?;
    Ok(web::Json(RestoreResponse {
        message: "Backup restored successfully",
        fiscal_year,
        restored_from: version,
        version: active,
    }))
}

/// Make an archived version active again.
#[utoipa::path(
    post,
    path = "/api/backup-data/restore",
    request_body = VersionSelector,
    responses(
        (status = 200, description = "Restored", body = RestoreResponse),
        (status = 400, description = "Missing fields", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Backup not found", body = Error)
    ),
    tags = ["backups"],
    operation_id = "restoreBackup"
)]
#[post("/backup-data/restore")]
pub async fn restore_backup(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<VersionSelector>,
) -> ApiResult<web::Json<RestoreResponse>> {
    restore(&state, &session, &payload).await
}

/// Alias of [`restore_backup`] at the collection path.
#[post("/backup-data")]
pub async fn restore_backup_alias(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<VersionSelector>,
) -> ApiResult<web::Json<RestoreResponse>> {
    restore(&state, &session, &payload).await
}

/// Permanently remove an archived version.
#[utoipa::path(
    delete,
    path = "/api/backup-data",
    params(VersionSelector),
    responses(
        (status = 200, description = "Purged", body = MessageResponse),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Backup not found or active", body = Error)
    ),
    tags = ["backups"],
    operation_id = "purgeBackup"
)]
#[delete("/backup-data")]
pub async fn purge_backup(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<VersionSelector>,
) -> ApiResult<web::Json<MessageResponse>> {
    session.require_user_id()?;
    let (fiscal_year, version) = query.parse()?;
    state.tables.purge_backup(&fiscal_year, version).await?;
    Ok(web::Json(MessageResponse::new("Backup deleted successfully")))
}
