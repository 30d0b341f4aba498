//! Fixture import handler.

use actix_web::{post, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Error, ImportOutcome};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Reply to `POST /api/import-data`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ImportResponse {
    /// Summary line.
    pub message: String,
    /// One entry per fixture file.
    pub results: Vec<ImportOutcome>,
}

/// Load every `{FY}.json` file from the fixtures directory.
#[utoipa::path(
    post,
    path = "/api/import-data",
    responses(
        (status = 200, description = "Per-file results", body = ImportResponse),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Fixtures directory missing", body = Error)
    ),
    tags = ["table-data"],
    operation_id = "importData"
)]
#[post("/import-data")]
pub async fn import_data(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<ImportResponse>> {
    session.require_user_id()?;
    let results = state.tables.import_fixtures().await?;
    let imported = results.iter().filter(|result| result.version.is_some()).count();
    Ok(web::Json(ImportResponse {
        message: format!("Imported {imported} of {} fixture files", results.len()),
        results,
    }))
}
