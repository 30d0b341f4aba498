//! Table-data API handlers.
//!
//! ```text
//! GET    /api/table-data?fiscalYear=FY_25
//! POST   /api/table-data {"fiscalYear":"FY_25","data":[...]}
//! DELETE /api/table-data?fiscalYear=FY_25
//! GET    /api/table-data/summary?fiscalYear=FY_25&group=AGEL
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    ActiveTable, CapacityRecord, CapacitySummary, Error, FiscalYear, RecordFilter, SAVED_MESSAGE,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::required_fiscal_year;

/// Query string naming a fiscal year.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct FiscalYearQuery {
    /// Fiscal-year label, e.g. `FY_25`.
    pub fiscal_year: Option<String>,
}

/// Body of `POST /api/table-data`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveTableRequest {
    /// Fiscal year; required.
    #[serde(default)]
    pub fiscal_year: Option<String>,
    /// Array of record objects.
    #[serde(default)]
    #[schema(value_type = Vec<CapacityRecord>)]
    pub data: Value,
}

/// Reply to a successful save.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveTableResponse {
    /// Fixed confirmation text.
    #[schema(example = "Data saved successfully")]
    pub message: &'static str,
    /// Fiscal year saved.
    #[schema(value_type = String, example = "FY_25")]
    pub fiscal_year: FiscalYear,
    /// New active version.
    pub version: Option<i32>,
    /// Rows as stored, after normalisation.
    pub data: Vec<CapacityRecord>,
}

/// Plain `{message}` reply.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    /// Human-readable outcome.
    pub message: String,
}

impl MessageResponse {
    /// Wrap a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Query string for the summary endpoint: a fiscal year plus record filters.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryQuery {
    /// Fiscal year; required.
    pub fiscal_year: Option<String>,
    /// Record filters; blank values are ignored.
    #[serde(flatten)]
    pub filter: RecordFilter,
}

/// Fetch the active records for a fiscal year.
#[utoipa::path(
    get,
    path = "/api/table-data",
    params(FiscalYearQuery),
    responses(
        (status = 200, description = "Active records", body = ActiveTable),
        (status = 400, description = "Missing or invalid fiscal year", body = Error),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["table-data"],
    operation_id = "getTableData",
    security([])
)]
#[get("/table-data")]
pub async fn get_table_data(
    state: web::Data<HttpState>,
    query: web::Query<FiscalYearQuery>,
) -> ApiResult<web::Json<ActiveTable>> {
    let fiscal_year = required_fiscal_year(query.fiscal_year.as_deref())?;
    Ok(web::Json(state.tables.fetch(&fiscal_year).await?))
}

/// Replace the records for a fiscal year with a new version.
#[utoipa::path(
    post,
    path = "/api/table-data",
    request_body = SaveTableRequest,
    responses(
        (status = 200, description = "Saved", body = SaveTableResponse),
        (status = 400, description = "Invalid payload", body = Error),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["table-data"],
    operation_id = "saveTableData"
)]
#[post("/table-data")]
pub async fn save_table_data(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SaveTableRequest>,
) -> ApiResult<web::Json<SaveTableResponse>> {
    session.require_user_id()?;
    let SaveTableRequest { fiscal_year, data } = payload.into_inner();
    let fiscal_year = required_fiscal_year(fiscal_year.as_deref())?;
    let Value::Array(rows) = data else {
        return Err(Error::invalid_request("Data must be an array"));
    };
    let table = state.tables.save(&fiscal_year, &rows).await?;
    Ok(web::Json(SaveTableResponse {
        message: SAVED_MESSAGE,
        fiscal_year: table.fiscal_year,
        version: table.version,
        data: table.data,
    }))
}

/// Archive the active records for a fiscal year.
#[utoipa::path(
    delete,
    path = "/api/table-data",
    params(FiscalYearQuery),
    responses(
        (status = 200, description = "Archived or already archived", body = MessageResponse),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Fiscal year never saved", body = Error)
    ),
    tags = ["table-data"],
    operation_id = "deleteTableData"
)]
#[delete("/table-data")]
pub async fn delete_table_data(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<FiscalYearQuery>,
) -> ApiResult<web::Json<MessageResponse>> {
    session.require_user_id()?;
    let fiscal_year = required_fiscal_year(query.fiscal_year.as_deref())?;
    let message = state.tables.delete(&fiscal_year).await?;
    Ok(web::Json(MessageResponse::new(message)))
}

/// Totals over the filtered active records.
#[utoipa::path(
    get,
    path = "/api/table-data/summary",
    params(
        ("fiscalYear" = String, Query, description = "Fiscal-year label"),
        ("group" = Option<String>, Query, description = "Exact group match"),
        ("ppaMerchant" = Option<String>, Query, description = "Exact PPA/merchant match"),
        ("type" = Option<String>, Query, description = "Solar, Wind or Hybrid, any case"),
        ("locationCode" = Option<String>, Query, description = "Exact location code match"),
        ("location" = Option<String>, Query, description = "Exact location match"),
        ("pss" = Option<String>, Query, description = "Exact PSS match"),
        ("connectivity" = Option<String>, Query, description = "Exact connectivity match")
    ),
    responses(
        (status = 200, description = "Summary", body = CapacitySummary),
        (status = 400, description = "Invalid query", body = Error)
    ),
    tags = ["table-data"],
    operation_id = "getTableSummary",
    security([])
)]
#[get("/table-data/summary")]
pub async fn get_table_summary(
    state: web::Data<HttpState>,
    query: web::Query<SummaryQuery>,
) -> ApiResult<HttpResponse> {
    let SummaryQuery {
        fiscal_year,
        filter,
    } = query.into_inner();
    let fiscal_year = required_fiscal_year(fiscal_year.as_deref())?;
    let summary = state.tables.summary(&fiscal_year, &filter).await?;
    Ok(HttpResponse::Ok().json(summary))
}
