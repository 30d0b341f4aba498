//! Dropdown option and location relationship handlers.
//!
//! ```text
//! GET  /api/dropdown-options?fiscalYear=FY_25
//! POST /api/dropdown-options {"fiscalYear":"FY_25","groups":[...],...}
//! POST /api/dropdown-option  {"optionType":"groups","optionValue":"AGL"}
//! GET  /api/location-relationships?fiscalYear=FY_25
//! POST /api/location-relationships?fiscalYear=FY_25 [{"location":"Baap","locationCode":"RJ"}]
//! ```
//!
//! The fiscal year defaults to `FY_25` on every route here.

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{DropdownOptions, Error, FiscalYear, LocationRelationship, OptionCategory};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::table_data::FiscalYearQuery;
use crate::inbound::http::validation::fiscal_year_or_default;

const OPTION_FIELDS_REQUIRED: &str = "Option type and value are required";

/// Option lists tagged with their fiscal year.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DropdownOptionsResponse {
    /// Fiscal year the lists belong to.
    #[schema(value_type = String, example = "FY_25")]
    pub fiscal_year: FiscalYear,
    /// The option lists, flattened into the body.
    #[serde(flatten)]
    pub options: DropdownOptions,
}

/// Full replacement body for `POST /api/dropdown-options`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceOptionsRequest {
    /// Fiscal year; defaults when absent.
    #[serde(default)]
    pub fiscal_year: Option<String>,
    /// Replacement lists.
    #[serde(flatten)]
    pub options: DropdownOptions,
}

/// Body for `POST /api/dropdown-option`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddOptionRequest {
    /// Fiscal year; defaults when absent.
    #[serde(default)]
    pub fiscal_year: Option<String>,
    /// List name, e.g. `groups` or `locationCodes`.
    #[serde(default)]
    pub option_type: Option<String>,
    /// Value to append.
    #[serde(default)]
    pub option_value: Option<String>,
}

/// Reply to `POST /api/dropdown-option`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddOptionResponse {
    /// Always `true` on a 200 reply.
    pub success: bool,
    /// Fiscal year updated.
    #[schema(value_type = String, example = "FY_25")]
    pub fiscal_year: FiscalYear,
    /// List that was targeted.
    pub option_type: OptionCategory,
    /// Trimmed value.
    pub option_value: String,
    /// `false` when the value was already present.
    pub added: bool,
    /// Human-readable outcome.
    pub message: String,
}

/// Fetch option lists, falling back to defaults.
#[utoipa::path(
    get,
    path = "/api/dropdown-options",
    params(FiscalYearQuery),
    responses(
        (status = 200, description = "Option lists", body = DropdownOptionsResponse),
        (status = 400, description = "Invalid fiscal year", body = Error)
    ),
    tags = ["master-data"],
    operation_id = "getDropdownOptions",
    security([])
)]
#[get("/dropdown-options")]
pub async fn get_dropdown_options(
    state: web::Data<HttpState>,
    query: web::Query<FiscalYearQuery>,
) -> ApiResult<web::Json<DropdownOptionsResponse>> {
    let fiscal_year = fiscal_year_or_default(query.fiscal_year.as_deref())?;
    let options = state.master_data.options(&fiscal_year).await?;
    Ok(web::Json(DropdownOptionsResponse {
        fiscal_year,
        options,
    }))
}

/// Replace every option list for a fiscal year.
#[utoipa::path(
    post,
    path = "/api/dropdown-options",
    request_body = ReplaceOptionsRequest,
    responses(
        (status = 200, description = "Stored option lists", body = DropdownOptionsResponse),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["master-data"],
    operation_id = "replaceDropdownOptions"
)]
#[post("/dropdown-options")]
pub async fn replace_dropdown_options(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ReplaceOptionsRequest>,
) -> ApiResult<web::Json<DropdownOptionsResponse>> {
    session.require_user_id()?;
    let ReplaceOptionsRequest {
        fiscal_year,
        options,
    } = payload.into_inner();
    let fiscal_year = fiscal_year_or_default(fiscal_year.as_deref())?;
    let options = state
        .master_data
        .replace_options(&fiscal_year, options)
        .await?;
    Ok(web::Json(DropdownOptionsResponse {
        fiscal_year,
        options,
    }))
}

/// Add one value to an option list. Existing values are left untouched.
#[utoipa::path(
    post,
    path = "/api/dropdown-option",
    request_body = AddOptionRequest,
    responses(
        (status = 200, description = "Added or already present", body = AddOptionResponse),
        (status = 400, description = "Missing or unknown option type", body = Error),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["master-data"],
    operation_id = "addDropdownOption"
)]
#[post("/dropdown-option")]
pub async fn add_dropdown_option(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<AddOptionRequest>,
) -> ApiResult<web::Json<AddOptionResponse>> {
    session.require_user_id()?;
    let AddOptionRequest {
        fiscal_year,
        option_type,
        option_value,
    } = payload.into_inner();
    let (Some(option_type), Some(option_value)) = (option_type, option_value) else {
        return Err(Error::invalid_request(OPTION_FIELDS_REQUIRED));
    };
    if option_type.trim().is_empty() {
        return Err(Error::invalid_request(OPTION_FIELDS_REQUIRED));
    }
    let category: OptionCategory = option_type
        .parse()
        .map_err(|err: crate::domain::UnknownOptionCategory| {
            Error::invalid_request(err.to_string())
        })?;
    let fiscal_year = fiscal_year_or_default(fiscal_year.as_deref())?;
    let outcome = state
        .master_data
        .add_option(&fiscal_year, category, &option_value)
        .await?;
    Ok(web::Json(AddOptionResponse {
        success: true,
        message: outcome.message(),
        fiscal_year,
        option_type: outcome.category,
        option_value: outcome.value,
        added: outcome.added,
    }))
}

/// Fetch location relationships, falling back to defaults.
#[utoipa::path(
    get,
    path = "/api/location-relationships",
    params(FiscalYearQuery),
    responses(
        (status = 200, description = "Relationships", body = [LocationRelationship])
    ),
    tags = ["master-data"],
    operation_id = "getLocationRelationships",
    security([])
)]
#[get("/location-relationships")]
pub async fn get_location_relationships(
    state: web::Data<HttpState>,
    query: web::Query<FiscalYearQuery>,
) -> ApiResult<web::Json<Vec<LocationRelationship>>> {
    let fiscal_year = fiscal_year_or_default(query.fiscal_year.as_deref())?;
    Ok(web::Json(state.master_data.relationships(&fiscal_year).await?))
}

/// Replace every location relationship for a fiscal year.
#[utoipa::path(
    post,
    path = "/api/location-relationships",
    params(FiscalYearQuery),
    request_body = [LocationRelationship],
    responses(
        (status = 200, description = "Stored relationships", body = [LocationRelationship]),
        (status = 400, description = "Blank location or code", body = Error),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["master-data"],
    operation_id = "replaceLocationRelationships"
)]
#[post("/location-relationships")]
pub async fn replace_location_relationships(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<FiscalYearQuery>,
    payload: web::Json<Vec<LocationRelationship>>,
) -> ApiResult<web::Json<Vec<LocationRelationship>>> {
    session.require_user_id()?;
    let fiscal_year = fiscal_year_or_default(query.fiscal_year.as_deref())?;
    let stored = state
        .master_data
        .replace_relationships(&fiscal_year, payload.into_inner())
        .await?;
    Ok(web::Json(stored))
}
