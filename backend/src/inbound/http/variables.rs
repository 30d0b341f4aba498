//! Named variable handlers.
//!
//! Variables are JSON values keyed by name, either global or scoped to a
//! user id.
//!
//! ```text
//! GET    /api/variables?key=theme&userId=...
//! GET    /api/variables?userId=...
//! POST   /api/variables {"key":"theme","value":"dark","userId":"..."}
//! DELETE /api/variables?key=theme
//! ```

use std::collections::BTreeMap;

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Error, SetOutcome, UserId, VariableKey};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::table_data::MessageResponse;
use crate::inbound::http::validation::variable_scope;

/// Query string shared by the variable endpoints.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct VariableQuery {
    /// Variable name. Omit to list every variable in scope.
    pub key: Option<String>,
    /// Owning user; omit for global variables.
    pub user_id: Option<String>,
}

/// Body of `POST /api/variables`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetVariableRequest {
    /// Variable name.
    #[serde(default)]
    pub key: String,
    /// Any JSON value.
    #[serde(default)]
    pub value: Value,
    /// Owning user; omit for a global variable.
    #[serde(default)]
    pub user_id: Option<String>,
}

/// A single variable.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VariableResponse {
    /// Variable name.
    #[schema(value_type = String)]
    pub key: VariableKey,
    /// Owning user, if scoped.
    #[schema(value_type = Option<String>, format = Uuid)]
    pub user_id: Option<UserId>,
    /// Stored value.
    pub value: Value,
}

/// Every variable in one scope.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VariableListResponse {
    /// Scope that was listed.
    #[schema(value_type = Option<String>, format = Uuid)]
    pub user_id: Option<UserId>,
    /// Values keyed by name.
    pub variables: BTreeMap<String, Value>,
}

/// Reply to a set.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SetVariableResponse {
    /// Human-readable outcome.
    pub message: String,
    /// Variable name.
    #[schema(value_type = String)]
    pub key: VariableKey,
    /// `false` when an existing value was replaced.
    pub created: bool,
}

/// Fetch one variable, or every variable in scope when no key is given.
#[utoipa::path(
    get,
    path = "/api/variables",
    params(VariableQuery),
    responses(
        (status = 200, description = "A variable or the scoped list", body = VariableResponse),
        (status = 404, description = "Unknown key", body = Error),
        (status = 501, description = "Proxy mode", body = Error)
    ),
    tags = ["variables"],
    operation_id = "getVariables",
    security([])
)]
#[get("/variables")]
pub async fn get_variables(
    state: web::Data<HttpState>,
    query: web::Query<VariableQuery>,
) -> ApiResult<HttpResponse> {
    let scope = variable_scope(query.user_id.as_deref())?;
    match query.key.as_deref() {
        Some(key) => {
            let (key, value) = state.variables.get(key, scope).await?;
            Ok(HttpResponse::Ok().json(VariableResponse {
                key,
                user_id: scope,
                value,
            }))
        }
        None => {
            let variables = state.variables.list(scope).await?;
            Ok(HttpResponse::Ok().json(VariableListResponse {
                user_id: scope,
                variables,
            }))
        }
    }
}

/// Create or replace a variable.
#[utoipa::path(
    post,
    path = "/api/variables",
    request_body = SetVariableRequest,
    responses(
        (status = 200, description = "Stored", body = SetVariableResponse),
        (status = 400, description = "Blank key or bad user id", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 501, description = "Proxy mode", body = Error)
    ),
    tags = ["variables"],
    operation_id = "setVariable"
)]
#[post("/variables")]
pub async fn set_variable(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SetVariableRequest>,
) -> ApiResult<web::Json<SetVariableResponse>> {
    session.require_user_id()?;
    let scope = variable_scope(payload.user_id.as_deref())?;
    let (key, outcome) = state
        .variables
        .set(&payload.key, scope, &payload.value)
        .await?;
    let created = outcome == SetOutcome::Created;
    let message = if created {
        format!("Variable '{key}' created")
    } else {
        format!("Variable '{key}' updated")
    };
    Ok(web::Json(SetVariableResponse {
        message,
        key,
        created,
    }))
}

/// Remove a variable.
#[utoipa::path(
    delete,
    path = "/api/variables",
    params(VariableQuery),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Unknown key", body = Error),
        (status = 501, description = "Proxy mode", body = Error)
    ),
    tags = ["variables"],
    operation_id = "deleteVariable"
)]
#[delete("/variables")]
pub async fn delete_variable(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<VariableQuery>,
) -> ApiResult<web::Json<MessageResponse>> {
    session.require_user_id()?;
    let scope = variable_scope(query.user_id.as_deref())?;
    let key = state
        .variables
        .delete(query.key.as_deref().unwrap_or_default(), scope)
        .await?;
    Ok(web::Json(MessageResponse::new(format!(
        "Variable '{key}' deleted"
    ))))
}
