//! Account API handlers.
//!
//! ```text
//! POST /api/register {"username":"asha","email":"asha@example.com","password":"secret1"}
//! POST /api/login    {"email":"asha@example.com","password":"secret1"}
//! POST /api/logout
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, LoginCredentials, Registration, UserAccount};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Login request body. Missing fields are reported by validation, not by
/// the JSON extractor.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Login email, matched case-insensitively.
    #[serde(default)]
    #[schema(example = "asha@example.com")]
    pub email: String,
    /// Plaintext password.
    #[serde(default)]
    pub password: String,
}

/// Registration request body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// Display name, at most 64 characters.
    #[serde(default)]
    #[schema(example = "asha")]
    pub username: String,
    /// Login email.
    #[serde(default)]
    #[schema(example = "asha@example.com")]
    pub email: String,
    /// Plaintext password, at least 6 characters.
    #[serde(default)]
    pub password: String,
}

/// `{user}` envelope returned by login and registration.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    /// The authenticated or newly created account.
    pub user: UserAccount,
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = UserResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Missing email or password", body = Error),
        (status = 401, description = "Invalid email or password", body = Error),
        (status = 501, description = "Proxy mode", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let credentials = LoginCredentials::try_from_parts(&payload.email, &payload.password)
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    let user = state.accounts.login(&credentials).await?;
    session.persist_user(&user.id)?;
    Ok(web::Json(UserResponse { user }))
}

/// Create an account.
#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Missing fields or short password", body = Error),
        (status = 409, description = "Email or username taken", body = Error),
        (status = 501, description = "Proxy mode", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration =
        Registration::try_from_parts(&payload.username, &payload.email, &payload.password)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
    let user = state.accounts.register(&registration).await?;
    Ok(HttpResponse::Created().json(UserResponse { user }))
}

/// End the session.
#[utoipa::path(
    post,
    path = "/api/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["accounts"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}
