//! Health endpoints.
//!
//! `/health/ready` and `/health/live` are orchestration probes driven by
//! [`HealthState`]. `/api/health` reports whether the storage backend
//! answers.

use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use crate::inbound::http::state::HttpState;

/// Track readiness and whether the process should report itself as alive to
/// orchestrators.
pub struct HealthState {
    ready: AtomicBool,
    live: AtomicBool,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
        }
    }
}

impl HealthState {
    /// Create a new health state starting as not ready but live.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag the service as ready to take traffic.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Flag the service as unhealthy so liveness checks fail fast during
    /// shutdown.
    pub fn mark_unhealthy(&self) {
        self.live.store(false, Ordering::Release);
    }

    /// Whether readiness has been signalled.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Whether the process is still live.
    pub fn is_alive(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    fn probe_response(probe_ok: bool) -> HttpResponse {
        let mut response = if probe_ok {
            HttpResponse::Ok()
        } else {
            HttpResponse::ServiceUnavailable()
        };
        response
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .finish()
    }
}

/// Readiness probe. 200 once the server can handle traffic, 503 before.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Server is ready to handle traffic"),
        (status = 503, description = "Server is not ready")
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::probe_response(state.is_ready())
}

/// Liveness probe. 200 while alive, 503 once draining.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Server is alive"),
        (status = 503, description = "Server is shutting down")
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::probe_response(state.is_alive())
}

/// Storage section of the API health report.
#[derive(Debug, Serialize, ToSchema)]
pub struct StorageStatus {
    /// Backend label.
    #[schema(example = "postgres")]
    pub backend: String,
    /// Backend detail such as `connected`.
    #[schema(example = "connected")]
    pub detail: String,
}

/// Body of `GET /api/health`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiHealth {
    /// `ok` or `error`.
    #[schema(example = "ok")]
    pub status: &'static str,
    /// Human-readable summary.
    pub message: String,
    /// Storage report; `None` when the check failed.
    pub storage: Option<StorageStatus>,
    /// Time the report was produced.
    pub timestamp: DateTime<Utc>,
}

/// Report API and storage health.
#[utoipa::path(
    get,
    path = "/api/health",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "API and storage are up", body = ApiHealth),
        (status = 503, description = "Storage probe failed", body = ApiHealth)
    )
)]
#[get("/health")]
pub async fn api_health(state: web::Data<HttpState>) -> HttpResponse {
    let timestamp = Utc::now();
    let mut response = match state.storage_health.probe().await {
        Ok(health) => HttpResponse::Ok().json(ApiHealth {
            status: "ok",
            message: "Capacity tracker API is running".to_owned(),
            storage: Some(StorageStatus {
                backend: health.backend,
                detail: health.detail,
            }),
            timestamp,
        }),
        Err(error) => {
            warn!(%error, "storage health probe failed");
            HttpResponse::ServiceUnavailable().json(ApiHealth {
                status: "error",
                message: error.to_string(),
                storage: None,
                timestamp,
            })
        }
    };
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, header::HeaderValue::from_static("no-store"));
    response
}
