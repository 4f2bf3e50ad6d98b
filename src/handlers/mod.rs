//! # API Handlers
//!
//! HTTP endpoint handlers for the directory API.

pub mod admin;
pub mod organizations;
pub mod reference;
pub mod submissions;
pub mod types;

use axum::{extract::State, response::Json};

use crate::error::{ApiError, service_unavailable};
use crate::models::ServiceInfo;
use crate::server::AppState;
use types::HealthResponse;

/// Root handler that returns basic service information
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service information", body = ServiceInfo)
    ),
    tag = "root"
)]
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo::default())
}

/// Liveness probe
#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = 200, description = "Process is alive", body = HealthResponse)
    ),
    tag = "root"
)]
pub async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// Readiness probe; fails while the database is unreachable
#[utoipa::path(
    get,
    path = "/readyz",
    responses(
        (status = 200, description = "Ready to serve traffic", body = HealthResponse),
        (status = 503, description = "Database unavailable", body = ApiError)
    ),
    tag = "root"
)]
pub async fn readyz(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    crate::db::health_check(&state.db).await.map_err(|err| {
        tracing::warn!(error = %err, "Readiness check failed");
        service_unavailable("Database unavailable")
    })?;

    Ok(Json(HealthResponse::ok()))
}

#[cfg(test)]
mod tests;
