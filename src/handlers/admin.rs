//! # Admin Session Handlers
//!
//! Password login for the back office. Sessions are stateless signed tokens,
//! so logout only acknowledges the request; clients discard the token.

use axum::{
    extract::{State, rejection::JsonRejection},
    http::HeaderMap,
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{extract_bearer_token, issue_admin_token, verify_admin_password, verify_admin_token};
use crate::error::{ApiError, unauthorized};
use crate::handlers::types::SuccessResponse;
use crate::server::AppState;

/// Login request body
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AdminLoginRequest {
    pub password: String,
}

/// Issued admin session
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminLoginResponse {
    pub success: bool,
    /// Bearer token for `/api/admin/*` and review endpoints
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Session probe result
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminSessionStatus {
    pub authenticated: bool,
}

/// Exchange the admin password for a session token
#[utoipa::path(
    post,
    path = "/api/admin/auth",
    request_body = AdminLoginRequest,
    responses(
        (status = 200, description = "Session issued", body = AdminLoginResponse),
        (status = 400, description = "Malformed request body", body = ApiError),
        (status = 401, description = "Invalid password", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<AdminLoginRequest>, JsonRejection>,
) -> Result<Json<AdminLoginResponse>, ApiError> {
    let Json(request) = body?;

    if !verify_admin_password(&state.config, &request.password) {
        tracing::warn!("Rejected admin login attempt");
        return Err(unauthorized(Some("Invalid password")));
    }

    let issued = issue_admin_token(&state.config, Utc::now())?;
    tracing::info!(expires_at = %issued.expires_at, "Admin session issued");

    Ok(Json(AdminLoginResponse {
        success: true,
        token: issued.token,
        expires_at: issued.expires_at,
    }))
}

/// Report whether the presented admin session is valid
#[utoipa::path(
    get,
    path = "/api/admin/session",
    responses(
        (status = 200, description = "Session status", body = AdminSessionStatus)
    ),
    tag = "admin"
)]
pub async fn session(State(state): State<AppState>, headers: HeaderMap) -> Json<AdminSessionStatus> {
    let authenticated = extract_bearer_token(&headers)
        .and_then(|token| verify_admin_token(&state.config, token))
        .is_ok();

    Json(AdminSessionStatus { authenticated })
}

/// End the admin session
#[utoipa::path(
    post,
    path = "/api/admin/logout",
    responses(
        (status = 200, description = "Logged out", body = SuccessResponse)
    ),
    tag = "admin"
)]
pub async fn logout() -> Json<SuccessResponse> {
    Json(SuccessResponse { success: true })
}
