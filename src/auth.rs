//! # Authentication and Authorization
//!
//! Two independent guards protect the API:
//!
//! * end users present a bearer JWT issued by the external identity provider,
//!   verified with `DIRECTORY_USER_JWT_SECRET`; its `sub` claim is the submitter id.
//! * administrators exchange the shared back-office password for a session
//!   token signed with `DIRECTORY_ADMIN_SESSION_SECRET`.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use crate::config::AppConfig;
use crate::error::{ApiError, unauthorized};
use crate::server::AppState;

/// Subject written into administrator session tokens.
pub const ADMIN_SUBJECT: &str = "admin";

/// Claims carried by both user and administrator tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// Authenticated end user.
///
/// Reused from [`user_auth_middleware`] when it ran, otherwise verified from the
/// `Authorization` header on extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSession {
    /// Opaque identity from the identity provider; recorded as `submitted_by`.
    pub user_id: String,
}

/// Authenticated administrator, resolved like [`UserSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    /// Reviewer identity recorded on approve/reject.
    pub reviewer: String,
}

/// Freshly issued administrator session.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        Arc::clone(&app_state.config)
    }
}

/// Requires a valid end-user bearer token.
pub async fn user_auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers())?;
    let session = verify_user_token(&config, token)?;
    tracing::debug!(user_id = %session.user_id, "Authenticated user request");

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

/// Requires a valid administrator session token.
pub async fn admin_auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers())?;
    let session = verify_admin_token(&config, token)?;
    tracing::debug!(reviewer = %session.reviewer, "Authenticated admin request");

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

pub(crate) fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| unauthorized(Some("Missing Authorization header")))?
        .to_str()
        .map_err(|_| unauthorized(Some("Invalid Authorization header")))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| unauthorized(Some("Authorization header must use Bearer scheme")))
}

/// Verifies an end-user token and returns the session it identifies.
pub fn verify_user_token(config: &AppConfig, token: &str) -> Result<UserSession, ApiError> {
    let secret = config
        .user_jwt_secret
        .as_deref()
        .filter(|secret| !secret.is_empty())
        .ok_or_else(|| unauthorized(Some("User authentication is not configured")))?;

    let mut validation = Validation::new(Algorithm::HS256);
    match config.user_jwt_issuer.as_deref().filter(|issuer| !issuer.is_empty()) {
        // a configured issuer is only checked when `iss` is required
        Some(issuer) => {
            validation.set_required_spec_claims(&["exp", "sub", "iss"]);
            validation.set_issuer(&[issuer]);
        }
        None => validation.set_required_spec_claims(&["exp", "sub"]),
    }

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|err| {
        tracing::debug!(error = %err, "Rejected user token");
        unauthorized(Some("Invalid or expired user token"))
    })?
    .claims;

    if claims.sub.trim().is_empty() {
        return Err(unauthorized(Some("User token has no subject")));
    }

    Ok(UserSession {
        user_id: claims.sub,
    })
}

/// Compares the supplied password with the configured one in constant time.
pub fn verify_admin_password(config: &AppConfig, candidate: &str) -> bool {
    match config.admin_password.as_deref() {
        Some(expected) if !expected.is_empty() => {
            ConstantTimeEq::ct_eq(candidate.as_bytes(), expected.as_bytes()).into()
        }
        _ => false,
    }
}

/// Signs a new administrator session token valid for the configured TTL.
pub fn issue_admin_token(config: &AppConfig, now: DateTime<Utc>) -> Result<IssuedSession, ApiError> {
    let secret = admin_secret(config)?;
    let ttl = i64::try_from(config.admin_session_ttl_seconds).unwrap_or(i64::MAX);
    let expires_at = Duration::try_seconds(ttl)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);

    let claims = Claims {
        sub: ADMIN_SUBJECT.to_string(),
        exp: expires_at.timestamp(),
        iat: Some(now.timestamp()),
        iss: None,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|err| anyhow::anyhow!("failed to sign admin session token: {err}"))?;

    Ok(IssuedSession { token, expires_at })
}

/// Verifies an administrator session token.
pub fn verify_admin_token(config: &AppConfig, token: &str) -> Result<AdminSession, ApiError> {
    let secret = admin_secret(config)?;

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_required_spec_claims(&["exp", "sub"]);
    validation.sub = Some(ADMIN_SUBJECT.to_string());

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|err| {
        tracing::debug!(error = %err, "Rejected admin session token");
        unauthorized(Some("Invalid or expired admin session"))
    })?
    .claims;

    Ok(AdminSession {
        reviewer: claims.sub,
    })
}

fn admin_secret(config: &AppConfig) -> Result<&str, ApiError> {
    config
        .admin_session_secret
        .as_deref()
        .filter(|secret| !secret.is_empty())
        .ok_or_else(|| unauthorized(Some("Admin authentication is not configured")))
}

impl<S> FromRequestParts<S> for UserSession
where
    Arc<AppConfig>: FromRef<S>,
    S: Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<UserSession>() {
            return Ok(session.clone());
        }

        let config = Arc::<AppConfig>::from_ref(state);
        let token = extract_bearer_token(&parts.headers)?;
        verify_user_token(&config, token)
    }
}

impl<S> FromRequestParts<S> for AdminSession
where
    Arc<AppConfig>: FromRef<S>,
    S: Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<AdminSession>() {
            return Ok(session.clone());
        }

        let config = Arc::<AppConfig>::from_ref(state);
        let token = extract_bearer_token(&parts.headers)?;
        verify_admin_token(&config, token)
    }
}
