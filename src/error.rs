//! # Error Handling
//!
//! Every failed request is answered with an `application/problem+json` body:
//!
//! ```json
//! { "code": "VALIDATION_FAILED", "message": "...", "details": { ... }, "trace_id": "..." }
//! ```
//!
//! `code` is stable and machine-readable; `details` carries per-field problems
//! for validation failures and the current status for state conflicts.

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, RuntimeErr};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::telemetry;

pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
pub const NOT_FOUND: &str = "NOT_FOUND";
pub const CONFLICT: &str = "CONFLICT";
pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";
pub const SERVICE_UNAVAILABLE: &str = "SERVICE_UNAVAILABLE";

/// Problem document returned for every failed request
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    /// Stable error code, e.g. `INVALID_STATE`
    pub code: Box<str>,
    pub message: Box<str>,
    /// Field errors or other structured context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Box<serde_json::Value>>,
    /// Seconds the client should wait before retrying
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
    /// Request correlation ID, also sent as the `x-trace-id` header
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<Box<str>>,
}

impl ApiError {
    pub fn new<S: Into<String>>(status: StatusCode, code: S, message: S) -> Self {
        let trace_id = telemetry::current_trace_id()
            .unwrap_or_else(|| format!("corr-{}", &uuid::Uuid::new_v4().simple().to_string()[..8]));

        Self {
            status,
            code: code.into().into_boxed_str(),
            message: message.into().into_boxed_str(),
            details: None,
            retry_after: None,
            trace_id: Some(trace_id.into_boxed_str()),
        }
    }

    pub fn with_details<V: Into<serde_json::Value>>(mut self, details: V) -> Self {
        self.details = Some(Box::new(details.into()));
        self
    }

    pub fn with_retry_after(mut self, seconds: u64) -> Self {
        self.retry_after = Some(seconds);
        self
    }

    fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            INTERNAL_SERVER_ERROR,
            "An internal error occurred",
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let retry_after = self
            .retry_after
            .and_then(|seconds| HeaderValue::from_str(&seconds.to_string()).ok());

        let mut response = (self.status, axum::Json(self)).into_response();
        let headers = response.headers_mut();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/problem+json"),
        );
        if let Some(value) = retry_after {
            headers.insert(header::RETRY_AFTER, value);
        }
        response
    }
}

/// Errors raised by the repository layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] DbErr),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Wraps a SeaORM error, turning unique-constraint violations into `Conflict`.
    pub fn database_error(error: DbErr) -> Self {
        if is_unique_violation(&error) {
            RepositoryError::Conflict("Resource already exists".to_string())
        } else {
            RepositoryError::Database(error)
        }
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        RepositoryError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        RepositoryError::NotFound(message.into())
    }
}

/// True for Postgres `23505` and the SQLite primary key / unique codes.
pub(crate) fn is_unique_violation(error: &DbErr) -> bool {
    let (DbErr::Query(RuntimeErr::SqlxError(sqlx_err)) | DbErr::Exec(RuntimeErr::SqlxError(sqlx_err))) =
        error
    else {
        return false;
    };

    sqlx_err.as_database_error().is_some_and(|db_error| {
        db_error.is_unique_violation()
            || db_error
                .code()
                .is_some_and(|code| matches!(code.as_ref(), "23505" | "1555" | "2067"))
    })
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        tracing::error!(error = ?error, "Unhandled internal error");
        Self::internal()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let message = match &rejection {
            JsonRejection::JsonDataError(err) => format!("Invalid JSON: {}", err.body_text()),
            JsonRejection::JsonSyntaxError(err) => format!("JSON syntax error: {}", err.body_text()),
            JsonRejection::MissingJsonContentType(_) => {
                "Missing 'Content-Type: application/json' header".to_string()
            }
            other => other.body_text(),
        };
        Self::new(StatusCode::BAD_REQUEST, VALIDATION_FAILED, &message)
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            VALIDATION_FAILED,
            &format!("Invalid path parameter: {}", rejection.body_text()),
        )
    }
}

impl From<DbErr> for ApiError {
    fn from(error: DbErr) -> Self {
        RepositoryError::database_error(error).into()
    }
}

impl From<RepositoryError> for ApiError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound(message) => not_found(&message),
            RepositoryError::Validation(message) => {
                ApiError::new(StatusCode::BAD_REQUEST, VALIDATION_FAILED, &message)
            }
            RepositoryError::Conflict(message) => {
                ApiError::new(StatusCode::CONFLICT, CONFLICT, &message)
            }
            RepositoryError::Database(DbErr::Conn(err)) => {
                tracing::error!(error = ?err, "Database connection error");
                service_unavailable("Database service unavailable")
            }
            RepositoryError::Database(err) => {
                tracing::error!(error = ?err, "Database error");
                Self::internal()
            }
        }
    }
}

/// 401 with an optional custom message.
pub fn unauthorized(message: Option<&str>) -> ApiError {
    ApiError::new(
        StatusCode::UNAUTHORIZED,
        UNAUTHORIZED,
        message.unwrap_or("Authentication required"),
    )
}

pub fn not_found(message: &str) -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, NOT_FOUND, message)
}

/// 503 asking the client to retry shortly.
pub fn service_unavailable(message: &str) -> ApiError {
    ApiError::new(StatusCode::SERVICE_UNAVAILABLE, SERVICE_UNAVAILABLE, message).with_retry_after(5)
}

/// 400 whose `details` maps field names to problems.
pub fn validation_error(message: &str, field_errors: serde_json::Value) -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, VALIDATION_FAILED, message).with_details(field_errors)
}
