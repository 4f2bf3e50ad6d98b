//! Error taxonomy of the submission workflow and its HTTP mapping.

use std::collections::BTreeMap;

use axum::http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

use crate::error::{ApiError, RepositoryError, unauthorized, validation_error};
use crate::models::SubmissionStatus;

/// Field name (wire spelling) to human-readable problem.
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("validation failed for {}", fields.keys().cloned().collect::<Vec<_>>().join(", "))]
    Validation { fields: FieldErrors },
    #[error("submission {id} not found")]
    NotFound { id: Uuid },
    #[error("submission {id} has already been {current}")]
    InvalidState { id: Uuid, current: SubmissionStatus },
    #[error("{0}")]
    Authorization(String),
    #[error("persistence failure: {0}")]
    Persistence(#[source] RepositoryError),
}

impl WorkflowError {
    /// Validation error naming a single field.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut fields = FieldErrors::new();
        fields.insert(field.to_string(), message.into());
        WorkflowError::Validation { fields }
    }
}

impl From<RepositoryError> for WorkflowError {
    fn from(error: RepositoryError) -> Self {
        WorkflowError::Persistence(error)
    }
}

impl From<sea_orm::DbErr> for WorkflowError {
    fn from(error: sea_orm::DbErr) -> Self {
        WorkflowError::Persistence(RepositoryError::Database(error))
    }
}

impl From<WorkflowError> for ApiError {
    fn from(error: WorkflowError) -> Self {
        match error {
            WorkflowError::Validation { fields } => validation_error(
                "Submission validation failed",
                serde_json::to_value(fields).unwrap_or_default(),
            ),
            WorkflowError::NotFound { id } => ApiError::new(
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                &format!("Submission {id} not found"),
            ),
            WorkflowError::InvalidState { id, current } => ApiError::new(
                StatusCode::CONFLICT,
                "INVALID_STATE",
                &format!("Submission {id} has already been {current}"),
            )
            .with_details(serde_json::json!({ "currentStatus": current.as_str() })),
            WorkflowError::Authorization(message) => unauthorized(Some(&message)),
            WorkflowError::Persistence(source) => {
                // Store details stay in the logs
                tracing::error!(error = ?source, "Submission workflow persistence failure");
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_SERVER_ERROR",
                    "An internal error occurred",
                )
            }
        }
    }
}
