//! # Submission API Handlers
//!
//! End users propose organizations and follow their own submissions;
//! administrators review the queue and approve or reject.

use axum::{
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, header::LOCATION},
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{AdminSession, UserSession};
use crate::error::ApiError;
use crate::handlers::types::{OrganizationDto, SubmissionDto};
use crate::server::AppState;
use crate::workflow::SubmissionPayload;

/// Request body for rejecting a submission
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RejectRequest {
    /// Reason shown to the submitter; must not be blank
    #[schema(example = "Registration documents are missing")]
    #[serde(default)]
    pub reason: Option<String>,
}

/// Submit a new organization for review
#[utoipa::path(
    post,
    path = "/api/submissions",
    security(("user_token" = [])),
    request_body = SubmissionPayload,
    responses(
        (status = 201, description = "Submission recorded as pending", body = SubmissionDto, headers(
            ("Location", description = "URL of the created submission")
        )),
        (status = 400, description = "Validation failed; details name every offending field", body = ApiError),
        (status = 401, description = "Missing or invalid user token", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "submissions"
)]
pub async fn create_submission(
    State(state): State<AppState>,
    session: UserSession,
    payload: Result<Json<SubmissionPayload>, JsonRejection>,
) -> Result<(StatusCode, [(axum::http::HeaderName, String); 1], Json<SubmissionDto>), ApiError> {
    let Json(payload) = payload?;

    let submission = state.workflow.create(&session.user_id, payload).await?;
    let location = format!("/api/submissions/{}", submission.id);

    Ok((
        StatusCode::CREATED,
        [(LOCATION, location)],
        Json(submission.into()),
    ))
}

/// List the caller's own submissions, newest first
#[utoipa::path(
    get,
    path = "/api/submissions/my",
    security(("user_token" = [])),
    responses(
        (status = 200, description = "Submissions of the authenticated user", body = Vec<SubmissionDto>),
        (status = 401, description = "Missing or invalid user token", body = ApiError)
    ),
    tag = "submissions"
)]
pub async fn list_my_submissions(
    State(state): State<AppState>,
    session: UserSession,
) -> Result<Json<Vec<SubmissionDto>>, ApiError> {
    let submissions = state.workflow.list_mine(&session.user_id).await?;
    Ok(Json(submissions.into_iter().map(Into::into).collect()))
}

/// List every submission, newest first
#[utoipa::path(
    get,
    path = "/api/submissions",
    security(("admin_session" = [])),
    responses(
        (status = 200, description = "All submissions", body = Vec<SubmissionDto>),
        (status = 401, description = "Missing or invalid admin session", body = ApiError)
    ),
    tag = "submissions"
)]
pub async fn list_submissions(
    State(state): State<AppState>,
    _admin: AdminSession,
) -> Result<Json<Vec<SubmissionDto>>, ApiError> {
    let submissions = state.workflow.list_all().await?;
    Ok(Json(submissions.into_iter().map(Into::into).collect()))
}

/// List submissions awaiting review, newest first
#[utoipa::path(
    get,
    path = "/api/submissions/pending",
    security(("admin_session" = [])),
    responses(
        (status = 200, description = "Pending submissions", body = Vec<SubmissionDto>),
        (status = 401, description = "Missing or invalid admin session", body = ApiError)
    ),
    tag = "submissions"
)]
pub async fn list_pending_submissions(
    State(state): State<AppState>,
    _admin: AdminSession,
) -> Result<Json<Vec<SubmissionDto>>, ApiError> {
    let submissions = state.workflow.list_pending().await?;
    Ok(Json(submissions.into_iter().map(Into::into).collect()))
}

/// Fetch a single submission
#[utoipa::path(
    get,
    path = "/api/submissions/{id}",
    security(("admin_session" = [])),
    params(
        ("id" = Uuid, Path, description = "Submission UUID")
    ),
    responses(
        (status = 200, description = "Submission", body = SubmissionDto),
        (status = 400, description = "Malformed submission id", body = ApiError),
        (status = 401, description = "Missing or invalid admin session", body = ApiError),
        (status = 404, description = "Submission not found", body = ApiError)
    ),
    tag = "submissions"
)]
pub async fn get_submission(
    State(state): State<AppState>,
    _admin: AdminSession,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<SubmissionDto>, ApiError> {
    let Path(submission_id) = path?;
    let submission = state.workflow.get(submission_id).await?;
    Ok(Json(submission.into()))
}

/// Approve a pending submission, creating its directory organization
#[utoipa::path(
    post,
    path = "/api/submissions/{id}/approve",
    security(("admin_session" = [])),
    params(
        ("id" = Uuid, Path, description = "Submission UUID")
    ),
    responses(
        (status = 200, description = "Organization created from the submission", body = OrganizationDto),
        (status = 401, description = "Missing or invalid admin session", body = ApiError),
        (status = 404, description = "Submission not found", body = ApiError),
        (status = 409, description = "Submission already approved or rejected", body = ApiError),
        (status = 500, description = "Internal server error; submission stays pending", body = ApiError)
    ),
    tag = "submissions"
)]
pub async fn approve_submission(
    State(state): State<AppState>,
    admin: AdminSession,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<OrganizationDto>, ApiError> {
    let Path(submission_id) = path?;
    let organization = state
        .workflow
        .approve(submission_id, &admin.reviewer)
        .await?;
    Ok(Json(organization.into()))
}

/// Reject a pending submission with a reason
#[utoipa::path(
    post,
    path = "/api/submissions/{id}/reject",
    security(("admin_session" = [])),
    params(
        ("id" = Uuid, Path, description = "Submission UUID")
    ),
    request_body = RejectRequest,
    responses(
        (status = 200, description = "Rejected submission", body = SubmissionDto),
        (status = 400, description = "Reason missing or blank", body = ApiError),
        (status = 401, description = "Missing or invalid admin session", body = ApiError),
        (status = 404, description = "Submission not found", body = ApiError),
        (status = 409, description = "Submission already approved or rejected", body = ApiError)
    ),
    tag = "submissions"
)]
pub async fn reject_submission(
    State(state): State<AppState>,
    admin: AdminSession,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<RejectRequest>, JsonRejection>,
) -> Result<Json<SubmissionDto>, ApiError> {
    let Path(submission_id) = path?;
    let Json(request) = body?;

    let submission = state
        .workflow
        .reject(
            submission_id,
            &admin.reviewer,
            request.reason.as_deref().unwrap_or_default(),
        )
        .await?;
    Ok(Json(submission.into()))
}
