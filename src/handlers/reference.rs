//! # Reference Data Handlers
//!
//! Public reads of the active lookup lists and their admin maintenance.
//! `{kind}` is one of `regions`, `organization-types`,
//! `organization-subtypes` or `services`.

use axum::{
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::auth::AdminSession;
use crate::error::{ApiError, not_found};
use crate::repositories::{ReferenceInput, ReferenceKind, ReferencePatch, ReferenceRecord};
use crate::server::AppState;

fn parse_kind(raw: &str) -> Result<ReferenceKind, ApiError> {
    raw.parse()
        .map_err(|_| not_found(&format!("Unknown reference list '{raw}'")))
}

/// List the active entries of a reference list
#[utoipa::path(
    get,
    path = "/api/{kind}",
    params(
        ("kind" = String, Path, description = "regions | organization-types | organization-subtypes | services")
    ),
    responses(
        (status = 200, description = "Active entries ordered by name", body = Vec<ReferenceRecord>),
        (status = 404, description = "Unknown reference list", body = ApiError)
    ),
    tag = "reference"
)]
pub async fn list_active(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<ReferenceRecord>>, ApiError> {
    let Path(raw_kind) = path?;
    let kind = parse_kind(&raw_kind)?;

    let records = state.references.list(state.db.as_ref(), kind, true).await?;
    Ok(Json(records))
}

/// List every entry of a reference list, including inactive ones
#[utoipa::path(
    get,
    path = "/api/admin/{kind}",
    security(("admin_session" = [])),
    params(
        ("kind" = String, Path, description = "regions | organization-types | organization-subtypes | services")
    ),
    responses(
        (status = 200, description = "All entries ordered by name", body = Vec<ReferenceRecord>),
        (status = 401, description = "Missing or invalid admin session", body = ApiError),
        (status = 404, description = "Unknown reference list", body = ApiError)
    ),
    tag = "reference"
)]
pub async fn list_all(
    State(state): State<AppState>,
    _admin: AdminSession,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<ReferenceRecord>>, ApiError> {
    let Path(raw_kind) = path?;
    let kind = parse_kind(&raw_kind)?;

    let records = state.references.list(state.db.as_ref(), kind, false).await?;
    Ok(Json(records))
}

/// Add an entry to a reference list
#[utoipa::path(
    post,
    path = "/api/admin/{kind}",
    security(("admin_session" = [])),
    params(
        ("kind" = String, Path, description = "regions | organization-types | organization-subtypes | services")
    ),
    request_body = ReferenceInput,
    responses(
        (status = 201, description = "Entry created", body = ReferenceRecord),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Missing or invalid admin session", body = ApiError),
        (status = 409, description = "An entry with this name already exists", body = ApiError)
    ),
    tag = "reference"
)]
pub async fn create_entry(
    State(state): State<AppState>,
    _admin: AdminSession,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<ReferenceInput>, JsonRejection>,
) -> Result<(StatusCode, Json<ReferenceRecord>), ApiError> {
    let Path(raw_kind) = path?;
    let kind = parse_kind(&raw_kind)?;
    let Json(input) = body?;

    let record = state
        .references
        .create(state.db.as_ref(), kind, input)
        .await?;

    tracing::info!(kind = %kind, id = %record.id, name = %record.name, "Reference entry created");
    Ok((StatusCode::CREATED, Json(record)))
}

/// Update an entry of a reference list
#[utoipa::path(
    patch,
    path = "/api/admin/{kind}/{id}",
    security(("admin_session" = [])),
    params(
        ("kind" = String, Path, description = "regions | organization-types | organization-subtypes | services"),
        ("id" = Uuid, Path, description = "Entry UUID")
    ),
    request_body = ReferencePatch,
    responses(
        (status = 200, description = "Entry updated", body = ReferenceRecord),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Missing or invalid admin session", body = ApiError),
        (status = 404, description = "Entry not found", body = ApiError),
        (status = 409, description = "An entry with this name already exists", body = ApiError)
    ),
    tag = "reference"
)]
pub async fn update_entry(
    State(state): State<AppState>,
    _admin: AdminSession,
    path: Result<Path<(String, Uuid)>, PathRejection>,
    body: Result<Json<ReferencePatch>, JsonRejection>,
) -> Result<Json<ReferenceRecord>, ApiError> {
    let Path((raw_kind, id)) = path?;
    let kind = parse_kind(&raw_kind)?;
    let Json(patch) = body?;

    let record = state
        .references
        .update(state.db.as_ref(), kind, id, patch)
        .await?;
    Ok(Json(record))
}

/// Delete an entry of a reference list
#[utoipa::path(
    delete,
    path = "/api/admin/{kind}/{id}",
    security(("admin_session" = [])),
    params(
        ("kind" = String, Path, description = "regions | organization-types | organization-subtypes | services"),
        ("id" = Uuid, Path, description = "Entry UUID")
    ),
    responses(
        (status = 204, description = "Entry deleted"),
        (status = 401, description = "Missing or invalid admin session", body = ApiError),
        (status = 404, description = "Entry not found", body = ApiError)
    ),
    tag = "reference"
)]
pub async fn delete_entry(
    State(state): State<AppState>,
    _admin: AdminSession,
    path: Result<Path<(String, Uuid)>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path((raw_kind, id)) = path?;
    let kind = parse_kind(&raw_kind)?;

    state.references.delete(state.db.as_ref(), kind, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
