//! # Organization API Handlers
//!
//! Public directory reads plus administrator maintenance of organizations.

use axum::{
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::auth::AdminSession;
use crate::error::{ApiError, not_found};
use crate::handlers::types::OrganizationDto;
use crate::models::organization::ACTIVE_STATUS;
use crate::repositories::{NewOrganization, OrganizationContent, OrganizationStore};
use crate::server::AppState;
use crate::workflow::SubmissionPayload;

/// Query parameters for listing organizations
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrganizationListQuery {
    /// Restrict to one region name
    pub region: Option<String>,
}

/// Organization fields plus an optional status, used for admin create and update
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationRequest {
    #[serde(flatten)]
    pub fields: SubmissionPayload,
    /// Free-text status; defaults to "active" on create
    pub status: Option<String>,
}

/// List directory organizations
#[utoipa::path(
    get,
    path = "/api/organizations",
    params(OrganizationListQuery),
    responses(
        (status = 200, description = "Organizations ordered by name", body = Vec<OrganizationDto>)
    ),
    tag = "organizations"
)]
pub async fn list_organizations(
    State(state): State<AppState>,
    Query(query): Query<OrganizationListQuery>,
) -> Result<Json<Vec<OrganizationDto>>, ApiError> {
    let region = query
        .region
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty());

    let organizations = state
        .organizations
        .list(state.db.as_ref(), region)
        .await?;
    Ok(Json(organizations.into_iter().map(Into::into).collect()))
}

/// Fetch one organization
#[utoipa::path(
    get,
    path = "/api/organizations/{id}",
    params(
        ("id" = Uuid, Path, description = "Organization UUID")
    ),
    responses(
        (status = 200, description = "Organization", body = OrganizationDto),
        (status = 404, description = "Organization not found", body = ApiError)
    ),
    tag = "organizations"
)]
pub async fn get_organization(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<OrganizationDto>, ApiError> {
    let Path(id) = path?;
    let organization = state
        .organizations
        .find_by_id(state.db.as_ref(), id)
        .await?
        .ok_or_else(|| not_found(&format!("Organization {id} not found")))?;

    Ok(Json(organization.into()))
}

/// Add an organization to the directory directly
#[utoipa::path(
    post,
    path = "/api/organizations",
    security(("admin_session" = [])),
    request_body = OrganizationRequest,
    responses(
        (status = 201, description = "Organization created", body = OrganizationDto),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Missing or invalid admin session", body = ApiError)
    ),
    tag = "organizations"
)]
pub async fn create_organization(
    State(state): State<AppState>,
    _admin: AdminSession,
    body: Result<Json<OrganizationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<OrganizationDto>), ApiError> {
    let Json(request) = body?;

    let content = state.workflow.validate(request.fields).await?;
    let status = clean_status(request.status).unwrap_or_else(|| ACTIVE_STATUS.to_string());

    let organization = state
        .organizations
        .insert(
            state.db.as_ref(),
            NewOrganization::standalone(content, Some(status)),
        )
        .await?;

    tracing::info!(organization_id = %organization.id, "Organization created by admin");
    Ok((StatusCode::CREATED, Json(organization.into())))
}

/// Update an organization; omitted fields keep their current values
#[utoipa::path(
    patch,
    path = "/api/organizations/{id}",
    security(("admin_session" = [])),
    params(
        ("id" = Uuid, Path, description = "Organization UUID")
    ),
    request_body = OrganizationRequest,
    responses(
        (status = 200, description = "Organization updated", body = OrganizationDto),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Missing or invalid admin session", body = ApiError),
        (status = 404, description = "Organization not found", body = ApiError)
    ),
    tag = "organizations"
)]
pub async fn update_organization(
    State(state): State<AppState>,
    _admin: AdminSession,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<OrganizationRequest>, JsonRejection>,
) -> Result<Json<OrganizationDto>, ApiError> {
    let Path(id) = path?;
    let Json(request) = body?;

    let existing = state
        .organizations
        .find_by_id(state.db.as_ref(), id)
        .await?
        .ok_or_else(|| not_found(&format!("Organization {id} not found")))?;

    let current = OrganizationContent::from(&existing);
    let merged = merge_fields(SubmissionPayload::from(current.clone()), request.fields);
    let content = state.workflow.validate_update(&current, merged).await?;

    let organization = state
        .organizations
        .update(state.db.as_ref(), id, content, clean_status(request.status))
        .await?;

    Ok(Json(organization.into()))
}

/// Remove an organization from the directory
#[utoipa::path(
    delete,
    path = "/api/organizations/{id}",
    security(("admin_session" = [])),
    params(
        ("id" = Uuid, Path, description = "Organization UUID")
    ),
    responses(
        (status = 204, description = "Organization deleted"),
        (status = 401, description = "Missing or invalid admin session", body = ApiError),
        (status = 404, description = "Organization not found", body = ApiError)
    ),
    tag = "organizations"
)]
pub async fn delete_organization(
    State(state): State<AppState>,
    _admin: AdminSession,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = path?;
    state.organizations.delete(state.db.as_ref(), id).await?;

    tracing::info!(organization_id = %id, "Organization deleted by admin");
    Ok(StatusCode::NO_CONTENT)
}

fn clean_status(status: Option<String>) -> Option<String> {
    status
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Overlays the fields present in `patch` onto `current`.
fn merge_fields(current: SubmissionPayload, patch: SubmissionPayload) -> SubmissionPayload {
    SubmissionPayload {
        name: patch.name.or(current.name),
        name_ar: patch.name_ar.or(current.name_ar),
        org_type: patch.org_type.or(current.org_type),
        sub_type: patch.sub_type.or(current.sub_type),
        description: patch.description.or(current.description),
        description_ar: patch.description_ar.or(current.description_ar),
        logo_url: patch.logo_url.or(current.logo_url),
        website: patch.website.or(current.website),
        linkedin_url: patch.linkedin_url.or(current.linkedin_url),
        contact_email: patch.contact_email.or(current.contact_email),
        region: patch.region.or(current.region),
        sector_focus: patch.sector_focus.or(current.sector_focus),
        sdg_focus: patch.sdg_focus.or(current.sdg_focus),
        services: patch.services.or(current.services),
    }
}
