//! # Common API Types
//!
//! Wire representations shared by the submission, organization and admin
//! handlers. Field names are camelCase on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{SubmissionStatus, organization, organization_submission, tags_from_json};

/// Organization submission as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionDto {
    pub id: Uuid,
    /// Identity of the submitting user
    pub submitted_by: String,
    #[schema(example = "Green Future NGO")]
    pub name: String,
    pub name_ar: Option<String>,
    #[serde(rename = "type")]
    #[schema(example = "Non-Profit Organization")]
    pub org_type: String,
    pub sub_type: Option<String>,
    pub description: String,
    pub description_ar: Option<String>,
    pub logo_url: Option<String>,
    pub website: Option<String>,
    pub linkedin_url: Option<String>,
    pub contact_email: Option<String>,
    #[schema(example = "Riyadh")]
    pub region: String,
    pub sector_focus: Option<Vec<String>>,
    pub sdg_focus: Option<Vec<String>>,
    pub services: Option<Vec<String>>,
    pub status: SubmissionStatus,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<String>,
    /// Present only for rejected submissions
    pub rejection_reason: Option<String>,
    /// Organization created on approval
    pub organization_id: Option<Uuid>,
}

impl From<organization_submission::Model> for SubmissionDto {
    fn from(model: organization_submission::Model) -> Self {
        Self {
            id: model.id,
            submitted_by: model.submitted_by,
            name: model.name,
            name_ar: model.name_ar,
            org_type: model.org_type,
            sub_type: model.sub_type,
            description: model.description,
            description_ar: model.description_ar,
            logo_url: model.logo_url,
            website: model.website,
            linkedin_url: model.linkedin_url,
            contact_email: model.contact_email,
            region: model.region,
            sector_focus: tags_from_json(model.sector_focus.as_ref()),
            sdg_focus: tags_from_json(model.sdg_focus.as_ref()),
            services: tags_from_json(model.services.as_ref()),
            status: model.status,
            submitted_at: model.submitted_at.with_timezone(&Utc),
            reviewed_at: model.reviewed_at.map(|at| at.with_timezone(&Utc)),
            reviewed_by: model.reviewed_by,
            rejection_reason: model.rejection_reason,
            organization_id: model.organization_id,
        }
    }
}

/// Directory organization as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationDto {
    pub id: Uuid,
    pub name: String,
    pub name_ar: Option<String>,
    #[serde(rename = "type")]
    pub org_type: String,
    pub sub_type: Option<String>,
    pub description: String,
    pub description_ar: Option<String>,
    pub logo_url: Option<String>,
    pub website: Option<String>,
    pub linkedin_url: Option<String>,
    pub contact_email: Option<String>,
    pub region: String,
    pub sector_focus: Option<Vec<String>>,
    pub sdg_focus: Option<Vec<String>>,
    pub services: Option<Vec<String>>,
    #[schema(example = "active")]
    pub status: Option<String>,
    /// Submission this organization was approved from
    pub source_submission_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<organization::Model> for OrganizationDto {
    fn from(model: organization::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            name_ar: model.name_ar,
            org_type: model.org_type,
            sub_type: model.sub_type,
            description: model.description,
            description_ar: model.description_ar,
            logo_url: model.logo_url,
            website: model.website,
            linkedin_url: model.linkedin_url,
            contact_email: model.contact_email,
            region: model.region,
            sector_focus: tags_from_json(model.sector_focus.as_ref()),
            sdg_focus: tags_from_json(model.sdg_focus.as_ref()),
            services: tags_from_json(model.services.as_ref()),
            status: model.status,
            source_submission_id: model.source_submission_id,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

/// Liveness/readiness probe body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// Generic acknowledgement body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}
