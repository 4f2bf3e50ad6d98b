//! # Repository Layer
//!
//! SeaORM-backed data access for submissions, organizations and reference
//! lookups. Write paths take any [`sea_orm::ConnectionTrait`] so the workflow
//! engine can run them inside a single transaction.

pub mod organization;
pub mod reference;
pub mod submission;

pub use organization::{NewOrganization, OrganizationRepository, OrganizationStore};
pub use reference::{ReferenceInput, ReferenceKind, ReferencePatch, ReferenceRecord, ReferenceRepository};
pub use submission::{SubmissionRepository, SubmissionStore};

use crate::models::{organization as organization_entity, organization_submission, tags_from_json};

/// Descriptive fields shared by submissions and organizations.
///
/// Values are already validated and normalized: optional text is either
/// absent or non-empty, optional lists are either absent or non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrganizationContent {
    pub name: String,
    pub name_ar: Option<String>,
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
}

impl From<&organization_submission::Model> for OrganizationContent {
    fn from(submission: &organization_submission::Model) -> Self {
        Self {
            name: submission.name.clone(),
            name_ar: submission.name_ar.clone(),
            org_type: submission.org_type.clone(),
            sub_type: submission.sub_type.clone(),
            description: submission.description.clone(),
            description_ar: submission.description_ar.clone(),
            logo_url: submission.logo_url.clone(),
            website: submission.website.clone(),
            linkedin_url: submission.linkedin_url.clone(),
            contact_email: submission.contact_email.clone(),
            region: submission.region.clone(),
            sector_focus: tags_from_json(submission.sector_focus.as_ref()),
            sdg_focus: tags_from_json(submission.sdg_focus.as_ref()),
            services: tags_from_json(submission.services.as_ref()),
        }
    }
}

impl From<&organization_entity::Model> for OrganizationContent {
    fn from(org: &organization_entity::Model) -> Self {
        Self {
            name: org.name.clone(),
            name_ar: org.name_ar.clone(),
            org_type: org.org_type.clone(),
            sub_type: org.sub_type.clone(),
            description: org.description.clone(),
            description_ar: org.description_ar.clone(),
            logo_url: org.logo_url.clone(),
            website: org.website.clone(),
            linkedin_url: org.linkedin_url.clone(),
            contact_email: org.contact_email.clone(),
            region: org.region.clone(),
            sector_focus: tags_from_json(org.sector_focus.as_ref()),
            sdg_focus: tags_from_json(org.sdg_focus.as_ref()),
            services: tags_from_json(org.services.as_ref()),
        }
    }
}
