//! Organization entity model
//!
//! This module contains the SeaORM entity model for the organizations table,
//! the public directory of social-impact organizations.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde_json::Value as JsonValue;

/// Status assigned to organizations materialized from an approved submission
pub const ACTIVE_STATUS: &str = "active";

/// Organization listed in the directory
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "organizations")]
pub struct Model {
    /// Unique identifier for the organization (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub name: String,

    pub name_ar: Option<String>,

    /// Organization type name (references `organization_types.name`)
    #[sea_orm(column_name = "type")]
    pub org_type: String,

    pub sub_type: Option<String>,

    pub description: String,

    pub description_ar: Option<String>,

    pub logo_url: Option<String>,

    pub website: Option<String>,

    pub linkedin_url: Option<String>,

    pub contact_email: Option<String>,

    /// Region name (references `regions.name`)
    pub region: String,

    /// Sector focus tags (JSON array of strings)
    #[sea_orm(column_type = "JsonBinary")]
    pub sector_focus: Option<JsonValue>,

    /// SDG goal identifiers as strings (JSON array)
    #[sea_orm(column_type = "JsonBinary")]
    pub sdg_focus: Option<JsonValue>,

    /// Service tags (JSON array of strings)
    #[sea_orm(column_type = "JsonBinary")]
    pub services: Option<JsonValue>,

    /// Free-text status; "active" for approved submissions
    pub status: Option<String>,

    /// Submission this organization was materialized from, if any
    pub source_submission_id: Option<Uuid>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
