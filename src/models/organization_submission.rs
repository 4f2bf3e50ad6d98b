//! Organization submission entity model
//!
//! This module contains the SeaORM entity model for the
//! organization_submissions table. A submission is a user-proposed
//! organization that an administrator either approves or rejects.

use std::fmt;

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

/// Review status of a submission.
///
/// `Pending` is the only state with outgoing transitions; `Approved` and
/// `Rejected` are terminal.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum SubmissionStatus {
    #[sea_orm(string_value = "pending")]
    #[serde(rename = "pending")]
    #[default]
    Pending,

    #[sea_orm(string_value = "approved")]
    #[serde(rename = "approved")]
    Approved,

    #[sea_orm(string_value = "rejected")]
    #[serde(rename = "rejected")]
    Rejected,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Approved => "approved",
            SubmissionStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, SubmissionStatus::Pending)
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Organization submission awaiting (or having received) review
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "organization_submissions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Opaque identity of the end-user who submitted the proposal
    pub submitted_by: String,

    pub name: String,

    pub name_ar: Option<String>,

    #[sea_orm(column_name = "type")]
    pub org_type: String,

    pub sub_type: Option<String>,

    pub description: String,

    pub description_ar: Option<String>,

    pub logo_url: Option<String>,

    pub website: Option<String>,

    pub linkedin_url: Option<String>,

    pub contact_email: Option<String>,

    pub region: String,

    #[sea_orm(column_type = "JsonBinary")]
    pub sector_focus: Option<JsonValue>,

    #[sea_orm(column_type = "JsonBinary")]
    pub sdg_focus: Option<JsonValue>,

    #[sea_orm(column_type = "JsonBinary")]
    pub services: Option<JsonValue>,

    pub status: SubmissionStatus,

    pub submitted_at: DateTimeWithTimeZone,

    /// Null until reviewed
    pub reviewed_at: Option<DateTimeWithTimeZone>,

    /// Reviewer identity; null until reviewed
    pub reviewed_by: Option<String>,

    /// Set only when the submission is rejected
    pub rejection_reason: Option<String>,

    /// Organization materialized on approval
    pub organization_id: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
