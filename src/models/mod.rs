//! # Data Models
//!
//! This module contains all the data models used throughout the directory service.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

pub mod organization;
pub mod organization_submission;
pub mod organization_subtype;
pub mod organization_type;
pub mod region;
pub mod service;

pub use organization::Entity as Organization;
pub use organization_submission::Entity as OrganizationSubmission;
pub use organization_submission::SubmissionStatus;
pub use organization_subtype::Entity as OrganizationSubtype;
pub use organization_type::Entity as OrganizationType;
pub use region::Entity as Region;
pub use service::Entity as Service;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "impact-directory".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Encodes an optional tag list as the JSON array stored in tag columns.
///
/// Absent and empty lists are both stored as NULL.
pub fn tags_to_json(tags: Option<Vec<String>>) -> Option<JsonValue> {
    tags.filter(|tags| !tags.is_empty())
        .map(|tags| JsonValue::Array(tags.into_iter().map(JsonValue::String).collect()))
}

/// Decodes a tag column back into a list of strings, skipping non-string entries.
pub fn tags_from_json(value: Option<&JsonValue>) -> Option<Vec<String>> {
    value.and_then(JsonValue::as_array).map(|items| {
        items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect()
    })
}
