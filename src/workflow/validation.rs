//! Submission payload validation.
//!
//! Syntax rules are checked here without touching the store; the engine adds
//! the reference-table checks on top so that every offending field ends up in
//! one [`WorkflowError::Validation`](super::WorkflowError::Validation).

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;
use utoipa::ToSchema;

use super::error::FieldErrors;
use crate::repositories::OrganizationContent;

/// Highest UN Sustainable Development Goal number.
pub const MAX_SDG_GOAL: u8 = 17;

/// Organization proposal as sent by a user (or an administrator editing the directory).
///
/// Every field is optional at the serde level so that missing required fields
/// are reported together with all other problems.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    #[schema(example = "Green Future NGO")]
    pub name: Option<String>,
    pub name_ar: Option<String>,
    /// Organization type; must match an active organization type name
    #[serde(rename = "type")]
    #[schema(example = "Non-Profit Organization")]
    pub org_type: Option<String>,
    pub sub_type: Option<String>,
    pub description: Option<String>,
    pub description_ar: Option<String>,
    pub logo_url: Option<String>,
    pub website: Option<String>,
    pub linkedin_url: Option<String>,
    pub contact_email: Option<String>,
    /// Region; must match an active region name
    #[schema(example = "Riyadh")]
    pub region: Option<String>,
    pub sector_focus: Option<Vec<String>>,
    /// SDG goal numbers as strings, "1" to "17"
    #[schema(example = json!(["4", "13"]))]
    pub sdg_focus: Option<Vec<String>>,
    pub services: Option<Vec<String>>,
}

impl From<OrganizationContent> for SubmissionPayload {
    fn from(content: OrganizationContent) -> Self {
        Self {
            name: Some(content.name),
            name_ar: content.name_ar,
            org_type: Some(content.org_type),
            sub_type: content.sub_type,
            description: Some(content.description),
            description_ar: content.description_ar,
            logo_url: content.logo_url,
            website: content.website,
            linkedin_url: content.linkedin_url,
            contact_email: content.contact_email,
            region: Some(content.region),
            sector_focus: content.sector_focus,
            sdg_focus: content.sdg_focus,
            services: content.services,
        }
    }
}

/// Normalized content plus the syntax problems found while producing it.
#[derive(Debug, Clone)]
pub struct CheckedPayload {
    pub content: OrganizationContent,
    pub errors: FieldErrors,
}

/// Normalizes a payload and records every syntax problem.
///
/// Text is trimmed; empty optional text and empty lists become absent.
pub fn check_payload(payload: SubmissionPayload) -> CheckedPayload {
    let mut errors = FieldErrors::new();

    let name = required(&mut errors, "name", "Name", payload.name);
    let org_type = required(&mut errors, "type", "Organization type", payload.org_type);
    let description = required(&mut errors, "description", "Description", payload.description);
    let region = required(&mut errors, "region", "Region", payload.region);

    let logo_url = absolute_url(&mut errors, "logoUrl", optional(payload.logo_url));
    let website = absolute_url(&mut errors, "website", optional(payload.website));
    let linkedin_url = absolute_url(&mut errors, "linkedinUrl", optional(payload.linkedin_url));

    let contact_email = optional(payload.contact_email);
    if let Some(email) = contact_email.as_deref()
        && !email_pattern().is_match(email)
    {
        errors.insert(
            "contactEmail".to_string(),
            "Contact email must be a valid email address".to_string(),
        );
    }

    let sdg_focus = tags(payload.sdg_focus);
    if let Some(goals) = sdg_focus.as_deref() {
        let invalid: Vec<&str> = goals
            .iter()
            .map(String::as_str)
            .filter(|goal| !is_sdg_goal(goal))
            .collect();
        if !invalid.is_empty() {
            errors.insert(
                "sdgFocus".to_string(),
                format!(
                    "SDG goals must be numbers from 1 to {MAX_SDG_GOAL}; invalid: {}",
                    invalid.join(", ")
                ),
            );
        }
    }

    CheckedPayload {
        content: OrganizationContent {
            name,
            name_ar: optional(payload.name_ar),
            org_type,
            sub_type: optional(payload.sub_type),
            description,
            description_ar: optional(payload.description_ar),
            logo_url,
            website,
            linkedin_url,
            contact_email,
            region,
            sector_focus: tags(payload.sector_focus),
            sdg_focus,
            services: tags(payload.services),
        },
        errors,
    }
}

fn required(errors: &mut FieldErrors, field: &str, label: &str, value: Option<String>) -> String {
    match optional(value) {
        Some(value) => value,
        None => {
            errors.insert(field.to_string(), format!("{label} is required"));
            String::new()
        }
    }
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn tags(values: Option<Vec<String>>) -> Option<Vec<String>> {
    values
        .map(|values| {
            values
                .into_iter()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect::<Vec<_>>()
        })
        .filter(|values| !values.is_empty())
}

fn absolute_url(errors: &mut FieldErrors, field: &str, value: Option<String>) -> Option<String> {
    if let Some(raw) = value.as_deref() {
        let valid = Url::parse(raw).map(|url| url.has_host()).unwrap_or(false);
        if !valid {
            errors.insert(field.to_string(), "Must be an absolute URL".to_string());
        }
    }
    value
}

fn is_sdg_goal(goal: &str) -> bool {
    // "04" or "+4" are not goal identifiers
    goal.parse::<u8>()
        .is_ok_and(|n| (1..=MAX_SDG_GOAL).contains(&n) && n.to_string() == goal)
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"))
}
