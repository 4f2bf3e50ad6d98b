//! # Organization Repository
//!
//! Persistence for directory organizations: the insert used when a submission
//! is approved, plus the read and maintenance operations of the admin back office.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, ModelTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::OrganizationContent;
use crate::error::RepositoryError;
use crate::models::organization::{
    ActiveModel as OrganizationActiveModel, Column, Entity as Organization,
    Model as OrganizationModel,
};
use crate::models::tags_to_json;

/// Organization row to be inserted.
#[derive(Debug, Clone)]
pub struct NewOrganization {
    /// Caller-chosen id, so a submission can reference it before the insert
    pub id: Uuid,
    pub content: OrganizationContent,
    pub status: Option<String>,
    pub source_submission_id: Option<Uuid>,
}

impl NewOrganization {
    /// Organization created directly by an administrator.
    pub fn standalone(content: OrganizationContent, status: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content,
            status,
            source_submission_id: None,
        }
    }
}

/// Storage operations the workflow engine needs for organizations.
#[async_trait]
pub trait OrganizationStore: Send + Sync {
    async fn insert<C>(
        &self,
        conn: &C,
        organization: NewOrganization,
    ) -> Result<OrganizationModel, RepositoryError>
    where
        C: ConnectionTrait;
}

/// SeaORM implementation of [`OrganizationStore`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OrganizationRepository;

impl OrganizationRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn find_by_id<C>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<Option<OrganizationModel>, RepositoryError>
    where
        C: ConnectionTrait,
    {
        Organization::find_by_id(id)
            .one(conn)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Finds the organization materialized from a submission.
    pub async fn find_by_source_submission<C>(
        &self,
        conn: &C,
        submission_id: Uuid,
    ) -> Result<Option<OrganizationModel>, RepositoryError>
    where
        C: ConnectionTrait,
    {
        Organization::find()
            .filter(Column::SourceSubmissionId.eq(submission_id))
            .one(conn)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Lists organizations alphabetically, optionally restricted to a region.
    pub async fn list<C>(
        &self,
        conn: &C,
        region: Option<&str>,
    ) -> Result<Vec<OrganizationModel>, RepositoryError>
    where
        C: ConnectionTrait,
    {
        let mut query = Organization::find();
        if let Some(region) = region {
            query = query.filter(Column::Region.eq(region));
        }

        query
            .order_by_asc(Column::Name)
            .all(conn)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Replaces the descriptive content (and optionally status) of an organization.
    pub async fn update<C>(
        &self,
        conn: &C,
        id: Uuid,
        content: OrganizationContent,
        status: Option<String>,
    ) -> Result<OrganizationModel, RepositoryError>
    where
        C: ConnectionTrait,
    {
        let existing = self
            .find_by_id(conn, id)
            .await?
            .ok_or_else(|| RepositoryError::not_found(format!("Organization {id} not found")))?;

        let mut active = existing.into_active_model();
        apply_content(&mut active, content);
        if let Some(status) = status {
            active.status = Set(Some(status));
        }

        active
            .update(conn)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn delete<C>(&self, conn: &C, id: Uuid) -> Result<(), RepositoryError>
    where
        C: ConnectionTrait,
    {
        let existing = self
            .find_by_id(conn, id)
            .await?
            .ok_or_else(|| RepositoryError::not_found(format!("Organization {id} not found")))?;

        existing
            .delete(conn)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(())
    }
}

#[async_trait]
impl OrganizationStore for OrganizationRepository {
    async fn insert<C>(
        &self,
        conn: &C,
        organization: NewOrganization,
    ) -> Result<OrganizationModel, RepositoryError>
    where
        C: ConnectionTrait,
    {
        let mut active = OrganizationActiveModel {
            id: Set(organization.id),
            status: Set(organization.status),
            source_submission_id: Set(organization.source_submission_id),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };
        apply_content(&mut active, organization.content);

        active
            .insert(conn)
            .await
            .map_err(RepositoryError::database_error)
    }
}

fn apply_content(active: &mut OrganizationActiveModel, content: OrganizationContent) {
    active.name = Set(content.name);
    active.name_ar = Set(content.name_ar);
    active.org_type = Set(content.org_type);
    active.sub_type = Set(content.sub_type);
    active.description = Set(content.description);
    active.description_ar = Set(content.description_ar);
    active.logo_url = Set(content.logo_url);
    active.website = Set(content.website);
    active.linkedin_url = Set(content.linkedin_url);
    active.contact_email = Set(content.contact_email);
    active.region = Set(content.region);
    active.sector_focus = Set(tags_to_json(content.sector_focus));
    active.sdg_focus = Set(tags_to_json(content.sdg_focus));
    active.services = Set(tags_to_json(content.services));
}
