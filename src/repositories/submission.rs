//! # Submission Repository
//!
//! Persistence for organization submissions. Review transitions are
//! conditional single-statement updates guarded on `status = 'pending'`, so
//! of two concurrent reviews at most one can claim the row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    sea_query::Expr,
};
use uuid::Uuid;

use super::OrganizationContent;
use crate::error::RepositoryError;
use crate::models::organization_submission::{
    ActiveModel as SubmissionActiveModel, Column, Entity as Submission, Model as SubmissionModel,
};
use crate::models::{SubmissionStatus, tags_to_json};

/// Storage operations the workflow engine needs for submissions.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Persists a new pending submission.
    async fn insert<C>(
        &self,
        conn: &C,
        submitted_by: &str,
        content: OrganizationContent,
        submitted_at: DateTime<Utc>,
    ) -> Result<SubmissionModel, RepositoryError>
    where
        C: ConnectionTrait;

    async fn find_by_id<C>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<Option<SubmissionModel>, RepositoryError>
    where
        C: ConnectionTrait;

    /// Submissions of one submitter, newest first.
    async fn list_by_submitter<C>(
        &self,
        conn: &C,
        submitted_by: &str,
    ) -> Result<Vec<SubmissionModel>, RepositoryError>
    where
        C: ConnectionTrait;

    /// Submissions in the given status, newest first.
    async fn list_by_status<C>(
        &self,
        conn: &C,
        status: SubmissionStatus,
    ) -> Result<Vec<SubmissionModel>, RepositoryError>
    where
        C: ConnectionTrait;

    /// Every submission, newest first.
    async fn list_all<C>(&self, conn: &C) -> Result<Vec<SubmissionModel>, RepositoryError>
    where
        C: ConnectionTrait;

    /// Moves a pending submission to `approved`.
    ///
    /// Returns `false` when the row is missing or no longer pending.
    async fn mark_approved<C>(
        &self,
        conn: &C,
        id: Uuid,
        reviewer: &str,
        reviewed_at: DateTime<Utc>,
        organization_id: Uuid,
    ) -> Result<bool, RepositoryError>
    where
        C: ConnectionTrait;

    /// Moves a pending submission to `rejected`.
    ///
    /// Returns `false` when the row is missing or no longer pending.
    async fn mark_rejected<C>(
        &self,
        conn: &C,
        id: Uuid,
        reviewer: &str,
        reason: &str,
        reviewed_at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError>
    where
        C: ConnectionTrait;
}

/// SeaORM implementation of [`SubmissionStore`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmissionRepository;

impl SubmissionRepository {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SubmissionStore for SubmissionRepository {
    async fn insert<C>(
        &self,
        conn: &C,
        submitted_by: &str,
        content: OrganizationContent,
        submitted_at: DateTime<Utc>,
    ) -> Result<SubmissionModel, RepositoryError>
    where
        C: ConnectionTrait,
    {
        let submission = SubmissionActiveModel {
            id: Set(Uuid::new_v4()),
            submitted_by: Set(submitted_by.to_string()),
            name: Set(content.name),
            name_ar: Set(content.name_ar),
            org_type: Set(content.org_type),
            sub_type: Set(content.sub_type),
            description: Set(content.description),
            description_ar: Set(content.description_ar),
            logo_url: Set(content.logo_url),
            website: Set(content.website),
            linkedin_url: Set(content.linkedin_url),
            contact_email: Set(content.contact_email),
            region: Set(content.region),
            sector_focus: Set(tags_to_json(content.sector_focus)),
            sdg_focus: Set(tags_to_json(content.sdg_focus)),
            services: Set(tags_to_json(content.services)),
            status: Set(SubmissionStatus::Pending),
            submitted_at: Set(submitted_at.into()),
            reviewed_at: Set(None),
            reviewed_by: Set(None),
            rejection_reason: Set(None),
            organization_id: Set(None),
        };

        submission
            .insert(conn)
            .await
            .map_err(RepositoryError::database_error)
    }

    async fn find_by_id<C>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<Option<SubmissionModel>, RepositoryError>
    where
        C: ConnectionTrait,
    {
        Submission::find_by_id(id)
            .one(conn)
            .await
            .map_err(RepositoryError::database_error)
    }

    async fn list_by_submitter<C>(
        &self,
        conn: &C,
        submitted_by: &str,
    ) -> Result<Vec<SubmissionModel>, RepositoryError>
    where
        C: ConnectionTrait,
    {
        Submission::find()
            .filter(Column::SubmittedBy.eq(submitted_by))
            .order_by_desc(Column::SubmittedAt)
            .order_by_desc(Column::Id)
            .all(conn)
            .await
            .map_err(RepositoryError::database_error)
    }

    async fn list_by_status<C>(
        &self,
        conn: &C,
        status: SubmissionStatus,
    ) -> Result<Vec<SubmissionModel>, RepositoryError>
    where
        C: ConnectionTrait,
    {
        Submission::find()
            .filter(Column::Status.eq(status))
            .order_by_desc(Column::SubmittedAt)
            .order_by_desc(Column::Id)
            .all(conn)
            .await
            .map_err(RepositoryError::database_error)
    }

    async fn list_all<C>(&self, conn: &C) -> Result<Vec<SubmissionModel>, RepositoryError>
    where
        C: ConnectionTrait,
    {
        Submission::find()
            .order_by_desc(Column::SubmittedAt)
            .order_by_desc(Column::Id)
            .all(conn)
            .await
            .map_err(RepositoryError::database_error)
    }

    async fn mark_approved<C>(
        &self,
        conn: &C,
        id: Uuid,
        reviewer: &str,
        reviewed_at: DateTime<Utc>,
        organization_id: Uuid,
    ) -> Result<bool, RepositoryError>
    where
        C: ConnectionTrait,
    {
        let result = Submission::update_many()
            .col_expr(Column::Status, Expr::value(SubmissionStatus::Approved.as_str()))
            .col_expr(Column::ReviewedBy, Expr::value(reviewer.to_string()))
            .col_expr(
                Column::ReviewedAt,
                Expr::value(sea_orm::prelude::DateTimeWithTimeZone::from(reviewed_at)),
            )
            .col_expr(Column::OrganizationId, Expr::value(organization_id))
            .filter(Column::Id.eq(id))
            .filter(Column::Status.eq(SubmissionStatus::Pending))
            .exec(conn)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(result.rows_affected == 1)
    }

    async fn mark_rejected<C>(
        &self,
        conn: &C,
        id: Uuid,
        reviewer: &str,
        reason: &str,
        reviewed_at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError>
    where
        C: ConnectionTrait,
    {
        let result = Submission::update_many()
            .col_expr(Column::Status, Expr::value(SubmissionStatus::Rejected.as_str()))
            .col_expr(Column::ReviewedBy, Expr::value(reviewer.to_string()))
            .col_expr(
                Column::ReviewedAt,
                Expr::value(sea_orm::prelude::DateTimeWithTimeZone::from(reviewed_at)),
            )
            .col_expr(Column::RejectionReason, Expr::value(reason.to_string()))
            .filter(Column::Id.eq(id))
            .filter(Column::Status.eq(SubmissionStatus::Pending))
            .exec(conn)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(result.rows_affected == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{Database, DatabaseConnection};

    async fn setup() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db
    }

    fn content(name: &str) -> OrganizationContent {
        OrganizationContent {
            name: name.to_string(),
            org_type: "Non-Profit Organization".to_string(),
            description: "Community programs".to_string(),
            region: "Riyadh".to_string(),
            sdg_focus: Some(vec!["4".to_string(), "13".to_string()]),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn insert_starts_pending_with_empty_review_fields() {
        let db = setup().await;
        let repo = SubmissionRepository::new();

        let created = repo
            .insert(&db, "user-1", content("Green Future"), Utc::now())
            .await
            .unwrap();

        assert_eq!(created.status, SubmissionStatus::Pending);
        assert!(created.reviewed_at.is_none());
        assert!(created.reviewed_by.is_none());
        assert!(created.rejection_reason.is_none());
        assert!(created.sector_focus.is_none());

        let loaded = repo.find_by_id(&db, created.id).await.unwrap().unwrap();
        assert_eq!(OrganizationContent::from(&loaded), content("Green Future"));
    }

    #[tokio::test]
    async fn lists_are_newest_first_and_filtered() {
        let db = setup().await;
        let repo = SubmissionRepository::new();
        let base = Utc::now();

        let older = repo
            .insert(&db, "user-1", content("Older"), base - Duration::minutes(5))
            .await
            .unwrap();
        let newer = repo
            .insert(&db, "user-1", content("Newer"), base)
            .await
            .unwrap();
        let foreign = repo
            .insert(&db, "user-2", content("Foreign"), base - Duration::minutes(1))
            .await
            .unwrap();

        let mine = repo.list_by_submitter(&db, "user-1").await.unwrap();
        let ids: Vec<_> = mine.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);

        let all = repo.list_all(&db).await.unwrap();
        let ids: Vec<_> = all.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![newer.id, foreign.id, older.id]);
    }

    #[tokio::test]
    async fn conditional_transitions_apply_once() {
        let db = setup().await;
        let repo = SubmissionRepository::new();
        let created = repo
            .insert(&db, "user-1", content("Once"), Utc::now())
            .await
            .unwrap();

        let rejected = repo
            .mark_rejected(&db, created.id, "admin", "Incomplete profile", Utc::now())
            .await
            .unwrap();
        assert!(rejected);

        let approved = repo
            .mark_approved(&db, created.id, "admin", Utc::now(), Uuid::new_v4())
            .await
            .unwrap();
        assert!(!approved);

        let again = repo
            .mark_rejected(&db, created.id, "admin", "Other reason", Utc::now())
            .await
            .unwrap();
        assert!(!again);

        let stored = repo.find_by_id(&db, created.id).await.unwrap().unwrap();
        assert_eq!(stored.status, SubmissionStatus::Rejected);
        assert_eq!(stored.rejection_reason.as_deref(), Some("Incomplete profile"));
        assert_eq!(stored.reviewed_by.as_deref(), Some("admin"));
        assert!(stored.organization_id.is_none());

        let pending = repo
            .list_by_status(&db, SubmissionStatus::Pending)
            .await
            .unwrap();
        assert!(pending.is_empty());
    }

    #[tokio::test]
    async fn transition_on_missing_row_reports_false() {
        let db = setup().await;
        let repo = SubmissionRepository::new();

        let claimed = repo
            .mark_approved(&db, Uuid::new_v4(), "admin", Utc::now(), Uuid::new_v4())
            .await
            .unwrap();
        assert!(!claimed);
    }
}
