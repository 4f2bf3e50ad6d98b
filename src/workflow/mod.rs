//! # Submission Workflow
//!
//! Moves organization submissions through their review lifecycle:
//!
//! ```text
//! (new) --create--> pending --approve--> approved
//!                          \--reject---> rejected
//! ```
//!
//! `approved` and `rejected` are terminal. Approval claims the submission and
//! materializes its organization inside one transaction, so either both
//! writes land or neither does.

pub mod error;
pub mod validation;

use std::sync::Arc;

use chrono::Utc;
use metrics::counter;
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use uuid::Uuid;

pub use error::{FieldErrors, WorkflowError};
pub use validation::{CheckedPayload, SubmissionPayload, check_payload};

use crate::models::organization::{self, ACTIVE_STATUS};
use crate::models::{SubmissionStatus, organization_submission};
use crate::repositories::{
    NewOrganization, OrganizationContent, OrganizationRepository, OrganizationStore,
    ReferenceKind, ReferenceRepository, SubmissionRepository, SubmissionStore,
};

type Submission = organization_submission::Model;
type Organization = organization::Model;

/// The submission review engine.
///
/// Generic over its stores so tests can substitute failing implementations.
#[derive(Debug, Clone)]
pub struct SubmissionWorkflow<S = SubmissionRepository, O = OrganizationRepository> {
    db: Arc<DatabaseConnection>,
    submissions: S,
    organizations: O,
    references: ReferenceRepository,
}

impl SubmissionWorkflow {
    /// Engine backed by the SeaORM repositories.
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self::with_stores(db, SubmissionRepository::new(), OrganizationRepository::new())
    }
}

impl<S, O> SubmissionWorkflow<S, O>
where
    S: SubmissionStore,
    O: OrganizationStore,
{
    pub fn with_stores(db: Arc<DatabaseConnection>, submissions: S, organizations: O) -> Self {
        Self {
            db,
            submissions,
            organizations,
            references: ReferenceRepository::new(),
        }
    }

    /// Validates and records a new pending submission for `submitter_id`.
    pub async fn create(
        &self,
        submitter_id: &str,
        payload: SubmissionPayload,
    ) -> Result<Submission, WorkflowError> {
        if submitter_id.trim().is_empty() {
            return Err(WorkflowError::Authorization(
                "Submitter identity is required".to_string(),
            ));
        }

        let content = self.validate(payload).await?;
        let submission = self
            .submissions
            .insert(self.db.as_ref(), submitter_id, content, Utc::now())
            .await?;

        counter!("submissions_created_total").increment(1);
        tracing::info!(
            submission_id = %submission.id,
            submitted_by = %submission.submitted_by,
            "Organization submission created"
        );

        Ok(submission)
    }

    /// Submissions of one submitter, newest first.
    pub async fn list_mine(&self, submitter_id: &str) -> Result<Vec<Submission>, WorkflowError> {
        Ok(self
            .submissions
            .list_by_submitter(self.db.as_ref(), submitter_id)
            .await?)
    }

    /// Submissions awaiting review, newest first.
    pub async fn list_pending(&self) -> Result<Vec<Submission>, WorkflowError> {
        Ok(self
            .submissions
            .list_by_status(self.db.as_ref(), SubmissionStatus::Pending)
            .await?)
    }

    /// Every submission regardless of status, newest first.
    pub async fn list_all(&self) -> Result<Vec<Submission>, WorkflowError> {
        Ok(self.submissions.list_all(self.db.as_ref()).await?)
    }

    pub async fn get(&self, submission_id: Uuid) -> Result<Submission, WorkflowError> {
        self.submissions
            .find_by_id(self.db.as_ref(), submission_id)
            .await?
            .ok_or(WorkflowError::NotFound { id: submission_id })
    }

    /// Approves a pending submission and materializes its organization.
    pub async fn approve(
        &self,
        submission_id: Uuid,
        reviewer_id: &str,
    ) -> Result<Organization, WorkflowError> {
        let txn = self.db.begin().await?;

        let submission = self.load_pending(&txn, submission_id).await?;
        let organization_id = Uuid::new_v4();

        let claimed = self
            .submissions
            .mark_approved(&txn, submission_id, reviewer_id, Utc::now(), organization_id)
            .await?;
        if !claimed {
            return Err(self.lost_race(&txn, submission_id).await);
        }

        let organization = self
            .organizations
            .insert(
                &txn,
                NewOrganization {
                    id: organization_id,
                    content: OrganizationContent::from(&submission),
                    status: Some(ACTIVE_STATUS.to_string()),
                    source_submission_id: Some(submission_id),
                },
            )
            .await?;

        txn.commit().await?;

        counter!("submissions_approved_total").increment(1);
        tracing::info!(
            submission_id = %submission_id,
            reviewer_id = %reviewer_id,
            organization_id = %organization.id,
            "Organization submission approved"
        );

        Ok(organization)
    }

    /// Rejects a pending submission with a mandatory reason.
    pub async fn reject(
        &self,
        submission_id: Uuid,
        reviewer_id: &str,
        reason: &str,
    ) -> Result<Submission, WorkflowError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(WorkflowError::field("reason", "Rejection reason is required"));
        }

        let txn = self.db.begin().await?;

        self.load_pending(&txn, submission_id).await?;

        let claimed = self
            .submissions
            .mark_rejected(&txn, submission_id, reviewer_id, reason, Utc::now())
            .await?;
        if !claimed {
            return Err(self.lost_race(&txn, submission_id).await);
        }

        let rejected = self
            .submissions
            .find_by_id(&txn, submission_id)
            .await?
            .ok_or(WorkflowError::NotFound { id: submission_id })?;

        txn.commit().await?;

        counter!("submissions_rejected_total").increment(1);
        tracing::info!(
            submission_id = %submission_id,
            reviewer_id = %reviewer_id,
            "Organization submission rejected"
        );

        Ok(rejected)
    }

    /// Runs syntax and reference checks, returning the normalized content.
    pub async fn validate(
        &self,
        payload: SubmissionPayload,
    ) -> Result<OrganizationContent, WorkflowError> {
        self.validate_against(payload, None).await
    }

    /// Validates an edit of existing content.
    ///
    /// Reference values kept unchanged from `current` are not looked up again,
    /// so deactivating a region or type does not freeze the records using it.
    pub async fn validate_update(
        &self,
        current: &OrganizationContent,
        payload: SubmissionPayload,
    ) -> Result<OrganizationContent, WorkflowError> {
        self.validate_against(payload, Some(current)).await
    }

    async fn validate_against(
        &self,
        payload: SubmissionPayload,
        current: Option<&OrganizationContent>,
    ) -> Result<OrganizationContent, WorkflowError> {
        let CheckedPayload {
            content,
            mut errors,
        } = check_payload(payload);

        let lookups = [
            (
                "type",
                ReferenceKind::OrganizationType,
                Some(content.org_type.as_str()),
                current.map(|c| Some(c.org_type.as_str())),
            ),
            (
                "subType",
                ReferenceKind::OrganizationSubtype,
                content.sub_type.as_deref(),
                current.map(|c| c.sub_type.as_deref()),
            ),
            (
                "region",
                ReferenceKind::Region,
                Some(content.region.as_str()),
                current.map(|c| Some(c.region.as_str())),
            ),
        ];

        for (field, kind, value, previous) in lookups {
            let Some(value) = value.filter(|v| !v.is_empty()) else {
                continue;
            };
            if errors.contains_key(field) || previous == Some(Some(value)) {
                continue;
            }
            if !self
                .references
                .is_active_name(self.db.as_ref(), kind, value)
                .await?
            {
                errors.insert(
                    field.to_string(),
                    format!("{} '{value}' is not an active option", kind.label()),
                );
            }
        }

        if errors.is_empty() {
            Ok(content)
        } else {
            Err(WorkflowError::Validation { fields: errors })
        }
    }

    async fn load_pending<C>(&self, conn: &C, submission_id: Uuid) -> Result<Submission, WorkflowError>
    where
        C: ConnectionTrait,
    {
        let submission = self
            .submissions
            .find_by_id(conn, submission_id)
            .await?
            .ok_or(WorkflowError::NotFound { id: submission_id })?;

        if submission.status.is_terminal() {
            counter!("submission_transition_conflicts_total").increment(1);
            return Err(WorkflowError::InvalidState {
                id: submission_id,
                current: submission.status,
            });
        }

        Ok(submission)
    }

    /// Builds the error for a conditional update that matched no pending row.
    async fn lost_race<C>(&self, conn: &C, submission_id: Uuid) -> WorkflowError
    where
        C: ConnectionTrait,
    {
        counter!("submission_transition_conflicts_total").increment(1);
        tracing::warn!(submission_id = %submission_id, "Concurrent review already claimed submission");

        match self.submissions.find_by_id(conn, submission_id).await {
            Ok(Some(current)) => WorkflowError::InvalidState {
                id: submission_id,
                current: current.status,
            },
            Ok(None) => WorkflowError::NotFound { id: submission_id },
            Err(err) => err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RepositoryError;
    use crate::repositories::ReferenceInput;
    use async_trait::async_trait;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{Database, EntityTrait, PaginatorTrait};

    async fn setup() -> Arc<DatabaseConnection> {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let references = ReferenceRepository::new();
        for (kind, name) in [
            (ReferenceKind::OrganizationType, "Non-Profit Organization"),
            (ReferenceKind::OrganizationSubtype, "Grant Maker"),
            (ReferenceKind::Region, "Riyadh"),
        ] {
            references
                .create(
                    &db,
                    kind,
                    ReferenceInput {
                        name: name.to_string(),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
        }

        Arc::new(db)
    }

    fn payload(name: &str) -> SubmissionPayload {
        SubmissionPayload {
            name: Some(name.to_string()),
            org_type: Some("Non-Profit Organization".to_string()),
            description: Some("Environmental education".to_string()),
            region: Some("Riyadh".to_string()),
            sdg_focus: Some(vec!["4".to_string(), "13".to_string()]),
            ..Default::default()
        }
    }

    struct FailingOrganizationStore;

    #[async_trait]
    impl OrganizationStore for FailingOrganizationStore {
        async fn insert<C>(
            &self,
            _conn: &C,
            _organization: NewOrganization,
        ) -> Result<Organization, RepositoryError>
        where
            C: ConnectionTrait,
        {
            Err(RepositoryError::Database(sea_orm::DbErr::Custom(
                "organization store unavailable".to_string(),
            )))
        }
    }

    #[tokio::test]
    async fn create_records_pending_submission() {
        let workflow = SubmissionWorkflow::new(setup().await);

        let created = workflow.create("user-1", payload("Green Future NGO")).await.unwrap();

        assert_eq!(created.status, SubmissionStatus::Pending);
        assert_eq!(created.submitted_by, "user-1");
        assert!(created.reviewed_at.is_none());
        assert!(created.reviewed_by.is_none());
    }

    #[tokio::test]
    async fn unknown_reference_values_are_validation_errors() {
        let workflow = SubmissionWorkflow::new(setup().await);

        let err = workflow
            .create(
                "user-1",
                SubmissionPayload {
                    org_type: Some("Space Agency".to_string()),
                    sub_type: Some("Incubator".to_string()),
                    region: Some("Atlantis".to_string()),
                    ..payload("Green Future NGO")
                },
            )
            .await
            .unwrap_err();

        match err {
            WorkflowError::Validation { fields } => {
                assert!(fields.contains_key("type"));
                assert!(fields.contains_key("subType"));
                assert!(fields.contains_key("region"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn approve_materializes_organization() {
        let workflow = SubmissionWorkflow::new(setup().await);
        let created = workflow.create("user-1", payload("Green Future NGO")).await.unwrap();

        let org = workflow.approve(created.id, "admin").await.unwrap();
        assert_eq!(org.name, "Green Future NGO");
        assert_eq!(org.status.as_deref(), Some(ACTIVE_STATUS));
        assert_eq!(org.source_submission_id, Some(created.id));
        assert_eq!(org.sdg_focus, created.sdg_focus);

        let approved = workflow.get(created.id).await.unwrap();
        assert_eq!(approved.status, SubmissionStatus::Approved);
        assert_eq!(approved.reviewed_by.as_deref(), Some("admin"));
        assert!(approved.reviewed_at.is_some());
        assert_eq!(approved.organization_id, Some(org.id));
        assert!(approved.rejection_reason.is_none());
    }

    #[tokio::test]
    async fn failed_organization_insert_leaves_submission_pending() {
        let db = setup().await;
        let plain = SubmissionWorkflow::new(Arc::clone(&db));
        let created = plain.create("user-1", payload("Fragile")).await.unwrap();

        let failing = SubmissionWorkflow::with_stores(
            Arc::clone(&db),
            SubmissionRepository::new(),
            FailingOrganizationStore,
        );
        let err = failing.approve(created.id, "admin").await.unwrap_err();
        assert!(matches!(err, WorkflowError::Persistence(_)));

        let after = plain.get(created.id).await.unwrap();
        assert_eq!(after.status, SubmissionStatus::Pending);
        assert!(after.reviewed_by.is_none());
        assert!(after.organization_id.is_none());
        assert_eq!(
            crate::models::Organization::find()
                .count(db.as_ref())
                .await
                .unwrap(),
            0
        );

        // the submission is still reviewable
        plain.approve(created.id, "admin").await.unwrap();
    }

    #[tokio::test]
    async fn edits_keep_deactivated_references_they_already_use() {
        let db = setup().await;
        let workflow = SubmissionWorkflow::new(Arc::clone(&db));
        let current = workflow.validate(payload("Green Future NGO")).await.unwrap();

        let references = ReferenceRepository::new();
        let riyadh = references
            .list(db.as_ref(), ReferenceKind::Region, true)
            .await
            .unwrap()
            .into_iter()
            .find(|r| r.name == "Riyadh")
            .unwrap();
        references
            .update(
                db.as_ref(),
                ReferenceKind::Region,
                riyadh.id,
                crate::repositories::ReferencePatch {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        // new records may not use the retired region
        let err = workflow.validate(payload("Green Future NGO")).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Validation { ref fields } if fields.contains_key("region")));

        let edited = workflow
            .validate_update(
                &current,
                SubmissionPayload {
                    description: Some("Urban greening".to_string()),
                    ..payload("Green Future NGO")
                },
            )
            .await
            .unwrap();
        assert_eq!(edited.region, "Riyadh");
        assert_eq!(edited.description, "Urban greening");

        // changed reference values are still checked
        let err = workflow
            .validate_update(
                &current,
                SubmissionPayload {
                    org_type: Some("Space Agency".to_string()),
                    ..payload("Green Future NGO")
                },
            )
            .await
            .unwrap_err();
        match err {
            WorkflowError::Validation { fields } => {
                assert!(fields.contains_key("type"));
                assert!(!fields.contains_key("region"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_reason_is_rejected_before_store_access() {
        let workflow = SubmissionWorkflow::new(setup().await);

        let err = workflow.reject(Uuid::new_v4(), "admin", "   ").await.unwrap_err();
        match err {
            WorkflowError::Validation { fields } => assert!(fields.contains_key("reason")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn reject_records_trimmed_reason() {
        let workflow = SubmissionWorkflow::new(setup().await);
        let created = workflow.create("user-1", payload("Maybe")).await.unwrap();

        let rejected = workflow
            .reject(created.id, "admin", "  Missing registration documents ")
            .await
            .unwrap();

        assert_eq!(rejected.status, SubmissionStatus::Rejected);
        assert_eq!(
            rejected.rejection_reason.as_deref(),
            Some("Missing registration documents")
        );
        assert!(rejected.organization_id.is_none());
    }

    #[tokio::test]
    async fn terminal_submissions_cannot_transition_again() {
        let workflow = SubmissionWorkflow::new(setup().await);
        let created = workflow.create("user-1", payload("Once")).await.unwrap();
        workflow.approve(created.id, "admin").await.unwrap();

        let err = workflow.approve(created.id, "admin").await.unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::InvalidState {
                current: SubmissionStatus::Approved,
                ..
            }
        ));

        let err = workflow.reject(created.id, "admin", "Too late").await.unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidState { .. }));
    }

    #[tokio::test]
    async fn unknown_submission_is_not_found() {
        let workflow = SubmissionWorkflow::new(setup().await);
        let id = Uuid::new_v4();

        assert!(matches!(
            workflow.get(id).await,
            Err(WorkflowError::NotFound { .. })
        ));
        assert!(matches!(
            workflow.approve(id, "admin").await,
            Err(WorkflowError::NotFound { .. })
        ));
        assert!(matches!(
            workflow.reject(id, "admin", "No such thing").await,
            Err(WorkflowError::NotFound { .. })
        ));
    }
}
