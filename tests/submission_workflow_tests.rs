//! Integration tests for the submission review lifecycle against a real schema.

mod test_utils;

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use directory::error::RepositoryError;
use directory::models::SubmissionStatus;
use directory::models::organization_submission::Model as SubmissionModel;
use directory::repositories::{
    OrganizationContent, OrganizationRepository, SubmissionRepository, SubmissionStore,
};
use directory::workflow::{SubmissionWorkflow, WorkflowError};
use sea_orm::ConnectionTrait;
use test_utils::{setup_test_db_arc, valid_payload};
use uuid::Uuid;

#[tokio::test]
async fn green_future_submission_is_approved_into_the_directory() {
    let db = setup_test_db_arc().await.unwrap();
    let workflow = SubmissionWorkflow::new(db.clone());

    let submission = workflow
        .create("user-42", valid_payload("Green Future NGO"))
        .await
        .unwrap();
    assert_eq!(submission.status, SubmissionStatus::Pending);
    assert_eq!(submission.submitted_by, "user-42");

    let pending = workflow.list_pending().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, submission.id);

    let organization = workflow.approve(submission.id, "admin").await.unwrap();
    assert_eq!(organization.name, "Green Future NGO");
    assert_eq!(organization.region, "Riyadh");
    assert_eq!(organization.status.as_deref(), Some("active"));
    assert_eq!(organization.source_submission_id, Some(submission.id));

    let reviewed = workflow.get(submission.id).await.unwrap();
    assert_eq!(reviewed.status, SubmissionStatus::Approved);
    assert_eq!(reviewed.reviewed_by.as_deref(), Some("admin"));
    assert!(reviewed.reviewed_at.is_some());
    assert_eq!(reviewed.organization_id, Some(organization.id));
    assert!(reviewed.rejection_reason.is_none());

    assert!(workflow.list_pending().await.unwrap().is_empty());

    let listed = OrganizationRepository::new()
        .list(db.as_ref(), Some("Riyadh"))
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, organization.id);
}

#[tokio::test]
async fn rejection_records_reason_and_creates_no_organization() {
    let db = setup_test_db_arc().await.unwrap();
    let workflow = SubmissionWorkflow::new(db.clone());

    let submission = workflow
        .create("user-7", valid_payload("Duplicate Listing"))
        .await
        .unwrap();

    let rejected = workflow
        .reject(submission.id, "admin", "  Already listed in the directory ")
        .await
        .unwrap();
    assert_eq!(rejected.status, SubmissionStatus::Rejected);
    assert_eq!(
        rejected.rejection_reason.as_deref(),
        Some("Already listed in the directory")
    );
    assert!(rejected.organization_id.is_none());

    let organizations = OrganizationRepository::new()
        .list(db.as_ref(), None)
        .await
        .unwrap();
    assert!(organizations.is_empty());

    let err = workflow.approve(submission.id, "admin").await.unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::InvalidState {
            current: SubmissionStatus::Rejected,
            ..
        }
    ));
}

#[tokio::test]
async fn submitters_only_see_their_own_submissions() {
    let db = setup_test_db_arc().await.unwrap();
    let workflow = SubmissionWorkflow::new(db);

    let first = workflow
        .create("alice", valid_payload("Alpha Foundation"))
        .await
        .unwrap();
    let second = workflow
        .create("alice", valid_payload("Beta Initiative"))
        .await
        .unwrap();
    workflow
        .create("bob", valid_payload("Gamma Society"))
        .await
        .unwrap();

    let mine = workflow.list_mine("alice").await.unwrap();
    let ids: Vec<Uuid> = mine.iter().map(|s| s.id).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&first.id));
    assert!(ids.contains(&second.id));
    assert!(mine.iter().all(|s| s.submitted_by == "alice"));

    assert!(workflow.list_mine("carol").await.unwrap().is_empty());
    assert_eq!(workflow.list_all().await.unwrap().len(), 3);
}

#[tokio::test]
async fn listings_are_newest_first() {
    let db = setup_test_db_arc().await.unwrap();
    let workflow = SubmissionWorkflow::new(db);

    for name in ["First", "Second", "Third"] {
        workflow.create("alice", valid_payload(name)).await.unwrap();
    }

    let all = workflow.list_all().await.unwrap();
    assert!(
        all.windows(2)
            .all(|pair| pair[0].submitted_at >= pair[1].submitted_at)
    );
}

#[tokio::test]
async fn concurrent_approvals_create_exactly_one_organization() {
    let db = setup_test_db_arc().await.unwrap();
    let workflow = SubmissionWorkflow::new(db.clone());

    let submission = workflow
        .create("user-1", valid_payload("Contested NGO"))
        .await
        .unwrap();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let workflow = workflow.clone();
            let reviewer = format!("reviewer-{i}");
            tokio::spawn(async move { workflow.approve(submission.id, &reviewer).await })
        })
        .collect();

    let mut approved = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => approved += 1,
            Err(WorkflowError::InvalidState { current, .. }) => {
                assert_eq!(current, SubmissionStatus::Approved);
                conflicts += 1;
            }
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(approved, 1);
    assert_eq!(conflicts, 3);

    let organizations = OrganizationRepository::new()
        .list(db.as_ref(), None)
        .await
        .unwrap();
    assert_eq!(organizations.len(), 1);
}

#[tokio::test]
async fn approve_and_reject_race_has_a_single_winner() {
    let db = setup_test_db_arc().await.unwrap();
    let workflow = SubmissionWorkflow::new(db.clone());

    let submission = workflow
        .create("user-1", valid_payload("Raced NGO"))
        .await
        .unwrap();

    let approver = {
        let workflow = workflow.clone();
        tokio::spawn(async move { workflow.approve(submission.id, "admin-a").await.map(|_| ()) })
    };
    let rejecter = {
        let workflow = workflow.clone();
        tokio::spawn(async move {
            workflow
                .reject(submission.id, "admin-b", "Incomplete profile")
                .await
                .map(|_| ())
        })
    };

    let approve_result = approver.await.unwrap();
    let reject_result = rejecter.await.unwrap();
    assert!(
        approve_result.is_ok() != reject_result.is_ok(),
        "exactly one transition must win"
    );

    let loser = approve_result.err().or(reject_result.err()).unwrap();
    assert!(matches!(loser, WorkflowError::InvalidState { .. }));

    let stored = SubmissionRepository::new()
        .find_by_id(db.as_ref(), submission.id)
        .await
        .unwrap()
        .unwrap();
    let organizations = OrganizationRepository::new()
        .list(db.as_ref(), None)
        .await
        .unwrap();

    match stored.status {
        SubmissionStatus::Approved => {
            assert_eq!(organizations.len(), 1);
            assert!(stored.rejection_reason.is_none());
        }
        SubmissionStatus::Rejected => {
            assert!(organizations.is_empty());
            assert!(stored.organization_id.is_none());
        }
        SubmissionStatus::Pending => panic!("submission left pending"),
    }
}

#[tokio::test]
async fn inactive_reference_entries_are_not_accepted() {
    use directory::repositories::{ReferenceKind, ReferencePatch, ReferenceRepository};

    let db = setup_test_db_arc().await.unwrap();
    let references = ReferenceRepository::new();

    let regions = references
        .list(db.as_ref(), ReferenceKind::Region, true)
        .await
        .unwrap();
    let riyadh = regions.iter().find(|r| r.name == "Riyadh").unwrap();
    references
        .update(
            db.as_ref(),
            ReferenceKind::Region,
            riyadh.id,
            ReferencePatch {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let workflow = SubmissionWorkflow::new(db);
    let err = workflow
        .create("user-1", valid_payload("Inactive Region NGO"))
        .await
        .unwrap_err();

    match err {
        WorkflowError::Validation { fields } => assert!(fields.contains_key("region")),
        other => panic!("expected validation error, got {other}"),
    }
}

/// Serves one stale `pending` snapshot, then reads through to the store.
///
/// Models a reviewer whose read happened before another review committed.
struct StaleSubmissionStore {
    inner: SubmissionRepository,
    snapshot: Mutex<Option<SubmissionModel>>,
}

impl StaleSubmissionStore {
    fn new(snapshot: SubmissionModel) -> Self {
        Self {
            inner: SubmissionRepository::new(),
            snapshot: Mutex::new(Some(snapshot)),
        }
    }
}

#[async_trait]
impl SubmissionStore for StaleSubmissionStore {
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
        self.inner.insert(conn, submitted_by, content, submitted_at).await
    }

    async fn find_by_id<C>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<Option<SubmissionModel>, RepositoryError>
    where
        C: ConnectionTrait,
    {
        let stale = self
            .snapshot
            .lock()
            .unwrap()
            .take_if(|snapshot| snapshot.id == id);
        match stale {
            Some(snapshot) => Ok(Some(snapshot)),
            None => self.inner.find_by_id(conn, id).await,
        }
    }

    async fn list_by_submitter<C>(
        &self,
        conn: &C,
        submitted_by: &str,
    ) -> Result<Vec<SubmissionModel>, RepositoryError>
    where
        C: ConnectionTrait,
    {
        self.inner.list_by_submitter(conn, submitted_by).await
    }

    async fn list_by_status<C>(
        &self,
        conn: &C,
        status: SubmissionStatus,
    ) -> Result<Vec<SubmissionModel>, RepositoryError>
    where
        C: ConnectionTrait,
    {
        self.inner.list_by_status(conn, status).await
    }

    async fn list_all<C>(&self, conn: &C) -> Result<Vec<SubmissionModel>, RepositoryError>
    where
        C: ConnectionTrait,
    {
        self.inner.list_all(conn).await
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
        self.inner
            .mark_approved(conn, id, reviewer, reviewed_at, organization_id)
            .await
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
        self.inner
            .mark_rejected(conn, id, reviewer, reason, reviewed_at)
            .await
    }
}

#[tokio::test]
async fn approval_that_loses_the_conditional_update_reports_current_state() {
    let db = setup_test_db_arc().await.unwrap();
    let workflow = SubmissionWorkflow::new(db.clone());

    let submission = workflow
        .create("user-1", valid_payload("Late Review NGO"))
        .await
        .unwrap();
    let snapshot = workflow.get(submission.id).await.unwrap();

    let winner = workflow.approve(submission.id, "admin-a").await.unwrap();

    let late = SubmissionWorkflow::with_stores(
        db.clone(),
        StaleSubmissionStore::new(snapshot),
        OrganizationRepository::new(),
    );
    let err = late.approve(submission.id, "admin-b").await.unwrap_err();
    match err {
        WorkflowError::InvalidState { id, current } => {
            assert_eq!(id, submission.id);
            assert_eq!(current, SubmissionStatus::Approved);
        }
        other => panic!("expected invalid state, got {other:?}"),
    }

    let organizations = OrganizationRepository::new();
    assert_eq!(organizations.list(db.as_ref(), None).await.unwrap().len(), 1);
    let materialized = organizations
        .find_by_source_submission(db.as_ref(), submission.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(materialized.id, winner.id);

    let stored = workflow.get(submission.id).await.unwrap();
    assert_eq!(stored.reviewed_by.as_deref(), Some("admin-a"));
    assert_eq!(stored.organization_id, Some(winner.id));
}

#[tokio::test]
async fn rejection_that_loses_the_conditional_update_leaves_approval_intact() {
    let db = setup_test_db_arc().await.unwrap();
    let workflow = SubmissionWorkflow::new(db.clone());

    let submission = workflow
        .create("user-1", valid_payload("Contested Listing"))
        .await
        .unwrap();
    let snapshot = workflow.get(submission.id).await.unwrap();

    let winner = workflow.approve(submission.id, "admin-a").await.unwrap();

    let late = SubmissionWorkflow::with_stores(
        db.clone(),
        StaleSubmissionStore::new(snapshot),
        OrganizationRepository::new(),
    );
    let err = late
        .reject(submission.id, "admin-b", "Duplicate of an existing listing")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::InvalidState {
            current: SubmissionStatus::Approved,
            ..
        }
    ));

    let stored = workflow.get(submission.id).await.unwrap();
    assert_eq!(stored.status, SubmissionStatus::Approved);
    assert!(stored.rejection_reason.is_none());
    assert_eq!(stored.organization_id, Some(winner.id));
}
