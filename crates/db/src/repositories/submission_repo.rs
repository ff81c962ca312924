//! Repository for the `submissions` collection.

use chrono::Utc;
use fieldform_core::access::SubmissionScope;
use fieldform_core::approval::SubmissionStatus;
use fieldform_core::types::DbId;

use crate::models::submission::{CreateSubmission, Submission, SubmissionFilter};
use crate::store::{Collections, JsonStore, StoreError};

/// Provides CRUD operations for submissions.
pub struct SubmissionRepo;

impl SubmissionRepo {
    /// Store an accepted submission as `pending`.
    pub async fn create(
        store: &JsonStore,
        input: &CreateSubmission,
    ) -> Result<Submission, StoreError> {
        let now = Utc::now();
        let submission = Submission {
            id: DbId::new_v4(),
            form_id: input.form_id,
            submitted_by: input.submitted_by,
            data: input.data.clone(),
            notifications: input.notifications.clone(),
            status: SubmissionStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
            created_at: now,
            updated_at: now,
        };

        let mut data = store.write().await;
        let mut submissions = data.submissions.clone();
        submissions.insert(submission.id, submission.clone());
        store.commit_submissions(&mut data, submissions).await?;
        Ok(submission)
    }

    pub async fn find_by_id(store: &JsonStore, id: DbId) -> Option<Submission> {
        store.read().await.submissions.get(&id).cloned()
    }

    /// List submissions visible under `scope` and matching `filter`,
    /// newest first.
    pub async fn list(
        store: &JsonStore,
        scope: SubmissionScope,
        filter: &SubmissionFilter,
    ) -> Vec<Submission> {
        let data = store.read().await;
        let mut submissions: Vec<Submission> = data
            .submissions
            .values()
            .filter(|s| in_scope(&data, s, scope))
            .filter(|s| filter.form_id.map_or(true, |id| s.form_id == id))
            .filter(|s| filter.status.map_or(true, |status| s.status == status))
            .filter(|s| filter.created_from.map_or(true, |from| s.created_at >= from))
            .filter(|s| filter.created_to.map_or(true, |to| s.created_at <= to))
            .cloned()
            .collect();
        submissions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        submissions
    }

    /// Record a review decision. Returns `None` if the submission does not
    /// exist.
    pub async fn update_status(
        store: &JsonStore,
        id: DbId,
        status: SubmissionStatus,
        reviewed_by: DbId,
    ) -> Result<Option<Submission>, StoreError> {
        let mut data = store.write().await;
        let mut submissions = data.submissions.clone();
        let Some(submission) = submissions.get_mut(&id) else {
            return Ok(None);
        };
        let now = Utc::now();
        submission.status = status;
        submission.reviewed_by = Some(reviewed_by);
        submission.reviewed_at = Some(now);
        submission.updated_at = now;
        let updated = submission.clone();

        store.commit_submissions(&mut data, submissions).await?;
        Ok(Some(updated))
    }

    /// Delete a submission by ID. Returns `true` if it existed.
    pub async fn delete(store: &JsonStore, id: DbId) -> Result<bool, StoreError> {
        let mut data = store.write().await;
        let mut submissions = data.submissions.clone();
        if submissions.remove(&id).is_none() {
            return Ok(false);
        }
        store.commit_submissions(&mut data, submissions).await?;
        Ok(true)
    }
}

fn in_scope(data: &Collections, submission: &Submission, scope: SubmissionScope) -> bool {
    match scope {
        SubmissionScope::All => true,
        SubmissionScope::SubmittedBy(user) => submission.submitted_by == user,
        SubmissionScope::FormsCreatedBy(user) => data
            .forms
            .get(&submission.form_id)
            .is_some_and(|f| f.created_by == user),
    }
}
