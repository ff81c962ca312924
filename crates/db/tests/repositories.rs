//! Integration tests for the JSON store and its repositories.
//!
//! Each test opens a store in a fresh temporary directory and exercises:
//! - Form CRUD, assignment and scoped listing
//! - Submission creation, review and scoped listing
//! - Cascade delete of a form's submissions
//! - Persistence across reopen and tolerance of corrupt files
//! - Failed writes leaving the in-memory view unchanged

use fieldform_core::access::{FormScope, SubmissionScope};
use fieldform_core::approval::SubmissionStatus;
use fieldform_core::schema::SubmittedData;
use fieldform_core::templates;
use fieldform_core::types::DbId;
use fieldform_db::models::form::{CreateForm, UpdateForm};
use fieldform_db::models::submission::{CreateSubmission, SubmissionFilter};
use fieldform_db::repositories::{FormRepo, SubmissionRepo};
use fieldform_db::seed::{seed_demo_forms, SEED_OWNER};
use fieldform_db::store::{FORMS_FILE, SUBMISSIONS_FILE};
use fieldform_db::JsonStore;
use serde_json::json;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn open_store() -> (TempDir, JsonStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::open(dir.path()).await.unwrap();
    (dir, store)
}

fn new_form(title: &str, assigned_to: Vec<DbId>) -> CreateForm {
    CreateForm {
        title: title.to_string(),
        description: None,
        schema: templates::pole_inspection(),
        prompt: None,
        assigned_to,
    }
}

fn new_submission(form_id: DbId, submitted_by: DbId) -> CreateSubmission {
    CreateSubmission {
        form_id,
        submitted_by,
        data: SubmittedData::from_json(json!({ "voltage": 120 })),
        notifications: Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Test: forms
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_and_find_form() {
    let (_dir, store) = open_store().await;
    let owner = DbId::new_v4();

    let form = FormRepo::create(&store, owner, &new_form("Poles", vec![]))
        .await
        .unwrap();
    assert!(form.is_active);
    assert_eq!(form.created_by, owner);

    let found = FormRepo::find_by_id(&store, form.id).await.unwrap();
    assert_eq!(found, form);
    assert!(FormRepo::find_by_id(&store, DbId::new_v4()).await.is_none());
}

#[tokio::test]
async fn list_respects_scope() {
    let (_dir, store) = open_store().await;
    let manager_a = DbId::new_v4();
    let manager_b = DbId::new_v4();
    let agent = DbId::new_v4();

    FormRepo::create(&store, manager_a, &new_form("A1", vec![agent]))
        .await
        .unwrap();
    FormRepo::create(&store, manager_a, &new_form("A2", vec![]))
        .await
        .unwrap();
    FormRepo::create(&store, manager_b, &new_form("B1", vec![agent]))
        .await
        .unwrap();

    assert_eq!(FormRepo::list(&store, FormScope::All).await.len(), 3);
    assert_eq!(FormRepo::count(&store, FormScope::CreatedBy(manager_a)).await, 2);
    let assigned = FormRepo::list(&store, FormScope::AssignedTo(agent)).await;
    let titles: Vec<_> = assigned.iter().map(|f| f.title.as_str()).collect();
    assert_eq!(titles, vec!["B1", "A1"]);
}

#[tokio::test]
async fn update_changes_only_given_fields() {
    let (_dir, store) = open_store().await;
    let form = FormRepo::create(&store, DbId::new_v4(), &new_form("Old", vec![]))
        .await
        .unwrap();

    let update = UpdateForm {
        title: Some("New".into()),
        is_active: Some(false),
        ..Default::default()
    };
    let updated = FormRepo::update(&store, form.id, &update)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.title, "New");
    assert!(!updated.is_active);
    assert_eq!(updated.schema, form.schema);
    assert!(updated.updated_at >= form.updated_at);

    let missing = FormRepo::update(&store, DbId::new_v4(), &update).await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn assign_replaces_and_dedups_agents() {
    let (_dir, store) = open_store().await;
    let a = DbId::new_v4();
    let b = DbId::new_v4();
    let form = FormRepo::create(&store, DbId::new_v4(), &new_form("F", vec![a]))
        .await
        .unwrap();

    let updated = FormRepo::assign(&store, form.id, &[b, b, a])
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.assigned_to, vec![b, a]);
}

#[tokio::test]
async fn delete_form_cascades_to_submissions() {
    let (_dir, store) = open_store().await;
    let agent = DbId::new_v4();
    let keep = FormRepo::create(&store, DbId::new_v4(), &new_form("Keep", vec![agent]))
        .await
        .unwrap();
    let doomed = FormRepo::create(&store, DbId::new_v4(), &new_form("Doomed", vec![agent]))
        .await
        .unwrap();
    SubmissionRepo::create(&store, &new_submission(keep.id, agent))
        .await
        .unwrap();
    SubmissionRepo::create(&store, &new_submission(doomed.id, agent))
        .await
        .unwrap();

    assert!(FormRepo::delete(&store, doomed.id).await.unwrap());
    assert!(!FormRepo::delete(&store, doomed.id).await.unwrap());

    let remaining =
        SubmissionRepo::list(&store, SubmissionScope::All, &SubmissionFilter::default()).await;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].form_id, keep.id);
}

// ---------------------------------------------------------------------------
// Test: submissions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn submission_starts_pending_and_records_review() {
    let (_dir, store) = open_store().await;
    let agent = DbId::new_v4();
    let reviewer = DbId::new_v4();
    let form = FormRepo::create(&store, reviewer, &new_form("F", vec![agent]))
        .await
        .unwrap();

    let submission = SubmissionRepo::create(&store, &new_submission(form.id, agent))
        .await
        .unwrap();
    assert_eq!(submission.status, SubmissionStatus::Pending);
    assert!(submission.reviewed_by.is_none());

    let reviewed =
        SubmissionRepo::update_status(&store, submission.id, SubmissionStatus::Approved, reviewer)
            .await
            .unwrap()
            .unwrap();
    assert_eq!(reviewed.status, SubmissionStatus::Approved);
    assert_eq!(reviewed.reviewed_by, Some(reviewer));
    assert!(reviewed.reviewed_at.is_some());

    let redecided =
        SubmissionRepo::update_status(&store, submission.id, SubmissionStatus::Rejected, reviewer)
            .await
            .unwrap()
            .unwrap();
    assert_eq!(redecided.status, SubmissionStatus::Rejected);
}

#[tokio::test]
async fn submission_list_scopes_and_filters() {
    let (_dir, store) = open_store().await;
    let manager = DbId::new_v4();
    let other_manager = DbId::new_v4();
    let agent_a = DbId::new_v4();
    let agent_b = DbId::new_v4();
    let mine = FormRepo::create(&store, manager, &new_form("Mine", vec![agent_a, agent_b]))
        .await
        .unwrap();
    let theirs = FormRepo::create(&store, other_manager, &new_form("Theirs", vec![agent_a]))
        .await
        .unwrap();

    let first = SubmissionRepo::create(&store, &new_submission(mine.id, agent_a))
        .await
        .unwrap();
    SubmissionRepo::create(&store, &new_submission(mine.id, agent_b))
        .await
        .unwrap();
    SubmissionRepo::create(&store, &new_submission(theirs.id, agent_a))
        .await
        .unwrap();
    SubmissionRepo::update_status(&store, first.id, SubmissionStatus::Approved, manager)
        .await
        .unwrap();

    let none = SubmissionFilter::default();
    assert_eq!(
        SubmissionRepo::list(&store, SubmissionScope::FormsCreatedBy(manager), &none)
            .await
            .len(),
        2
    );
    assert_eq!(
        SubmissionRepo::list(&store, SubmissionScope::SubmittedBy(agent_a), &none)
            .await
            .len(),
        2
    );

    let approved = SubmissionFilter {
        status: Some(SubmissionStatus::Approved),
        ..Default::default()
    };
    let listed = SubmissionRepo::list(&store, SubmissionScope::All, &approved).await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, first.id);

    let by_form = SubmissionFilter {
        form_id: Some(theirs.id),
        ..Default::default()
    };
    assert_eq!(
        SubmissionRepo::list(&store, SubmissionScope::All, &by_form)
            .await
            .len(),
        1
    );

    let at = first.created_at;
    let window = |from, to| SubmissionFilter {
        created_from: from,
        created_to: to,
        ..Default::default()
    };
    let inside = SubmissionRepo::list(&store, SubmissionScope::All, &window(Some(at), Some(at))).await;
    assert!(inside.iter().any(|s| s.id == first.id));
    let after = window(Some(at + chrono::Duration::milliseconds(1)), None);
    let listed = SubmissionRepo::list(&store, SubmissionScope::All, &after).await;
    assert!(listed.iter().all(|s| s.id != first.id));
    let before = window(None, Some(at - chrono::Duration::milliseconds(1)));
    let listed = SubmissionRepo::list(&store, SubmissionScope::All, &before).await;
    assert!(listed.iter().all(|s| s.id != first.id));
}

#[tokio::test]
async fn delete_submission() {
    let (_dir, store) = open_store().await;
    let agent = DbId::new_v4();
    let form = FormRepo::create(&store, DbId::new_v4(), &new_form("F", vec![agent]))
        .await
        .unwrap();
    let submission = SubmissionRepo::create(&store, &new_submission(form.id, agent))
        .await
        .unwrap();

    assert!(SubmissionRepo::delete(&store, submission.id).await.unwrap());
    assert!(SubmissionRepo::find_by_id(&store, submission.id).await.is_none());
    assert!(!SubmissionRepo::delete(&store, submission.id).await.unwrap());
}

// ---------------------------------------------------------------------------
// Test: persistence
// ---------------------------------------------------------------------------

#[tokio::test]
async fn data_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let agent = DbId::new_v4();
    let (form_id, submission_id) = {
        let store = JsonStore::open(dir.path()).await.unwrap();
        let form = FormRepo::create(&store, DbId::new_v4(), &new_form("Durable", vec![agent]))
            .await
            .unwrap();
        let submission = SubmissionRepo::create(&store, &new_submission(form.id, agent))
            .await
            .unwrap();
        (form.id, submission.id)
    };

    assert!(dir.path().join(FORMS_FILE).exists());
    assert!(dir.path().join(SUBMISSIONS_FILE).exists());

    let reopened = JsonStore::open(dir.path()).await.unwrap();
    let form = FormRepo::find_by_id(&reopened, form_id).await.unwrap();
    assert_eq!(form.title, "Durable");
    assert_eq!(form.schema, templates::pole_inspection());
    let submission = SubmissionRepo::find_by_id(&reopened, submission_id)
        .await
        .unwrap();
    assert_eq!(submission.data.get("voltage").unwrap().to_number(), 120.0);
}

#[tokio::test]
async fn corrupt_file_reads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(FORMS_FILE), b"{ not json").unwrap();

    let store = JsonStore::open(dir.path()).await.unwrap();
    assert!(FormRepo::list(&store, FormScope::All).await.is_empty());
}

/// Replace a collection file with a non-empty directory so the rename in
/// the next write to it fails.
fn block_writes(dir: &std::path::Path, file: &str) {
    let path = dir.join(file);
    let _ = std::fs::remove_file(&path);
    std::fs::create_dir(&path).unwrap();
    std::fs::write(path.join("occupied"), b"x").unwrap();
}

#[tokio::test]
async fn failed_form_writes_leave_memory_unchanged() {
    let (dir, store) = open_store().await;
    let owner = DbId::new_v4();
    let form = FormRepo::create(&store, owner, &new_form("Original", vec![]))
        .await
        .unwrap();
    block_writes(dir.path(), FORMS_FILE);

    assert!(FormRepo::create(&store, owner, &new_form("Lost", vec![]))
        .await
        .is_err());
    assert_eq!(FormRepo::list(&store, FormScope::All).await.len(), 1);

    let update = UpdateForm {
        title: Some("Renamed".into()),
        ..Default::default()
    };
    assert!(FormRepo::update(&store, form.id, &update).await.is_err());
    assert!(FormRepo::assign(&store, form.id, &[DbId::new_v4()])
        .await
        .is_err());
    assert!(FormRepo::delete(&store, form.id).await.is_err());

    let current = FormRepo::find_by_id(&store, form.id).await.unwrap();
    assert_eq!(current, form);
}

#[tokio::test]
async fn failed_submission_writes_leave_memory_unchanged() {
    let (dir, store) = open_store().await;
    let agent = DbId::new_v4();
    let form = FormRepo::create(&store, DbId::new_v4(), &new_form("Poles", vec![agent]))
        .await
        .unwrap();
    let submission = SubmissionRepo::create(&store, &new_submission(form.id, agent))
        .await
        .unwrap();
    block_writes(dir.path(), SUBMISSIONS_FILE);

    assert!(SubmissionRepo::create(&store, &new_submission(form.id, agent))
        .await
        .is_err());
    assert!(
        SubmissionRepo::update_status(&store, submission.id, SubmissionStatus::Approved, agent)
            .await
            .is_err()
    );
    assert!(SubmissionRepo::delete(&store, submission.id).await.is_err());

    let all = SubmissionRepo::list(&store, SubmissionScope::All, &SubmissionFilter::default()).await;
    assert_eq!(all, vec![submission]);
}

#[tokio::test]
async fn store_recovers_once_writes_succeed_again() {
    let (dir, store) = open_store().await;
    let owner = DbId::new_v4();
    block_writes(dir.path(), FORMS_FILE);
    assert!(FormRepo::create(&store, owner, &new_form("Lost", vec![]))
        .await
        .is_err());

    std::fs::remove_dir_all(dir.path().join(FORMS_FILE)).unwrap();
    FormRepo::create(&store, owner, &new_form("Kept", vec![]))
        .await
        .unwrap();

    let reopened = JsonStore::open(dir.path()).await.unwrap();
    let titles: Vec<_> = FormRepo::list(&reopened, FormScope::All)
        .await
        .into_iter()
        .map(|f| f.title)
        .collect();
    assert_eq!(titles, vec!["Kept"]);
}

// ---------------------------------------------------------------------------
// Test: seeding
// ---------------------------------------------------------------------------

#[tokio::test]
async fn seed_runs_once_on_empty_store() {
    let (_dir, store) = open_store().await;

    assert_eq!(seed_demo_forms(&store).await.unwrap(), 3);
    assert_eq!(seed_demo_forms(&store).await.unwrap(), 0);

    let forms = FormRepo::list(&store, FormScope::CreatedBy(SEED_OWNER)).await;
    assert_eq!(forms.len(), 3);
    assert!(forms
        .iter()
        .any(|f| f.title == templates::SITE_SAFETY_AUDIT_TITLE));
}
