//! Handlers for submitting forms and reviewing submissions.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use fieldform_core::approval::{parse_decision, SubmissionStatus};
use fieldform_core::error::CoreError;
use fieldform_core::notify::{check_notifications, NotificationEvent};
use fieldform_core::schema::SubmittedData;
use fieldform_core::types::DbId;
use fieldform_core::validation::validate_submission;
use fieldform_db::models::submission::{CreateSubmission, Submission, SubmissionFilter};
use fieldform_db::repositories::{FormRepo, SubmissionRepo};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::handlers::forms::load_form;
use crate::middleware::rbac::{RequireAdmin, RequireAuth, RequireManager};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateSubmissionRequest {
    pub form_id: DbId,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Serialize)]
pub struct SubmissionCreated {
    pub submission: Submission,
    pub notifications: Vec<NotificationEvent>,
    pub has_notifications: bool,
}

#[derive(Debug, Deserialize)]
pub struct ListSubmissionsParams {
    pub form_id: Option<DbId>,
    pub status: Option<SubmissionStatus>,
}

#[derive(Debug, Serialize)]
pub struct SubmissionList {
    pub count: usize,
    pub submissions: Vec<Submission>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub status: String,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn load_submission(state: &AppState, id: DbId) -> AppResult<Submission> {
    SubmissionRepo::find_by_id(&state.store, id)
        .await
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Submission",
            id,
        }))
}

/// Creator of the submission's form; `None` once the form is gone.
async fn form_owner(state: &AppState, submission: &Submission) -> Option<DbId> {
    FormRepo::find_by_id(&state.store, submission.form_id)
        .await
        .map(|f| f.created_by)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/submissions
///
/// Validate the data against the form schema. Invalid data is rejected with
/// every validation message; valid data is evaluated for threshold
/// notifications and stored as `pending`.
pub async fn create_submission(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(input): Json<CreateSubmissionRequest>,
) -> AppResult<impl IntoResponse> {
    let form = load_form(&state, input.form_id).await?;
    user.actor().ensure_can_submit(&form.assigned_to)?;
    if !form.is_active {
        return Err(AppError::Core(CoreError::Conflict(
            "Form is not accepting submissions".into(),
        )));
    }

    let data = SubmittedData::from_json(input.data);
    let result = validate_submission(&data, &form.schema);
    if !result.is_valid {
        tracing::debug!(
            form_id = %form.id,
            user_id = %user.user_id,
            errors = result.errors.len(),
            "Submission rejected by validation",
        );
        return Err(AppError::SubmissionRejected {
            validation_errors: result.messages(),
        });
    }

    let notifications = check_notifications(&form.schema, &data);
    let submission = SubmissionRepo::create(
        &state.store,
        &CreateSubmission {
            form_id: form.id,
            submitted_by: user.user_id,
            data,
            notifications: notifications.clone(),
        },
    )
    .await?;

    for event in &notifications {
        tracing::warn!(
            submission_id = %submission.id,
            form_id = %form.id,
            field = %event.field,
            condition = %event.condition,
            "{}",
            event.message
        );
    }
    tracing::info!(
        submission_id = %submission.id,
        form_id = %form.id,
        user_id = %user.user_id,
        notifications = notifications.len(),
        "Submission stored",
    );

    let has_notifications = !notifications.is_empty();
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: SubmissionCreated {
                submission,
                notifications,
                has_notifications,
            },
        }),
    ))
}

/// GET /api/v1/submissions
///
/// Newest first. Admins see everything, managers submissions to forms they
/// created, field agents their own. Optional `form_id` and `status` query
/// parameters narrow the list further.
pub async fn list_submissions(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<ListSubmissionsParams>,
) -> AppResult<impl IntoResponse> {
    let filter = SubmissionFilter {
        form_id: params.form_id,
        status: params.status,
        ..Default::default()
    };
    let submissions =
        SubmissionRepo::list(&state.store, user.actor().submission_scope(), &filter).await;

    Ok(Json(DataResponse {
        data: SubmissionList {
            count: submissions.len(),
            submissions,
        },
    }))
}

/// GET /api/v1/submissions/{id}
pub async fn get_submission(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let submission = load_submission(&state, id).await?;
    let owner = form_owner(&state, &submission).await;
    if !user
        .actor()
        .can_view_submission(submission.submitted_by, owner)
    {
        return Err(AppError::Core(CoreError::Forbidden(
            "You do not have access to this submission".into(),
        )));
    }
    Ok(Json(DataResponse { data: submission }))
}

/// PUT /api/v1/submissions/{id}/status
///
/// Approve or reject a submission. A later decision replaces an earlier one.
pub async fn update_submission_status(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateStatusRequest>,
) -> AppResult<impl IntoResponse> {
    let status = parse_decision(&input.status)?;

    let submission = load_submission(&state, id).await?;
    let owner = form_owner(&state, &submission).await;
    if !user.actor().can_review_submission(owner) {
        return Err(AppError::Core(CoreError::Forbidden(
            "You can only review submissions to forms you created".into(),
        )));
    }

    let updated = SubmissionRepo::update_status(&state.store, id, status, user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Submission",
            id,
        }))?;

    tracing::info!(
        submission_id = %id,
        status = %status,
        reviewer = %user.user_id,
        "Submission reviewed",
    );

    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/submissions/{id}
pub async fn delete_submission(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !SubmissionRepo::delete(&state.store, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Submission",
            id,
        }));
    }

    tracing::info!(submission_id = %id, user_id = %admin.user_id, "Submission deleted");
    Ok(StatusCode::NO_CONTENT)
}
