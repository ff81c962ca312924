//! Handlers for the dashboard summary and submission reports.

use std::collections::HashMap;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use fieldform_core::access::FormScope;
use fieldform_core::dashboard::{StatusCounts, RECENT_SUBMISSIONS_LIMIT};
use fieldform_core::error::CoreError;
use fieldform_core::report::{Report, ReportEntry, ReportWindow};
use fieldform_core::roles::Role;
use fieldform_core::types::DbId;
use fieldform_db::models::submission::{Submission, SubmissionFilter};
use fieldform_db::repositories::{FormRepo, SubmissionRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAuth, RequireManager};
use crate::response::DataResponse;
use crate::state::AppState;

const UNKNOWN_FORM_TITLE: &str = "Unknown form";

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_forms: usize,
    pub total_submissions: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    /// Approved share of all submissions, in percent.
    pub completion_rate: f64,
    pub recent_submissions: Vec<Submission>,
}

#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub form_id: Option<DbId>,
}

/// The filters a report was built with, echoed back.
#[derive(Debug, Serialize)]
pub struct ReportFilters {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub form_id: Option<DbId>,
    pub total_submissions: usize,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub report: Report,
    pub filters: ReportFilters,
    /// `false` when insights came from the rule-based analysis.
    pub ai_generated: bool,
}

/// GET /api/v1/dashboard/stats
///
/// Counts are scoped the same way as the form and submission lists.
pub async fn get_stats(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let actor = user.actor();
    let total_forms = FormRepo::count(&state.store, actor.form_scope()).await;
    let submissions = SubmissionRepo::list(
        &state.store,
        actor.submission_scope(),
        &SubmissionFilter::default(),
    )
    .await;

    let counts = StatusCounts::tally(submissions.iter().map(|s| s.status));
    let recent_submissions = submissions
        .into_iter()
        .take(RECENT_SUBMISSIONS_LIMIT)
        .collect();

    Ok(Json(DataResponse {
        data: DashboardStats {
            total_forms,
            total_submissions: counts.total(),
            pending: counts.pending,
            approved: counts.approved,
            rejected: counts.rejected,
            completion_rate: counts.completion_rate(),
            recent_submissions,
        },
    }))
}

/// POST /api/v1/dashboard/report
///
/// Report over the caller's submissions, optionally narrowed to one form
/// and a creation-date window. Managers only see their own forms.
pub async fn generate_report(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    Json(input): Json<ReportRequest>,
) -> AppResult<impl IntoResponse> {
    let actor = user.actor();
    let window = ReportWindow::parse(input.date_from.as_deref(), input.date_to.as_deref())?;

    if actor.role == Role::Manager && FormRepo::count(&state.store, actor.form_scope()).await == 0
    {
        return Err(AppError::NotFound("No forms found for this manager".into()));
    }

    if let Some(form_id) = input.form_id {
        let form = FormRepo::find_by_id(&state.store, form_id).await;
        if !actor.can_review_submission(form.map(|f| f.created_by)) {
            return Err(AppError::Core(CoreError::Forbidden(
                "You can only generate reports for your own forms".into(),
            )));
        }
    }

    let filter = SubmissionFilter {
        form_id: input.form_id,
        created_from: window.from,
        created_to: window.to,
        ..Default::default()
    };
    let submissions = SubmissionRepo::list(&state.store, actor.submission_scope(), &filter).await;
    if submissions.is_empty() {
        return Err(AppError::NotFound(
            "No submissions found matching the criteria".into(),
        ));
    }

    let titles: HashMap<DbId, String> = FormRepo::list(&state.store, FormScope::All)
        .await
        .into_iter()
        .map(|f| (f.id, f.title))
        .collect();
    let entries: Vec<ReportEntry> = submissions
        .into_iter()
        .map(|s| ReportEntry {
            form_title: titles
                .get(&s.form_id)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_FORM_TITLE.to_string()),
            status: s.status,
            created_at: s.created_at,
            alerted_fields: s.notifications.into_iter().map(|n| n.field).collect(),
            data: s.data,
        })
        .collect();

    let report = state.generator.generate_report(&entries).await?;

    tracing::info!(
        user_id = %user.user_id,
        submissions = entries.len(),
        form_id = ?input.form_id,
        "Report generated",
    );

    Ok(Json(DataResponse {
        data: ReportResponse {
            report,
            filters: ReportFilters {
                date_from: input.date_from,
                date_to: input.date_to,
                form_id: input.form_id,
                total_submissions: entries.len(),
            },
            ai_generated: state.generator.is_configured(),
        },
    }))
}
