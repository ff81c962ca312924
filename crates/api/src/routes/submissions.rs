//! Route definitions for submissions, mounted at `/submissions`.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::submissions;
use crate::state::AppState;

/// ```text
/// GET    /                  -> list_submissions
/// POST   /                  -> create_submission
/// GET    /{id}              -> get_submission
/// DELETE /{id}              -> delete_submission (admin only)
/// PUT    /{id}/status       -> update_submission_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(submissions::list_submissions).post(submissions::create_submission),
        )
        .route(
            "/{id}",
            get(submissions::get_submission).delete(submissions::delete_submission),
        )
        .route("/{id}/status", put(submissions::update_submission_status))
}
