use axum::routing::{get, post};
use axum::Router;

use crate::handlers::dashboard;
use crate::state::AppState;

/// Dashboard routes mounted at `/dashboard`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(dashboard::get_stats))
        .route("/report", post(dashboard::generate_report))
}
