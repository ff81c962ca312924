use axum::routing::post;
use axum::Router;

use crate::handlers::schemas;
use crate::state::AppState;

/// Stateless schema routes mounted at `/schemas`.
pub fn router() -> Router<AppState> {
    Router::new().route("/validate", post(schemas::validate_schema))
}
