pub mod dashboard;
pub mod forms;
pub mod health;
pub mod schemas;
pub mod submissions;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /forms/generate                  generate schema from prompt (manager, admin)
/// /forms                           list, create
/// /forms/{id}                      get, update, delete
/// /forms/{id}/assign               replace assigned agents (PUT)
/// /forms/{id}/validate             dry-run validation (POST)
///
/// /submissions                     list, submit
/// /submissions/{id}                get, delete (admin)
/// /submissions/{id}/status         approve / reject (PUT)
///
/// /schemas/validate                validate data against an inline schema (POST)
///
/// /dashboard/stats                 role-scoped counters
/// /dashboard/report                submission report (manager, admin; POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/forms", forms::router())
        .nest("/submissions", submissions::router())
        .nest("/schemas", schemas::router())
        .nest("/dashboard", dashboard::router())
}
