//! Route definitions for forms, mounted at `/forms`.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::forms;
use crate::state::AppState;

/// ```text
/// POST   /generate          -> generate_form
/// GET    /                  -> list_forms
/// POST   /                  -> create_form
/// GET    /{id}              -> get_form
/// PUT    /{id}              -> update_form
/// DELETE /{id}              -> delete_form
/// PUT    /{id}/assign       -> assign_form
/// POST   /{id}/validate     -> validate_form_data
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(forms::generate_form))
        .route("/", get(forms::list_forms).post(forms::create_form))
        .route(
            "/{id}",
            get(forms::get_form)
                .put(forms::update_form)
                .delete(forms::delete_form),
        )
        .route("/{id}/assign", put(forms::assign_form))
        .route("/{id}/validate", post(forms::validate_form_data))
}
