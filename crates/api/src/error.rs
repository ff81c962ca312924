use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fieldform_core::error::CoreError;
use fieldform_db::StoreError;
use serde_json::json;

use crate::ai::GenerationError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `fieldform_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A persistence error from the JSON store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A schema or report could not be produced through the model.
    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// Submitted data failed validation against the form schema.
    #[error("Validation failed")]
    SubmissionRejected { validation_errors: Vec<String> },

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Nothing matched a query that needs at least one record.
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
            },

            // --- Store errors ---
            AppError::Store(err) => {
                tracing::error!(error = %err, "Store error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }

            // --- Upstream model errors ---
            AppError::Generation(err) => {
                tracing::error!(error = %err, "Model generation error");
                (
                    StatusCode::BAD_GATEWAY,
                    "GENERATION_FAILED",
                    format!("AI generation failed: {err}"),
                )
            }

            // --- HTTP-specific errors ---
            AppError::SubmissionRejected { validation_errors } => {
                let body = json!({
                    "error": "Validation failed",
                    "code": "VALIDATION_FAILED",
                    "validation_errors": validation_errors,
                });
                return (StatusCode::BAD_REQUEST, axum::Json(body)).into_response();
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
