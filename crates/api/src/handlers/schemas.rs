//! Handlers for stateless schema checks.
//!
//! Lets clients check a payload against a schema without storing anything,
//! either an ad-hoc schema or a stored form's.

use axum::Json;
use fieldform_core::notify::{check_notifications, NotificationEvent};
use fieldform_core::schema::{FieldSchema, SubmittedData};
use fieldform_core::validation::{validate_document, validate_submission, ValidationResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;

/// Outcome of a dry-run validation.
#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub validation_errors: Vec<String>,
    /// Only evaluated when the data is valid.
    pub notifications: Vec<NotificationEvent>,
}

impl ValidationReport {
    /// Validate `data` against `schema` and, if it passes, evaluate
    /// notifications.
    pub fn evaluate(schema: &FieldSchema, data: &SubmittedData) -> Self {
        let result = validate_submission(data, schema);
        let notifications = if result.is_valid {
            check_notifications(schema, data)
        } else {
            Vec::new()
        };
        Self::from_parts(&result, notifications)
    }

    fn from_parts(result: &ValidationResult, notifications: Vec<NotificationEvent>) -> Self {
        Self {
            valid: result.is_valid,
            validation_errors: result.messages(),
            notifications,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ValidateSchemaRequest {
    pub schema: Option<Value>,
    #[serde(default)]
    pub data: Value,
}

/// POST /api/v1/schemas/validate
///
/// Validate `data` against an inline `schema`. A missing or malformed
/// schema reports the single `Invalid schema` error.
pub async fn validate_schema(
    RequireAuth(_user): RequireAuth,
    Json(input): Json<ValidateSchemaRequest>,
) -> AppResult<Json<DataResponse<ValidationReport>>> {
    let result = validate_document(&input.data, input.schema.as_ref());

    let notifications = match input.schema {
        Some(schema) if result.is_valid => serde_json::from_value::<FieldSchema>(schema)
            .map(|schema| check_notifications(&schema, &SubmittedData::from_json(input.data)))
            .unwrap_or_default(),
        _ => Vec::new(),
    };

    Ok(Json(DataResponse {
        data: ValidationReport::from_parts(&result, notifications),
    }))
}
