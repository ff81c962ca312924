//! Validation result types.

use serde::{Deserialize, Serialize};

/// Message reported when the schema itself is absent or malformed.
pub const INVALID_SCHEMA: &str = "Invalid schema";

/// Aggregated outcome of validating one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<FieldViolation>,
}

impl ValidationResult {
    pub fn from_errors(errors: Vec<FieldViolation>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    /// The single-error result for an unusable schema.
    pub fn invalid_schema() -> Self {
        Self::from_errors(vec![FieldViolation {
            field: None,
            message: INVALID_SCHEMA.to_string(),
        }])
    }

    /// The error messages in reporting order.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.message.clone()).collect()
    }
}

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Name of the offending field; `None` for schema-level failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}
