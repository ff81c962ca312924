//! Submission validation engine.
//!
//! Checks a [`SubmittedData`](crate::schema::SubmittedData) record against a
//! [`FieldSchema`](crate::schema::FieldSchema) and reports every problem as
//! a human-readable message, one per field at most, in field order.

pub mod evaluator;
pub mod outcome;

pub use evaluator::{validate_document, validate_submission};
pub use outcome::{FieldViolation, ValidationResult, INVALID_SCHEMA};
