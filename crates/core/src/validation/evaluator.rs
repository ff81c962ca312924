//! Schema evaluator: pure logic, no I/O.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;

use super::outcome::{FieldViolation, ValidationResult};
use crate::numbers::format_number;
use crate::schema::{FieldDefinition, FieldSchema, FieldType, FieldValue, SubmittedData};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

/// Date-only and local date-time layouts accepted besides RFC 3339 / RFC 2822.
/// Month names match in full or abbreviated form.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
];
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Largest timestamp magnitude (ms since epoch) a calendar date may take.
const MAX_EPOCH_MILLIS: f64 = 8.64e15;

/// Validate `data` against every field of `schema`, in declared order.
pub fn validate_submission(data: &SubmittedData, schema: &FieldSchema) -> ValidationResult {
    let errors = schema
        .fields
        .iter()
        .filter_map(|field| validate_field(field, data.get(&field.name)))
        .collect();
    ValidationResult::from_errors(errors)
}

/// Validate untyped JSON documents.
///
/// A missing schema, or one whose overall shape is wrong (no `fields`
/// list, a field that is not an object or has no `name`), yields the single
/// "Invalid schema" error. Individual attributes decode leniently. A
/// non-object `data` document is treated as an empty submission.
pub fn validate_document(
    data: &serde_json::Value,
    schema: Option<&serde_json::Value>,
) -> ValidationResult {
    let Some(schema) = schema.and_then(|s| serde_json::from_value::<FieldSchema>(s.clone()).ok())
    else {
        return ValidationResult::invalid_schema();
    };
    validate_submission(&SubmittedData::from_json(data.clone()), &schema)
}

/// Produce at most one violation for a single field.
fn validate_field(field: &FieldDefinition, value: Option<&FieldValue>) -> Option<FieldViolation> {
    let label = field.display_label();

    let value = match value {
        Some(v) if !v.is_blank() => v,
        // Absent optional values are never type-checked.
        _ if field.required => return Some(violation(field, format!("{label} is required"))),
        _ => return None,
    };

    let message = match &field.field_type {
        FieldType::Number => check_number(field, label, value),
        FieldType::Email => check_email(label, value),
        FieldType::Select => check_select(field, label, value),
        FieldType::Boolean => check_boolean(label, value),
        FieldType::Date => check_date(label, value),
        FieldType::String | FieldType::Textarea => check_text(field, label, value),
        FieldType::File | FieldType::Unknown(_) => None,
    }?;

    Some(violation(field, message))
}

fn violation(field: &FieldDefinition, message: String) -> FieldViolation {
    FieldViolation {
        field: Some(field.name.clone()),
        message,
    }
}

fn check_number(field: &FieldDefinition, label: &str, value: &FieldValue) -> Option<String> {
    let num = value.to_number();
    if num.is_nan() {
        return Some(format!("{label} must be a valid number"));
    }
    // Only the first violated bound is reported.
    if let Some(min) = field.min.filter(|min| num < *min) {
        Some(format!("{label} must be at least {}", format_number(min)))
    } else {
        field
            .max
            .filter(|max| num > *max)
            .map(|max| format!("{label} must be at most {}", format_number(max)))
    }
}

fn check_email(label: &str, value: &FieldValue) -> Option<String> {
    match value.as_text() {
        Some(text) if EMAIL_RE.is_match(text) => None,
        _ => Some(format!("{label} must be a valid email address")),
    }
}

fn check_select(field: &FieldDefinition, label: &str, value: &FieldValue) -> Option<String> {
    // A select without options accepts anything.
    let options = field.options.as_deref().filter(|o| !o.is_empty())?;
    let is_member = value
        .as_text()
        .is_some_and(|text| options.iter().any(|o| o == text));
    if is_member {
        None
    } else {
        Some(format!("{label} must be one of: {}", options.join(", ")))
    }
}

fn check_boolean(label: &str, value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::Bool(_) => None,
        FieldValue::Text(s) if s == "true" || s == "false" => None,
        _ => Some(format!("{label} must be true or false")),
    }
}

fn check_date(label: &str, value: &FieldValue) -> Option<String> {
    if is_valid_date(value) {
        None
    } else {
        Some(format!("{label} must be a valid date"))
    }
}

fn check_text(field: &FieldDefinition, label: &str, value: &FieldValue) -> Option<String> {
    let Some(text) = value.as_text() else {
        return Some(format!("{label} must be text"));
    };
    let length = text.chars().count() as f64;
    // Zero-valued bounds count as undeclared.
    if let Some(min) = field.min_length.filter(|min| *min > 0.0 && length < *min) {
        Some(format!(
            "{label} must be at least {} characters",
            format_number(min)
        ))
    } else {
        field
            .max_length
            .filter(|max| *max > 0.0 && length > *max)
            .map(|max| format!("{label} must be at most {} characters", format_number(max)))
    }
}

/// Numbers are read as milliseconds since the Unix epoch; text must parse
/// as one of the supported date or date-time layouts.
fn is_valid_date(value: &FieldValue) -> bool {
    match value {
        FieldValue::Number(n) => n
            .as_f64()
            .is_some_and(|ms| ms.is_finite() && ms.abs() <= MAX_EPOCH_MILLIS),
        FieldValue::Text(s) => parse_date(s.trim()),
        _ => false,
    }
}

fn parse_date(s: &str) -> bool {
    DateTime::parse_from_rfc3339(s).is_ok()
        || DateTime::parse_from_rfc2822(s).is_ok()
        || DATE_FORMATS
            .iter()
            .any(|fmt| NaiveDate::parse_from_str(s, fmt).is_ok())
        || DATE_TIME_FORMATS
            .iter()
            .any(|fmt| NaiveDateTime::parse_from_str(s, fmt).is_ok())
}
