//! Prompt-to-schema helpers for form generation.
//!
//! The HTTP layer owns the model call; this module holds the instruction
//! text, the parsing of the model's reply and the offline fallback used
//! when no model is configured.

use serde_json::Value;

use crate::schema::FieldSchema;
use crate::templates;

/// System instruction sent with every generation request.
pub const SYSTEM_PROMPT: &str = r#"You are an assistant that converts natural language descriptions of field forms into structured JSON schemas.

Return ONLY valid JSON (no markdown, no explanation) with this exact structure:
{
  "title": "string - form title",
  "fields": [
    {
      "name": "string - field identifier (lowercase, underscore separated)",
      "label": "string - human readable label",
      "type": "string - one of: string, number, email, file, boolean, select, textarea, date",
      "required": boolean,
      "placeholder": "string - optional placeholder text",
      "min": number - optional, for number type,
      "max": number - optional, for number type,
      "options": ["array of strings"] - only for select type,
      "notifyIf": "string - optional condition like '>400' or '<0'"
    }
  ]
}

Rules:
- Extract all mentioned fields from the description
- Infer appropriate field types
- Set required based on context (default true for important fields)
- Extract validation rules (min/max for numbers)
- Extract notification/workflow rules into notifyIf
- Use clear, professional labels"#;

/// The user turn for a generation request.
pub fn user_prompt(prompt: &str) -> String {
    format!("Create a form schema for: {prompt}")
}

#[derive(Debug, thiserror::Error)]
pub enum GeneratedSchemaError {
    #[error("Model reply is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid schema structure returned by AI")]
    Structure,
}

/// Parse a model reply into a schema.
///
/// Markdown code fences around the JSON are tolerated. The reply must carry
/// a non-empty `title` and a `fields` array whose entries decode as field
/// definitions.
pub fn parse_generated_schema(content: &str) -> Result<FieldSchema, GeneratedSchemaError> {
    let stripped = strip_code_fences(content.trim());
    let value: Value = serde_json::from_str(stripped.trim())?;

    let has_title = value
        .get("title")
        .and_then(Value::as_str)
        .is_some_and(|t| !t.is_empty());
    let has_fields = value.get("fields").is_some_and(Value::is_array);
    if !has_title || !has_fields {
        return Err(GeneratedSchemaError::Structure);
    }

    Ok(serde_json::from_value(value)?)
}

pub(crate) fn strip_code_fences(content: &str) -> String {
    content.replace("```json", "").replace("```", "")
}

/// Offline stand-in for the model: a keyword match over the prompt picks a
/// built-in template. A non-empty `title` replaces the template's own.
pub fn mock_schema(prompt: &str, title: Option<&str>) -> FieldSchema {
    let lower = prompt.to_lowercase();
    let mut schema = if lower.contains("pole") || lower.contains("electrical") {
        templates::pole_inspection()
    } else {
        templates::field_inspection()
    };
    if let Some(title) = title.map(str::trim).filter(|t| !t.is_empty()) {
        schema.title = title.to_string();
    }
    schema
}
