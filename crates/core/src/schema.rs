//! Declarative form schema and the submitted-data model it is checked against.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::numbers::{parse_float_prefix, serialize_opt_f64};

/// A form definition: a title and an ordered list of fields.
///
/// Field order is significant: it drives display order and the order of
/// validation errors and notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    #[serde(default, deserialize_with = "lenient::title")]
    pub title: String,
    pub fields: Vec<FieldDefinition>,
}

impl FieldSchema {
    pub fn new(title: impl Into<String>, fields: Vec<FieldDefinition>) -> Self {
        Self {
            title: title.into(),
            fields,
        }
    }

    /// Look up a field by its `name`.
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Names declared more than once, in first-duplicate order.
    pub fn duplicate_names(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        let mut duplicates = Vec::new();
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) && !duplicates.contains(&field.name.as_str()) {
                duplicates.push(field.name.as_str());
            }
        }
        duplicates
    }
}

/// One field of a [`FieldSchema`].
///
/// Only `name` is strict. Every other attribute decodes leniently so one
/// oddly shaped attribute degrades that check instead of the whole schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    /// Stable identifier, used as the key into submitted data.
    pub name: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::text"
    )]
    pub label: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient::field_type")]
    pub field_type: FieldType,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub required: bool,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_opt_f64",
        deserialize_with = "lenient::bound"
    )]
    pub min: Option<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_opt_f64",
        deserialize_with = "lenient::bound"
    )]
    pub max: Option<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_opt_f64",
        deserialize_with = "lenient::bound"
    )]
    pub min_length: Option<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_opt_f64",
        deserialize_with = "lenient::bound"
    )]
    pub max_length: Option<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::options"
    )]
    pub options: Option<Vec<String>>,
    /// Threshold condition such as `">400"` or `"<=70"`.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::text"
    )]
    pub notify_if: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::text"
    )]
    pub placeholder: Option<String>,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            label: Some(label.into()),
            field_type,
            required: false,
            min: None,
            max: None,
            min_length: None,
            max_length: None,
            options: None,
            notify_if: None,
            placeholder: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn length(mut self, min_length: Option<f64>, max_length: Option<f64>) -> Self {
        self.min_length = min_length;
        self.max_length = max_length;
        self
    }

    pub fn options(mut self, options: &[&str]) -> Self {
        self.options = Some(options.iter().map(|o| o.to_string()).collect());
        self
    }

    pub fn notify_if(mut self, condition: impl Into<String>) -> Self {
        self.notify_if = Some(condition.into());
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// The human-readable name used in messages: `label`, or `name` when
    /// the label is absent or empty.
    pub fn display_label(&self) -> &str {
        self.label
            .as_deref()
            .filter(|l| !l.is_empty())
            .unwrap_or(&self.name)
    }
}

/// Attribute decoders for loosely authored schemas.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::FieldType;
    use crate::numbers::{coerce_number, format_number};

    pub fn title<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(text(deserializer)?.unwrap_or_default())
    }

    /// Strings as-is, numbers in their shortest form; anything else is absent.
    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(number_text(&n)),
            _ => None,
        })
    }

    /// A non-string type (`null` included) is kept as an unknown type.
    pub fn field_type<'de, D: Deserializer<'de>>(deserializer: D) -> Result<FieldType, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(raw) => FieldType::from(raw),
            _ => FieldType::default(),
        })
    }

    /// JSON truthiness.
    pub fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Null => false,
            Value::Bool(b) => b,
            Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        })
    }

    /// Numeric bounds. Numeric strings are coerced; an unreadable bound is
    /// kept as NaN, which no comparison ever violates.
    pub fn bound<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Null => None,
            Value::Number(n) => n.as_f64(),
            Value::String(s) => Some(coerce_number(&s)),
            Value::Bool(b) => Some(if b { 1.0 } else { 0.0 }),
            Value::Array(_) | Value::Object(_) => Some(f64::NAN),
        })
    }

    /// Option lists; non-string entries are read as their text form.
    pub fn options<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<String>>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => Some(items.into_iter().map(option_text).collect()),
            _ => None,
        })
    }

    fn option_text(item: Value) -> String {
        match item {
            Value::String(s) => s,
            Value::Number(n) => number_text(&n),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    fn number_text(n: &serde_json::Number) -> String {
        n.as_f64().map(format_number).unwrap_or_else(|| n.to_string())
    }
}

/// The kind of input a field collects.
///
/// Unrecognised type strings are kept verbatim in [`FieldType::Unknown`] so a
/// stored schema round-trips unchanged; they are never validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    String,
    Number,
    Email,
    File,
    Boolean,
    Select,
    Textarea,
    Date,
    Unknown(String),
}

impl FieldType {
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Email => "email",
            FieldType::File => "file",
            FieldType::Boolean => "boolean",
            FieldType::Select => "select",
            FieldType::Textarea => "textarea",
            FieldType::Date => "date",
            FieldType::Unknown(raw) => raw,
        }
    }
}

impl Default for FieldType {
    fn default() -> Self {
        FieldType::Unknown(String::new())
    }
}

impl From<String> for FieldType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "string" => FieldType::String,
            "number" => FieldType::Number,
            "email" => FieldType::Email,
            "file" => FieldType::File,
            "boolean" => FieldType::Boolean,
            "select" => FieldType::Select,
            "textarea" => FieldType::Textarea,
            "date" => FieldType::Date,
            _ => FieldType::Unknown(raw),
        }
    }
}

impl From<FieldType> for String {
    fn from(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to an uploaded file. Only the name is retained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub filename: String,
}

/// A single submitted value.
///
/// Coercion to the type a field expects happens in the validator and the
/// notifier, not at deserialization time, so `"42"` and `42` both arrive
/// intact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
    File(FileRef),
    /// Arrays and other objects; carried through untouched.
    Other(serde_json::Value),
}

impl FieldValue {
    /// `null` and the empty string count as "no value".
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Coerce to a float. Text is read by its leading numeric prefix;
    /// anything that is neither a number nor text yields NaN.
    pub fn to_number(&self) -> f64 {
        match self {
            FieldValue::Number(n) => n.as_f64().unwrap_or(f64::NAN),
            FieldValue::Text(s) => parse_float_prefix(s),
            _ => f64::NAN,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or(FieldValue::Other(value))
    }
}

/// The key/value payload of one submission attempt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmittedData(BTreeMap<String, FieldValue>);

impl SubmittedData {
    /// Build from an arbitrary JSON document. Anything but an object is
    /// treated as an empty submission.
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(map) => map
                .into_iter()
                .map(|(key, value)| (key, FieldValue::from(value)))
                .collect(),
            _ => Self::default(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }
}

impl FromIterator<(String, FieldValue)> for SubmittedData {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
