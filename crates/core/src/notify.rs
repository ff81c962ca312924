//! Threshold notifications.
//!
//! A field may declare `notifyIf` as `<operator><threshold>` (`">400"`,
//! `"<=70"`). After a submission passes validation, every field whose
//! condition holds for its submitted value produces a [`NotificationEvent`].
//! Conditions outside that grammar are ignored, never reported.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::numbers::{deserialize_f64, format_number, serialize_f64};
use crate::schema::{FieldDefinition, FieldSchema, SubmittedData};

static CONDITION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([><=]+)([0-9]+\.?[0-9]*)$").expect("valid regex"));

/// Comparison operator of a `notifyIf` condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdOperator {
    Above,
    AtOrAbove,
    Below,
    AtOrBelow,
}

impl ThresholdOperator {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            ">" => Some(Self::Above),
            ">=" => Some(Self::AtOrAbove),
            "<" => Some(Self::Below),
            "<=" => Some(Self::AtOrBelow),
            _ => None,
        }
    }

    /// Comparisons involving NaN are always false.
    pub fn holds(self, value: f64, threshold: f64) -> bool {
        match self {
            Self::Above => value > threshold,
            Self::AtOrAbove => value >= threshold,
            Self::Below => value < threshold,
            Self::AtOrBelow => value <= threshold,
        }
    }

    fn phrase(self) -> &'static str {
        match self {
            Self::Above => "exceeds threshold of",
            Self::AtOrAbove => "is at or above threshold of",
            Self::Below => "is below threshold of",
            Self::AtOrBelow => "is at or below threshold of",
        }
    }
}

/// A parsed `notifyIf` condition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NotifyCondition {
    pub operator: ThresholdOperator,
    pub threshold: f64,
}

impl NotifyCondition {
    /// Parse an already-trimmed condition. Returns `None` for anything
    /// outside the `<operator><decimal>` grammar, including operator runs
    /// like `"=="` or `"=>"` that the pattern admits but no rule handles.
    pub fn parse(condition: &str) -> Option<Self> {
        let caps = CONDITION_RE.captures(condition)?;
        let operator = ThresholdOperator::from_symbol(&caps[1])?;
        let threshold = caps[2].parse::<f64>().ok()?;
        Some(Self {
            operator,
            threshold,
        })
    }

    pub fn is_met_by(&self, value: f64) -> bool {
        self.operator.holds(value, self.threshold)
    }

    fn message(&self, label: &str, value: f64) -> String {
        format!(
            "{label} ({}) {} {}",
            format_number(value),
            self.operator.phrase(),
            format_number(self.threshold)
        )
    }
}

/// A triggered threshold notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// Name of the field whose value crossed the threshold.
    pub field: String,
    pub message: String,
    #[serde(serialize_with = "serialize_f64", deserialize_with = "deserialize_f64")]
    pub value: f64,
    #[serde(serialize_with = "serialize_f64", deserialize_with = "deserialize_f64")]
    pub threshold: f64,
    /// The trimmed `notifyIf` text that fired.
    pub condition: String,
}

/// Evaluate every field's `notifyIf` against `data`, in field order.
///
/// Expects data that already passed validation; values are coerced to
/// numbers without further checks.
pub fn check_notifications(schema: &FieldSchema, data: &SubmittedData) -> Vec<NotificationEvent> {
    schema
        .fields
        .iter()
        .filter_map(|field| evaluate_field(field, data))
        .collect()
}

fn evaluate_field(field: &FieldDefinition, data: &SubmittedData) -> Option<NotificationEvent> {
    let raw = field.notify_if.as_deref().filter(|c| !c.is_empty())?;
    // A present `null` still counts as present; it coerces to NaN.
    let value = data.get(&field.name)?.to_number();

    let condition = raw.trim();
    let parsed = NotifyCondition::parse(condition)?;
    if !parsed.is_met_by(value) {
        return None;
    }

    Some(NotificationEvent {
        field: field.name.clone(),
        message: parsed.message(field.display_label(), value),
        value,
        threshold: parsed.threshold,
        condition: condition.to_string(),
    })
}
