//! Numeric coercion and formatting shared by the validator and the notifier.
//!
//! Submitted values arrive as loosely typed JSON. Numbers are coerced with
//! leading-prefix semantics (`"12.5 V"` reads as `12.5`, `"abc"` as NaN) and
//! rendered back in their shortest form so messages read `450`, never `450.0`.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serializer};

/// Longest numeric prefix accepted by [`parse_float_prefix`].
static FLOAT_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:Infinity|(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?)")
        .expect("valid regex")
});

/// Largest integer magnitude an `f64` represents exactly (2^53).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Parse the longest leading decimal number in `input`, ignoring leading
/// whitespace and any trailing garbage. Returns NaN when no number leads.
pub fn parse_float_prefix(input: &str) -> f64 {
    FLOAT_PREFIX_RE
        .find(input.trim_start())
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

/// Whole-string conversion, used for schema attributes. Surrounding
/// whitespace is ignored and an empty string reads as `0`; text that is not
/// a number in its entirety is NaN.
pub fn coerce_number(input: &str) -> f64 {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match FLOAT_PREFIX_RE.find(trimmed) {
        Some(m) if m.end() == trimmed.len() => parse_float_prefix(trimmed),
        _ => f64::NAN,
    }
}

/// Render a number in its shortest form. Magnitudes from `1e-6` up to
/// `1e21` print as plain decimals, everything else in exponent form
/// (`1e+21`, `1.5e-7`).
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        let sign = if value > 0.0 { "" } else { "-" };
        format!("{sign}Infinity")
    } else if value == 0.0 {
        // Collapses -0 as well.
        "0".to_string()
    } else if (1e-6..1e21).contains(&value.abs()) {
        value.to_string()
    } else {
        let formatted = format!("{value:e}");
        match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{mantissa}e+{exponent}")
            }
            _ => formatted,
        }
    }
}

/// Serialize an `f64` as an integer JSON number when it has no fractional
/// part. Non-finite values become `null`.
pub fn serialize_f64<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if !value.is_finite() {
        serializer.serialize_none()
    } else if value.fract() == 0.0 && value.abs() < MAX_SAFE_INTEGER {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// [`serialize_f64`] for optional values.
pub fn serialize_opt_f64<S: Serializer>(
    value: &Option<f64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => serialize_f64(v, serializer),
        None => serializer.serialize_none(),
    }
}

/// Counterpart of [`serialize_f64`]: a stored `null` reads back as NaN.
pub fn deserialize_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}
