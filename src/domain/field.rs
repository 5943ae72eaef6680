//! Helpers to read loosely typed form values.
//!
//! Submissions come from a browser form and are not trusted to carry the types we expect, a
//! phone number can arrive as a JSON number and a checkbox-like honeypot as a boolean. These
//! helpers give every JSON value a well-defined text form instead of rejecting the request.

use serde_json::{Number, Value};

/// Whether a form value counts as "filled in".
///
/// Absent values, `null`, `false`, `0` and the empty string are not filled in. Everything else
/// is, including a string made only of whitespace.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Text representation of a form value. `null` has none.
///
/// Follows what a browser script would produce: whole numbers lose their `.0`, arrays are their
/// elements joined with `,` (with `null` elements left empty) and objects become
/// `[object Object]`.
pub fn coerce_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number_to_string(number)),
        Value::Array(items) => Some(
            items
                .iter()
                .map(|item| coerce_to_string(item).unwrap_or_default())
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => Some("[object Object]".to_string()),
    }
}

fn number_to_string(number: &Number) -> String {
    if let Some(integer) = number.as_i64() {
        return integer.to_string();
    }
    if let Some(integer) = number.as_u64() {
        return integer.to_string();
    }
    match number.as_f64() {
        // `-0` prints as `0`
        Some(float) if float == 0.0 => "0".to_string(),
        // `Display` for floats drops a trailing `.0`, unlike `Number`'s own formatting
        Some(float) => float.to_string(),
        None => number.to_string(),
    }
}

/// Coerce a value to text and trim it, falling back to the empty string.
pub fn trimmed_string_or_default(value: Option<&Value>) -> String {
    value
        .and_then(coerce_to_string)
        .map(|text| text.trim().to_owned())
        .unwrap_or_default()
}
