//! Helpers over attribute values.
//!
//! Attribute values are plain `serde_json::Value`s: strings, numbers,
//! booleans, null, or nested arrays/objects.

use serde_json::Value;

/// Returns true when a value carries no information: null, a blank string,
/// an empty array or an empty object.
///
/// Empty values mean "absent" throughout the engine: unassigning a region,
/// restoring an attribute and the read-only override rule all rely on it.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Short name of a value's JSON kind, used in validation messages.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
