//! # Field Whitelist Projection
//!
//! Every operation accepts an arbitrary key-value mapping (query string or
//! request body) and narrows it down to the fields that operation recognizes.
//! A field counts only when its value is present: null, `false`, `0`, and the
//! empty string are all treated as absent. Unknown keys are dropped silently.

use serde_json::{Map, Value};

/// Fields a list query may filter on. The project is not listed here: it is
/// always forced from the URL path, overriding anything the client sends.
pub const LIST_FIELDS: &[&str] = &[
    "issue_title",
    "issue_text",
    "created_by",
    "assigned_to",
    "status_text",
    "created_on",
    "updated_on",
    "open",
];

/// Fields a client may supply when creating an issue.
pub const CREATE_FIELDS: &[&str] = &[
    "issue_title",
    "issue_text",
    "created_by",
    "assigned_to",
    "status_text",
];

/// Fields a client may change on an existing issue.
pub const UPDATE_FIELDS: &[&str] = &[
    "issue_title",
    "issue_text",
    "created_by",
    "assigned_to",
    "status_text",
    "open",
];

/// Whether a value counts as supplied.
///
/// A JSON `false` for `open` is indistinguishable from the field being
/// absent; the string `"false"` is present and coerced later.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Projects `source` down to the recognized, present fields.
///
/// Idempotent: projecting an already-projected map is a no-op.
pub fn project_present(source: &Map<String, Value>, fields: &[&str]) -> Map<String, Value> {
    fields
        .iter()
        .filter_map(|&field| {
            source
                .get(field)
                .filter(|value| is_present(value))
                .map(|value| (field.to_string(), value.clone()))
        })
        .collect()
}

/// Reads a projected field as a string, if it is one.
pub fn string_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Reads the `open` flag from a projected map.
///
/// Only `true` can survive projection as a boolean. Strings are coerced the
/// way the wire format demands: `"true"` and `"false"` parse, anything else
/// is dropped rather than guessed at.
pub fn open_field(fields: &Map<String, Value>) -> Option<bool> {
    match fields.get("open")? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
