//! Boundary coercion for loosely typed profile fields.
//!
//! Goal and day lists come out of JSONB columns and client payloads that are not
//! guaranteed to be arrays of strings. They are normalised here, once, so the
//! scoring code can work with plain `Vec<String>` values.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Coerce an arbitrary JSON value into a list of strings
///
/// Anything that is not an array becomes an empty list. Inside an array, strings are
/// kept as-is, numbers and booleans are stringified, and nested values are dropped.
pub fn string_list_from_value(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Coerce a JSON value into an optional non-blank string
pub fn optional_string_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// `deserialize_with` helper for list fields
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(string_list_from_value(&value))
}

/// `deserialize_with` helper for optional tag fields
pub fn optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(optional_string_from_value(&value))
}
