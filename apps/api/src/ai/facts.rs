//! Lenient readers over free-form deal payloads sent by the dashboard.
//!
//! Callers post whatever JSON they have, so every accessor tolerates missing
//! keys and loosely typed values rather than failing deserialization.

use serde_json::Value;

/// Truthiness of `value[key]`: missing, null, false, 0 and "" are false.
pub fn flag(value: &Value, key: &str) -> bool {
    match value.get(key) {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// `value[key]` as a number; numeric strings are accepted.
pub fn number(value: &Value, key: &str) -> Option<f64> {
    match value.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn text<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

/// `value[key]` compared to a literal string.
pub fn is(value: &Value, key: &str, expected: &str) -> bool {
    text(value, key) == Some(expected)
}

/// A count given either as an array (its length) or as a number.
pub fn count(value: &Value, key: &str) -> usize {
    match value.get(key) {
        Some(Value::Array(items)) => items.len(),
        Some(_) => number(value, key).map_or(0, |n| n.max(0.0) as usize),
        None => 0,
    }
}

/// `value[key]` rendered for metadata, `"unknown"` when absent.
pub fn display_or_unknown(value: &Value, key: &str) -> Value {
    match value.get(key) {
        None | Some(Value::Null) => Value::String("unknown".to_string()),
        Some(v) => v.clone(),
    }
}
