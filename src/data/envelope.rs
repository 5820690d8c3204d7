//! Lenient navigation of the Ergast response envelope
//!
//! Responses are treated as untrusted: every lookup falls back to an empty value
//! instead of failing when a key is absent or has an unexpected type. Numbers are
//! usually sent as strings (`"points": "25"`), so the numeric readers accept both.

use serde_json::Value;

static NULL: Value = Value::Null;

/// Follows `keys` through nested objects, returning `Null` at the first miss
pub fn path<'a>(value: &'a Value, keys: &[&str]) -> &'a Value {
    keys.iter()
        .try_fold(value, |current, key| current.get(*key))
        .unwrap_or(&NULL)
}

/// The array at `keys`, or an empty slice
pub fn list<'a>(value: &'a Value, keys: &[&str]) -> &'a [Value] {
    path(value, keys)
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// The string at `key`, or an empty string
pub fn text(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// A non-negative integer at `key`, given as a number or a numeric string
pub fn uint(value: &Value, key: &str) -> Option<u32> {
    match value.get(key)? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// A number at `key`, given as a number or a numeric string
pub fn number(value: &Value, key: &str) -> Option<f64> {
    match value.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// "Given Family" from a driver object, trimmed when either part is missing
pub fn driver_name(driver: &Value) -> String {
    format!("{} {}", text(driver, "givenName"), text(driver, "familyName"))
        .trim()
        .to_string()
}
