//! Loose `deserialize_with` helpers for model-produced JSON.
//!
//! The language model answers with whatever types it likes: numbers as
//! strings, `"null"` / `"None"` for missing values, floats where integers are
//! expected. These helpers coerce into the typed record fields and never fail
//! on a bad value; an unusable value becomes `None` (or is skipped in lists).

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Sentinel strings the model emits in place of JSON `null`.
fn is_null_word(s: &str) -> bool {
    matches!(s, "" | "null" | "None" | "NULL" | "none")
}

/// Convert a scalar JSON value to a trimmed string; null-like values become `None`.
pub fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if is_null_word(trimmed) {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Integer coercion mirroring `int(float(str(x)))`: "90", 90.0 and "90.7" all give 90.
pub fn value_to_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let trimmed = s.trim();
            if is_null_word(trimmed) {
                return None;
            }
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(|f| f.trunc() as i64)
        }
        _ => None,
    }
}

pub fn value_to_float(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim().trim_end_matches('%').trim();
            if is_null_word(trimmed) {
                return None;
            }
            trimmed.parse::<f64>().ok()
        }
        _ => None,
    };
    parsed.filter(|f| f.is_finite())
}

pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(value_to_string))
}

pub fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_string(deserializer)?.unwrap_or_default())
}

pub fn opt_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_int))
}

pub fn opt_float<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_float))
}

/// Parse an array leniently; skip items that fail to deserialize.
/// Anything that is not an array yields an empty list.
pub fn vec_lenient<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect(),
        _ => Vec::new(),
    })
}
