/// Request field helpers
///
/// The frontend sends loosely typed JSON: ids arrive as numbers or numeric
/// strings, and optional fields may be absent, `null` or empty. These helpers
/// turn that into typed values before anything reaches a store.
use crate::error::{ShelfError, ShelfResult};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Integer view of a JSON value: numbers and numeric strings
pub fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Whether a JSON value counts as supplied (non-null, non-empty, non-zero)
pub fn is_supplied(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64() != Some(0.0),
        Some(Value::Bool(b)) => *b,
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

/// Non-empty string field
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Required integer field: missing is one error, malformed another
pub fn require_i64(value: Option<&Value>, field: &str) -> ShelfResult<i64> {
    if !is_supplied(value) {
        return Err(ShelfError::Validation(format!("{} required", field)));
    }
    value
        .and_then(coerce_i64)
        .ok_or_else(|| ShelfError::Validation(format!("{} must be an integer", field)))
}

/// Optional integer field; `null` and empty strings mean "not given"
pub fn optional_i64(value: Option<&Value>, field: &str) -> ShelfResult<Option<i64>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(v) => coerce_i64(v)
            .map(Some)
            .ok_or_else(|| ShelfError::Validation(format!("{} must be an integer", field))),
    }
}

/// Error listing every missing field, in request order
pub fn missing_fields(missing: &[&str]) -> ShelfResult<()> {
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ShelfError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )))
    }
}

/// Distinguish an absent key (`None`) from an explicit `null` (`Some(None)`).
/// Use with `#[serde(default, deserialize_with = "double_option")]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
