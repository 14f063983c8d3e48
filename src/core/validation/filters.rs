//! Reusable field coercions
//!
//! These run before the checks and turn a raw form value into the typed value
//! the checks (and the caller) work with. `None` means the raw value cannot be
//! coerced to the field's type.

use serde_json::{Number, Value};

/// Coercion: keep strings, trimmed
pub fn trimmed_string() -> impl Fn(&str, Value) -> Option<Value> + Send + Sync + Clone {
    |_: &str, value: Value| match value {
        Value::String(s) => Some(Value::String(s.trim().to_string())),
        _ => None,
    }
}

/// Coercion: keep strings exactly as submitted
pub fn exact_string() -> impl Fn(&str, Value) -> Option<Value> + Send + Sync + Clone {
    |_: &str, value: Value| match value {
        Value::String(_) => Some(value),
        _ => None,
    }
}

/// Coercion: numbers and numeric strings to a finite number
///
/// An empty string coerces to zero, the way a numeric input left blank does.
pub fn number() -> impl Fn(&str, Value) -> Option<Value> + Send + Sync + Clone {
    |_: &str, value: Value| {
        let parsed = match &value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => {
                let s = s.trim();
                if s.is_empty() {
                    Some(0.0)
                } else {
                    s.parse::<f64>().ok()
                }
            }
            _ => None,
        }?;
        Number::from_f64(parsed).map(Value::Number)
    }
}
