//! Reusable field checks
//!
//! Checks run on the coerced value. The `Err` string is a diagnostic for logs;
//! the message shown to the user comes from the rule that owns the check.

use crate::core::invoice::to_minor_units;
use serde_json::Value;

/// Check: string must not be empty
pub fn non_empty() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| match value.as_str() {
        Some("") => Err(format!("'{}' is empty", field)),
        _ => Ok(()),
    }
}

/// Check: currency amount must be at least `min` cents once rounded
///
/// Amounts too large for a BIGINT column fail as well.
pub fn min_minor_units(
    min: i64,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| {
        let Some(num) = value.as_f64() else {
            return Err(format!("'{}' is not a number", field));
        };
        match to_minor_units(num) {
            Some(cents) if cents >= min => Ok(()),
            Some(cents) => Err(format!(
                "'{}' must be at least {} minor units (value: {})",
                field, min, cents
            )),
            None => Err(format!("'{}' is out of range (value: {})", field, num)),
        }
    }
}

/// Check: value must be one of the allowed strings, compared exactly
pub fn one_of(
    allowed: &'static [&'static str],
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| match value.as_str() {
        Some(s) if allowed.contains(&s) => Ok(()),
        Some(s) => Err(format!(
            "'{}' must be one of {:?} (value: {})",
            field, allowed, s
        )),
        None => Err(format!("'{}' is not a string", field)),
    }
}
