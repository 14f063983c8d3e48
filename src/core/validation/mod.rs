//! Validation and coercion of raw form input
//!
//! A [`Schema`] is a declarative table of [`FieldRule`]s. Each rule names a
//! field, says whether it is required, how to coerce the raw value and which
//! checks the coerced value must pass. Every rule is evaluated; failures are
//! collected into [`FieldErrors`] instead of stopping at the first one.

pub mod extractor;
pub mod filters;
pub mod schema;
pub mod validators;

pub use extractor::RawForm;
pub use schema::{FieldRule, Schema, ValidatedFields};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Untyped form input, keyed by field name
pub type RawFields = serde_json::Map<String, serde_json::Value>;

/// Result of running a schema over raw input
pub type ValidationResult = Result<ValidatedFields, FieldErrors>;

/// Per-field violation messages, in rule order
///
/// A field with no violations has no entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(IndexMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to a field's list
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Messages for one field, if it failed
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Failing field names, in rule order
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}
