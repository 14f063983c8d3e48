//! Rule table evaluation

use super::{FieldErrors, RawFields, ValidationResult};
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;

/// Coerced values of the fields that passed, in rule order
pub type ValidatedFields = IndexMap<String, Value>;

type Coercion = Arc<dyn Fn(&str, Value) -> Option<Value> + Send + Sync>;
type Check = Arc<dyn Fn(&str, &Value) -> Result<(), String> + Send + Sync>;

/// One row of a schema: field name, presence, coercion and checks
#[derive(Clone)]
pub struct FieldRule {
    name: &'static str,
    required: bool,
    message: &'static str,
    coerce: Coercion,
    checks: Vec<(Check, &'static str)>,
}

impl FieldRule {
    /// A required field whose missing or uncoercible value reports `message`
    pub fn new(name: &'static str, message: &'static str) -> Self {
        Self {
            name,
            required: true,
            message,
            coerce: Arc::new(|_: &str, value: Value| Some(value)),
            checks: Vec::new(),
        }
    }

    /// Allow the field to be absent
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Set the coercion applied before checks
    pub fn coerce(
        mut self,
        coerce: impl Fn(&str, Value) -> Option<Value> + Send + Sync + 'static,
    ) -> Self {
        self.coerce = Arc::new(coerce);
        self
    }

    /// Add a check; `message` is reported when it fails
    pub fn check(
        mut self,
        check: impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + 'static,
        message: &'static str,
    ) -> Self {
        self.checks.push((Arc::new(check), message));
        self
    }

    /// `Ok(None)` for an absent optional field
    fn evaluate(&self, raw: Option<&Value>) -> Result<Option<Value>, Vec<&'static str>> {
        let raw = match raw {
            Some(value) if !value.is_null() => value.clone(),
            _ if self.required => {
                tracing::debug!(field = self.name, "required field missing");
                return Err(vec![self.message]);
            }
            _ => return Ok(None),
        };

        let Some(value) = (self.coerce)(self.name, raw) else {
            tracing::debug!(field = self.name, "value not coercible");
            return Err(vec![self.message]);
        };

        let failures: Vec<&'static str> = self
            .checks
            .iter()
            .filter_map(|(check, message)| match check(self.name, &value) {
                Ok(()) => None,
                Err(diagnostic) => {
                    tracing::debug!(field = self.name, %diagnostic, "check failed");
                    Some(*message)
                }
            })
            .collect();

        if failures.is_empty() {
            Ok(Some(value))
        } else {
            Err(failures)
        }
    }
}

impl std::fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldRule")
            .field("name", &self.name)
            .field("required", &self.required)
            .field("checks", &self.checks.len())
            .finish()
    }
}

/// Ordered set of field rules
#[derive(Debug, Clone, Default)]
pub struct Schema {
    rules: Vec<FieldRule>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, rule: FieldRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Run every rule over `raw`, collecting all failures
    ///
    /// Keys without a rule are ignored.
    pub fn validate(&self, raw: &RawFields) -> ValidationResult {
        let mut validated = ValidatedFields::new();
        let mut errors = FieldErrors::new();

        for rule in &self.rules {
            match rule.evaluate(raw.get(rule.name)) {
                Ok(Some(value)) => {
                    validated.insert(rule.name.to_string(), value);
                }
                Ok(None) => {}
                Err(messages) => {
                    for message in messages {
                        errors.add(rule.name, message);
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(validated)
        } else {
            Err(errors)
        }
    }
}
