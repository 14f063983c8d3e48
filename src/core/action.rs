//! Uniform result and signature of form actions
//!
//! A form action is a function of `(previous state, raw input) -> new state`.
//! The UI re-submits with whatever state the last call returned, so every
//! action accepts and returns the same [`ActionState`].

use crate::core::validation::{FieldErrors, RawFields};
use async_trait::async_trait;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How an action ended; drives the HTTP status, not serialized
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Nothing has been submitted yet
    #[default]
    Idle,
    Succeeded,
    /// Field validation failed
    Invalid,
    /// A precondition (such as the record id) was not met
    Rejected,
    /// The store reported an error
    Failed,
}

/// State returned by every invoice form action
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionState {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub errors: Option<FieldErrors>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(skip)]
    pub outcome: ActionOutcome,
}

impl ActionState {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            errors: None,
            message: Some(message.into()),
            outcome: ActionOutcome::Succeeded,
        }
    }

    pub fn invalid(errors: FieldErrors, message: impl Into<String>) -> Self {
        Self {
            errors: Some(errors),
            message: Some(message.into()),
            outcome: ActionOutcome::Invalid,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            errors: None,
            message: Some(message.into()),
            outcome: ActionOutcome::Rejected,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            errors: None,
            message: Some(message.into()),
            outcome: ActionOutcome::Failed,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == ActionOutcome::Succeeded
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Messages for one field, if it failed validation
    pub fn field_errors(&self, field: &str) -> Option<&[String]> {
        self.errors.as_ref().and_then(|e| e.get(field))
    }

    pub fn status_code(&self) -> StatusCode {
        match self.outcome {
            ActionOutcome::Idle | ActionOutcome::Succeeded => StatusCode::OK,
            ActionOutcome::Invalid => StatusCode::UNPROCESSABLE_ENTITY,
            ActionOutcome::Rejected => StatusCode::BAD_REQUEST,
            ActionOutcome::Failed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ActionState {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}

/// A form action with the uniform `(prev, raw) -> state` signature
///
/// Actions that need a fixed argument (such as the invoice id on update)
/// capture it when they are built and expose this same signature.
#[async_trait]
pub trait FormAction: Send + Sync {
    async fn invoke(&self, prev: ActionState, raw: RawFields) -> ActionState;
}

/// Reduce raw input to primitive strings and numbers
///
/// Blank strings, `null` and any other JSON type are dropped so that the
/// validator sees them as absent instead of failing on a type mismatch.
pub fn normalize(raw: RawFields) -> RawFields {
    raw.into_iter()
        .filter(|(_, value)| match value {
            Value::String(s) => !s.trim().is_empty(),
            Value::Number(_) => true,
            _ => false,
        })
        .collect()
}
