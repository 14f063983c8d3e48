//! Axum extractor for raw form input
//!
//! Form actions take untyped input. `RawForm` accepts either a
//! `application/x-www-form-urlencoded` body or a JSON object and hands the
//! handler a [`RawFields`] map without validating anything.

use super::RawFields;
use crate::core::error::{DashboardError, RequestError};
use axum::{
    Form, Json,
    extract::{FromRequest, Request},
    http::header,
};
use serde_json::Value;
use std::collections::HashMap;

/// Raw form fields extracted from the request body
///
/// # Usage
///
/// ```rust,ignore
/// pub async fn create(State(state): State<AppState>, RawForm(raw): RawForm) -> Response {
///     state.actions.create_invoice(ActionState::default(), raw).await.into_response()
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct RawForm(pub RawFields);

fn rejection(message: String) -> DashboardError {
    tracing::debug!(%message, "form body rejected");
    RequestError::InvalidBody { message }.into()
}

impl<S> FromRequest<S> for RawForm
where
    S: Send + Sync,
{
    type Rejection = DashboardError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));

        if is_json {
            let Json(payload): Json<Value> = Json::from_request(req, state)
                .await
                .map_err(|e| rejection(e.to_string()))?;

            return match payload {
                Value::Object(map) => Ok(RawForm(map)),
                _ => Err(rejection("expected a JSON object".to_string())),
            };
        }

        let Form(fields): Form<HashMap<String, String>> = Form::from_request(req, state)
            .await
            .map_err(|e| rejection(e.to_string()))?;

        Ok(RawForm(
            fields
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect(),
        ))
    }
}
