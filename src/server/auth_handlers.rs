//! Login and logout routes

use super::middleware::session_token;
use super::state::{AppState, DASHBOARD_HOME, SESSION_COOKIE};
use crate::core::auth::{AuthOutcome, Credentials, authenticate};
use crate::core::error::DashboardError;
use crate::core::validation::{RawFields, RawForm};
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde_json::{Value, json};

fn field(raw: &RawFields, name: &str) -> String {
    raw.get(name)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// GET /login
pub async fn login_page(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "action": state.gate.login_path(),
        "fields": ["email", "password"],
        "message": null
    }))
}

/// POST /login
///
/// On success the session token is set as an HttpOnly cookie.
pub async fn login(State(state): State<AppState>, RawForm(raw): RawForm) -> Response {
    let credentials = Credentials {
        email: field(&raw, "email"),
        password: field(&raw, "password"),
    };

    match authenticate(state.sessions.as_ref(), None, credentials).await {
        Ok(AuthOutcome::SignedIn(session)) => {
            let max_age = (session.expires_at - Utc::now()).num_seconds().max(0);
            let cookie = format!(
                "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
                SESSION_COOKIE, session.token, max_age
            );
            (
                [(header::SET_COOKIE, cookie)],
                Json(json!({ "message": null, "redirect": DASHBOARD_HOME })),
            )
                .into_response()
        }
        Ok(AuthOutcome::Failed(message)) => {
            (StatusCode::UNAUTHORIZED, Json(json!({ "message": message }))).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "sign-in raised an unexpected error");
            DashboardError::from(e).into_response()
        }
    }
}

/// POST /logout
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers) {
        if let Err(e) = state.sessions.sign_out(&token).await {
            tracing::warn!(error = %e, "sign-out failed");
        }
    }

    let cookie = format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE);
    (
        [(header::SET_COOKIE, cookie)],
        Redirect::to(state.gate.login_path()),
    )
        .into_response()
}
