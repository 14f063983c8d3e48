//! Session gate as axum middleware

use super::state::{AppState, SESSION_COOKIE};
use crate::core::session::GateDecision;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

/// Session token from the `session` cookie, or else a Bearer header
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token.to_string());

    from_cookie.filter(|t| !t.is_empty()).or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string())
            .filter(|t| !t.is_empty())
    })
}

/// Let the request through with its [`Session`](crate::core::Session) in the
/// extensions, or answer with a redirect to the login route
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = session_token(request.headers());

    match state.gate.guard(token.as_deref()).await {
        GateDecision::Proceed(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        GateDecision::Redirect(to) => {
            tracing::debug!(path = %request.uri().path(), "no session, redirecting");
            Redirect::temporary(&to).into_response()
        }
    }
}
