//! Router builder utilities

use super::auth_handlers::{login, login_page, logout};
use super::handlers::{
    create_invoice, delete_invoice, edit_invoice, list_customers, list_invoices, update_invoice,
};
use super::middleware::require_session;
use super::state::AppState;
use axum::{
    Json, Router, middleware,
    routing::{get, post},
};
use serde_json::{Value, json};

/// Build the session-gated dashboard routes
///
/// - GET/POST /dashboard/invoices - List (query, page) / create
/// - GET/POST /dashboard/invoices/{id} - Edit form data / update
/// - POST /dashboard/invoices/{id}/delete - Delete
/// - GET /dashboard/customers - Customers for the invoice form
pub fn build_dashboard_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/dashboard/invoices",
            get(list_invoices).post(create_invoice),
        )
        .route(
            "/dashboard/invoices/{id}",
            get(edit_invoice).post(update_invoice),
        )
        .route("/dashboard/invoices/{id}/delete", post(delete_invoice))
        .route("/dashboard/customers", get(list_customers))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ))
        .with_state(state)
}

/// Build the login/logout routes; the login path comes from the gate
pub fn build_auth_routes(state: AppState) -> Router {
    let login_path = state.gate.login_path().to_string();
    Router::new()
        .route(&login_path, get(login_page).post(login))
        .route("/logout", post(logout))
        .with_state(state)
}

/// Build health check routes
pub fn health_routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
}

/// Health check endpoint handler
async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME")
    }))
}
