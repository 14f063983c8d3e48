//! HTTP handlers for the invoice dashboard
//!
//! Every route here sits behind [`require_session`](super::middleware::require_session).
//! Mutations answer with the [`ActionState`] of the form action they run.

use super::cache::ListingPage;
use super::state::AppState;
use crate::core::action::{ActionState, FormAction};
use crate::core::error::{DashboardError, RequestError};
use crate::core::invoice::{Customer, InvoiceStatus, from_minor_units};
use crate::core::session::{Session, SessionUser};
use crate::core::validation::{RawFields, RawForm};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

/// Query string of the listing route
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub page: Option<usize>,
}

/// Listing page plus the signed-in user
#[derive(Debug, Serialize)]
pub struct InvoicesView {
    pub user: SessionUser,
    #[serde(flatten)]
    pub listing: ListingPage,
}

/// Everything the edit form needs, amount in currency units
#[derive(Debug, Serialize)]
pub struct EditInvoiceView {
    pub id: String,
    pub customer_id: String,
    pub amount: f64,
    pub status: InvoiceStatus,
    pub customers: Vec<Customer>,
}

/// GET /dashboard/invoices?query=&page=
pub async fn list_invoices(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(params): Query<ListParams>,
) -> Result<Json<InvoicesView>, DashboardError> {
    let query = params.query.unwrap_or_default().trim().to_string();
    let page = params.page.unwrap_or(1).max(1);

    let listing = match state.listings.get(&query, page) {
        Some(cached) => cached,
        None => {
            let revision = state.listings.revision();
            let invoices = state
                .store
                .list_invoices(&query, page, state.page_size)
                .await?;
            let total_pages = state.store.count_pages(&query, state.page_size).await?;
            let listing = ListingPage {
                query,
                page,
                total_pages,
                invoices,
            };
            state.listings.put(revision, listing.clone());
            listing
        }
    };

    Ok(Json(InvoicesView {
        user: session.user,
        listing,
    }))
}

/// POST /dashboard/invoices
pub async fn create_invoice(State(state): State<AppState>, RawForm(raw): RawForm) -> ActionState {
    state
        .actions
        .create()
        .invoke(ActionState::default(), raw)
        .await
}

/// GET /dashboard/invoices/{id}
pub async fn edit_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EditInvoiceView>, DashboardError> {
    let invoice = state
        .store
        .get(&id)
        .await?
        .ok_or_else(|| RequestError::NotFound {
            resource: "Invoice".to_string(),
            id: id.clone(),
        })?;
    let customers = state.store.customers().await?;

    Ok(Json(EditInvoiceView {
        id: invoice.id,
        customer_id: invoice.customer_id,
        amount: from_minor_units(invoice.amount),
        status: invoice.status,
        customers,
    }))
}

/// POST /dashboard/invoices/{id}
pub async fn update_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
    RawForm(raw): RawForm,
) -> ActionState {
    state
        .actions
        .bind_update(id)
        .invoke(ActionState::default(), raw)
        .await
}

/// POST /dashboard/invoices/{id}/delete
pub async fn delete_invoice(State(state): State<AppState>, Path(id): Path<String>) -> ActionState {
    state
        .actions
        .bind_delete(id)
        .invoke(ActionState::default(), RawFields::new())
        .await
}

/// GET /dashboard/customers
pub async fn list_customers(
    State(state): State<AppState>,
) -> Result<Json<Vec<Customer>>, DashboardError> {
    Ok(Json(state.store.customers().await?))
}
