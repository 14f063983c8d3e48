//! Application state shared across handlers

use super::cache::ListingCache;
use crate::core::auth::SessionProvider;
use crate::core::session::SessionGate;
use crate::core::store::InvoiceStore;
use crate::invoices::InvoiceActions;
use std::sync::Arc;

/// Where a successful sign-in sends the user
pub const DASHBOARD_HOME: &str = "/dashboard/invoices";

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "session";

#[derive(Clone)]
pub struct AppState {
    pub actions: InvoiceActions,
    pub store: Arc<dyn InvoiceStore>,
    pub sessions: Arc<dyn SessionProvider>,
    pub gate: SessionGate,
    pub listings: ListingCache,
    pub page_size: usize,
}
