//! ServerBuilder for fluent API to build the dashboard server

use super::cache::ListingCache;
use super::router::{build_auth_routes, build_dashboard_routes, health_routes};
use super::state::AppState;
use crate::core::auth::SessionProvider;
use crate::core::invalidation::InvalidationBus;
use crate::core::session::{LOGIN_PATH, SessionGate, SessionVerifier};
use crate::core::store::InvoiceStore;
use crate::invoices::InvoiceActions;
use anyhow::{Result, anyhow};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Default number of invoices per listing page
pub const DEFAULT_PAGE_SIZE: usize = 6;

/// Builder for the dashboard HTTP server
///
/// # Example
///
/// ```ignore
/// let users = Arc::new(InMemoryUserStore::new(users));
/// let app = ServerBuilder::new()
///     .with_invoice_store(InMemoryInvoiceStore::with_customers(customers))
///     .with_session_provider(CredentialsProvider::new(users, Duration::hours(24)))
///     .build()?;
/// ```
pub struct ServerBuilder {
    invoice_store: Option<Arc<dyn InvoiceStore>>,
    session_provider: Option<Arc<dyn SessionProvider>>,
    session_verifier: Option<Arc<dyn SessionVerifier>>,
    event_bus: Option<InvalidationBus>,
    login_path: String,
    page_size: usize,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self {
            invoice_store: None,
            session_provider: None,
            session_verifier: None,
            event_bus: None,
            login_path: LOGIN_PATH.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            custom_routes: Vec::new(),
        }
    }

    /// Set the invoice store (required)
    pub fn with_invoice_store(self, store: impl InvoiceStore + 'static) -> Self {
        self.with_shared_invoice_store(Arc::new(store))
    }

    /// Set an invoice store that is already shared
    pub fn with_shared_invoice_store(mut self, store: Arc<dyn InvoiceStore>) -> Self {
        self.invoice_store = Some(store);
        self
    }

    /// Set the session provider (required)
    pub fn with_session_provider(self, provider: impl SessionProvider + 'static) -> Self {
        self.with_shared_session_provider(Arc::new(provider))
    }

    /// Set a session provider that is already shared
    ///
    /// The same provider verifies sessions for the gate.
    pub fn with_shared_session_provider<P>(mut self, provider: Arc<P>) -> Self
    where
        P: SessionProvider + 'static,
    {
        self.session_verifier = Some(provider.clone());
        self.session_provider = Some(provider);
        self
    }

    /// Use this bus for invalidation signals
    ///
    /// Pass a clone of the bus to observe signals from outside the server.
    /// Without it the builder creates a private one.
    pub fn with_event_bus(mut self, bus: InvalidationBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Route unauthenticated requests are redirected to
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Add custom routes to the server
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Assemble the shared handler state
    pub fn build_state(&mut self) -> Result<AppState> {
        let store = self
            .invoice_store
            .clone()
            .ok_or_else(|| anyhow!("InvoiceStore is required. Call .with_invoice_store()"))?;
        let (sessions, verifier) = self
            .session_provider
            .clone()
            .zip(self.session_verifier.clone())
            .ok_or_else(|| anyhow!("SessionProvider is required. Call .with_session_provider()"))?;
        if self.page_size == 0 {
            return Err(anyhow!("page size must be at least 1"));
        }

        let bus = self.event_bus.get_or_insert_with(InvalidationBus::default).clone();
        let gate = SessionGate::new(verifier).with_login_path(self.login_path.clone());

        Ok(AppState {
            actions: InvoiceActions::new(store.clone(), Arc::new(bus.clone())),
            store,
            sessions,
            gate,
            listings: ListingCache::new(bus),
            page_size: self.page_size,
        })
    }

    /// Build the final router
    ///
    /// This generates:
    /// - Health check routes
    /// - Login/logout routes
    /// - Session-gated dashboard routes
    /// - Custom routes
    pub fn build(mut self) -> Result<Router> {
        let state = self.build_state()?;

        let mut app = health_routes()
            .merge(build_auth_routes(state.clone()))
            .merge(build_dashboard_routes(state));

        for custom_router in std::mem::take(&mut self.custom_routes) {
            app = app.merge(custom_router);
        }

        Ok(app)
    }

    /// Serve the application with request tracing and graceful shutdown
    ///
    /// This will:
    /// - Bind to the provided address
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?.layer(TraceLayer::new_for_http());
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::CredentialsProvider;
    use crate::storage::{InMemoryInvoiceStore, InMemoryUserStore};
    use chrono::Duration;

    fn provider() -> CredentialsProvider {
        CredentialsProvider::new(Arc::new(InMemoryUserStore::default()), Duration::hours(1))
    }

    #[test]
    fn test_new_creates_empty_builder() {
        let builder = ServerBuilder::new();
        assert!(builder.invoice_store.is_none());
        assert!(builder.session_provider.is_none());
        assert!(builder.event_bus.is_none());
        assert_eq!(builder.login_path, "/login");
        assert_eq!(builder.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_build_without_store_fails() {
        let result = ServerBuilder::new().with_session_provider(provider()).build();
        let err = result.err().expect("build should fail");
        assert!(err.to_string().contains("InvoiceStore is required"));
    }

    #[test]
    fn test_build_without_session_provider_fails() {
        let result = ServerBuilder::new()
            .with_invoice_store(InMemoryInvoiceStore::new())
            .build();
        let err = result.err().expect("build should fail");
        assert!(err.to_string().contains("SessionProvider is required"));
    }

    #[test]
    fn test_zero_page_size_fails() {
        let mut builder = ServerBuilder::new()
            .with_invoice_store(InMemoryInvoiceStore::new())
            .with_session_provider(provider())
            .with_page_size(0);
        assert!(builder.build_state().is_err());
    }

    #[test]
    fn test_state_shares_event_bus() {
        let bus = InvalidationBus::new(16);
        let mut builder = ServerBuilder::new()
            .with_invoice_store(InMemoryInvoiceStore::new())
            .with_session_provider(provider())
            .with_event_bus(bus.clone())
            .with_login_path("/signin");

        let state = builder.build_state().unwrap();
        bus.publish(crate::core::INVOICES_PATH);

        assert_eq!(state.listings.revision(), 1);
        assert_eq!(state.gate.login_path(), "/signin");
    }

    #[test]
    fn test_build_succeeds() {
        let app = ServerBuilder::new()
            .with_invoice_store(InMemoryInvoiceStore::new())
            .with_session_provider(provider())
            .with_custom_routes(Router::new())
            .build();
        assert!(app.is_ok());
    }
}
