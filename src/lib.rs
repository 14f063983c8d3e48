//! # Invoice Dashboard
//!
//! An authenticated invoice-management service: validated create, update and
//! delete of invoices behind a session gate, served over HTTP.
//!
//! ## Features
//!
//! - **Declarative validation**: every field rule is checked and all failures
//!   are reported at once, keyed by field
//! - **Uniform form actions**: handlers never fail; they return an
//!   `ActionState` with a message and optional field errors
//! - **View invalidation**: successful mutations signal `"/invoices"` on a
//!   broadcast bus; cached listing pages go stale with it
//! - **Session gate**: dashboard routes redirect to the login page when no
//!   valid session is presented
//! - **Pluggable storage**: in-memory by default, PostgreSQL behind the
//!   `postgres` feature
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dashboard::prelude::*;
//!
//! let users = Arc::new(InMemoryUserStore::new(users));
//! ServerBuilder::new()
//!     .with_invoice_store(InMemoryInvoiceStore::with_customers(customers))
//!     .with_session_provider(CredentialsProvider::new(users, chrono::Duration::hours(24)))
//!     .serve("127.0.0.1:3000")
//!     .await?;
//! ```

pub mod auth;
pub mod config;
pub mod core;
pub mod invoices;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        action::{ActionOutcome, ActionState, FormAction},
        auth::{AuthOutcome, Credentials, SessionProvider, authenticate},
        error::{AuthError, ConfigError, DashboardError, StorageError},
        invalidation::{INVOICES_PATH, InvalidationBus, ViewInvalidator},
        invoice::{Customer, Invoice, InvoiceListing, InvoicePatch, InvoiceStatus, NewInvoice, User},
        session::{GateDecision, Session, SessionGate, SessionUser, SessionVerifier},
        store::{InvoiceStore, UserStore},
        validation::{FieldErrors, RawFields, RawForm, Schema},
    };

    // === Invoices ===
    pub use crate::invoices::{InvoiceActions, UpdateInvoice, invoice_schema};

    // === Auth ===
    pub use crate::auth::CredentialsProvider;

    // === Storage ===
    pub use crate::storage::{InMemoryInvoiceStore, InMemoryUserStore};
    #[cfg(feature = "postgres")]
    pub use crate::storage::{PostgresInvoiceStore, PostgresUserStore};

    // === Config ===
    pub use crate::config::{AppConfig, StorageBackend};

    // === Server ===
    pub use crate::server::{AppState, ServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use std::sync::Arc;
}
