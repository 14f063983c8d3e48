//! Core types and traits: invoice records, validation, form actions, sessions

pub mod action;
pub mod auth;
pub mod error;
pub mod invalidation;
pub mod invoice;
pub mod session;
pub mod store;
pub mod validation;

pub use action::{ActionOutcome, ActionState, FormAction};
pub use auth::{AuthOutcome, Credentials, SessionProvider, authenticate};
pub use error::{AuthError, ConfigError, DashboardError, RequestError, StorageError};
pub use invalidation::{INVOICES_PATH, InvalidationBus, ViewInvalidator};
pub use invoice::{Customer, Invoice, InvoiceListing, InvoicePatch, InvoiceStatus, NewInvoice, User};
pub use session::{GateDecision, Session, SessionGate, SessionUser, SessionVerifier};
pub use store::{InvoiceStore, UserStore};
pub use validation::{FieldErrors, RawFields, Schema};
