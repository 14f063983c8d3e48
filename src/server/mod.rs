//! HTTP server for the invoice dashboard
//!
//! `ServerBuilder` wires a store and a session provider into:
//! - Health check routes
//! - Login/logout routes
//! - Session-gated invoice and customer routes

pub mod auth_handlers;
pub mod builder;
pub mod cache;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use builder::ServerBuilder;
pub use cache::{ListingCache, ListingPage};
pub use state::{AppState, DASHBOARD_HOME, SESSION_COOKIE};
