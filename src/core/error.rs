//! Typed error handling for the dashboard
//!
//! Handlers in this crate never let storage or validation failures escape
//! as faults: they are folded into an [`ActionState`](crate::core::action::ActionState).
//! The types here cover what is left:
//!
//! - [`StorageError`]: failures reported by a persistence backend
//! - [`AuthError`]: recognized authentication failures
//! - [`ConfigError`]: startup configuration problems
//! - [`RequestError`]: malformed HTTP requests
//!
//! [`DashboardError`] wraps the ones that reach an HTTP response.
//! `ConfigError` only occurs at startup and stays separate.
//!
//! # Example
//!
//! ```rust,ignore
//! match store.delete(id).await {
//!     Ok(_) => ActionState::success("Invoice deleted successfully"),
//!     Err(e) => ActionState::failed(format!("Error deleting invoice: {}", e.message())),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// The main error type for the dashboard
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Storage backend errors
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Authentication errors
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// HTTP/Request errors
    #[error(transparent)]
    Request(#[from] RequestError),

    /// Anything that should not happen in normal operation
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl DashboardError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            DashboardError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            DashboardError::Auth(e) => e.status_code(),
            DashboardError::Request(e) => e.status_code(),
            DashboardError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            DashboardError::Storage(_) => "STORAGE_ERROR",
            DashboardError::Auth(e) => e.error_code(),
            DashboardError::Request(e) => e.error_code(),
            DashboardError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
        }
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

/// Convert from anyhow::Error, keeping typed errors when they are inside
impl From<anyhow::Error> for DashboardError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<AuthError>() {
            Ok(auth) => DashboardError::Auth(auth),
            Err(err) => match err.downcast::<StorageError>() {
                Ok(storage) => DashboardError::Storage(storage),
                Err(err) => DashboardError::Internal(err.to_string()),
            },
        }
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors reported by a persistence backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The backend could not be reached
    #[error("Failed to connect to {backend}: {message}")]
    Connection { backend: String, message: String },

    /// A statement failed to execute
    #[error("{backend} query error: {message}")]
    Query { backend: String, message: String },

    /// A constraint (NOT NULL, foreign key, check) rejected the write
    #[error("Data integrity error: {message}")]
    Integrity { message: String },

    /// The backend is not usable (poisoned lock, closed pool)
    #[error("Storage backend '{backend}' is unavailable: {message}")]
    Unavailable { backend: String, message: String },
}

impl StorageError {
    /// The driver's own message, without the category prefix
    pub fn message(&self) -> &str {
        match self {
            StorageError::Connection { message, .. }
            | StorageError::Query { message, .. }
            | StorageError::Integrity { message }
            | StorageError::Unavailable { message, .. } => message,
        }
    }

    pub fn query(backend: &str, message: impl Into<String>) -> Self {
        StorageError::Query {
            backend: backend.to_string(),
            message: message.into(),
        }
    }

    pub fn integrity(message: impl Into<String>) -> Self {
        StorageError::Integrity {
            message: message.into(),
        }
    }

    pub fn unavailable(backend: &str, message: impl Into<String>) -> Self {
        StorageError::Unavailable {
            backend: backend.to_string(),
            message: message.into(),
        }
    }
}

// =============================================================================
// Auth Errors
// =============================================================================

/// Authentication failures the sign-in flow knows how to present
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Email/password did not match a user
    #[error("credentials sign-in failed")]
    CredentialsSignin,

    /// The provider refused the sign-in for policy reasons
    #[error("access denied")]
    AccessDenied,

    /// The provider itself failed while checking credentials
    #[error("sign-in callback failed: {0}")]
    Callback(String),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::CredentialsSignin => StatusCode::UNAUTHORIZED,
            AuthError::AccessDenied => StatusCode::FORBIDDEN,
            AuthError::Callback(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::CredentialsSignin => "CREDENTIALS_SIGNIN",
            AuthError::AccessDenied => "ACCESS_DENIED",
            AuthError::Callback(_) => "AUTH_CALLBACK_ERROR",
        }
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse configuration file
    #[error("Failed to parse config '{}': {}", .file.as_deref().unwrap_or("<inline>"), .message)]
    Parse {
        file: Option<String>,
        message: String,
    },

    /// Missing required field in configuration
    #[error("Missing required field '{field}' in {context}")]
    MissingField { field: String, context: String },

    /// Invalid value in configuration
    #[error("Invalid value '{value}' for field '{field}': {message}")]
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// IO error while reading configuration
    #[error("IO error reading '{path}': {message}")]
    Io { path: String, message: String },
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors related to HTTP requests
#[derive(Debug, Error)]
pub enum RequestError {
    /// Requested resource does not exist
    #[error("{resource} '{id}' not found")]
    NotFound { resource: String, id: String },

    /// Invalid request body
    #[error("Invalid request body: {message}")]
    InvalidBody { message: String },
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::NotFound { .. } => StatusCode::NOT_FOUND,
            RequestError::InvalidBody { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::NotFound { .. } => "NOT_FOUND",
            RequestError::InvalidBody { .. } => "INVALID_BODY",
        }
    }
}
