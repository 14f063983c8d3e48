//! Session gate in front of the dashboard
//!
//! Protected views call [`SessionGate::guard`] before rendering. A missing
//! session, or a verifier that fails, means the caller is sent to the login
//! route and nothing else is rendered.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Default login route
pub const LOGIN_PATH: &str = "/login";

/// The signed-in user, as carried by a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// An authenticated session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque token presented by the client
    pub token: String,
    pub user: SessionUser,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Resolves a client token to a session
#[async_trait]
pub trait SessionVerifier: Send + Sync {
    /// `Ok(None)` when there is no valid session for `token`
    async fn verify_session(&self, token: Option<&str>) -> Result<Option<Session>>;
}

/// Outcome of the gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Render the protected view with this session
    Proceed(Session),
    /// Render nothing; send the caller here
    Redirect(String),
}

/// Session gate wrapping a verifier and the login route
#[derive(Clone)]
pub struct SessionGate {
    verifier: Arc<dyn SessionVerifier>,
    login_path: String,
}

impl SessionGate {
    pub fn new(verifier: Arc<dyn SessionVerifier>) -> Self {
        Self {
            verifier,
            login_path: LOGIN_PATH.to_string(),
        }
    }

    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Check the caller's session once; failures count as no session
    pub async fn guard(&self, token: Option<&str>) -> GateDecision {
        match self.verifier.verify_session(token).await {
            Ok(Some(session)) => GateDecision::Proceed(session),
            Ok(None) => GateDecision::Redirect(self.login_path.clone()),
            Err(e) => {
                tracing::warn!(error = %e, "session verification failed");
                GateDecision::Redirect(self.login_path.clone())
            }
        }
    }
}
