//! Sign-in action
//!
//! [`authenticate`] delegates to a [`SessionProvider`] and turns the failures
//! it recognizes into a message for the login form. Anything that is not an
//! [`AuthError`] is returned as an error so the caller's own error boundary
//! sees it.

use crate::core::error::AuthError;
use crate::core::session::{Session, SessionVerifier};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Email/password pair submitted by the login form
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Credentials {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
}

/// Issues and revokes sessions
///
/// `sign_in` reports expected failures as an [`AuthError`] inside the
/// `anyhow::Error`; any other error type is treated as unexpected.
#[async_trait]
pub trait SessionProvider: SessionVerifier {
    async fn sign_in(&self, credentials: &Credentials) -> Result<Session>;

    /// Revoke a session; unknown tokens are ignored
    async fn sign_out(&self, token: &str) -> Result<()>;
}

/// What the login form shows after a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    SignedIn(Session),
    Failed(String),
}

/// Sign in with `credentials`
///
/// `prev` is the message from the previous submission; it is not used but
/// keeps the signature uniform with the other form actions.
pub async fn authenticate(
    provider: &dyn SessionProvider,
    _prev: Option<String>,
    credentials: Credentials,
) -> Result<AuthOutcome> {
    match provider.sign_in(&credentials).await {
        Ok(session) => {
            tracing::info!(user = %session.user.email, "signed in");
            Ok(AuthOutcome::SignedIn(session))
        }
        Err(err) => match err.downcast_ref::<AuthError>() {
            Some(AuthError::CredentialsSignin) => {
                Ok(AuthOutcome::Failed("Invalid credentials.".to_string()))
            }
            Some(other) => {
                tracing::warn!(error = %other, "sign-in failed");
                Ok(AuthOutcome::Failed("Something went wrong.".to_string()))
            }
            None => Err(err),
        },
    }
}
