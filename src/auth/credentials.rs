//! Email/password session provider

use super::password::verify_password;
use crate::core::auth::{Credentials, SessionProvider};
use crate::core::error::AuthError;
use crate::core::session::{Session, SessionUser, SessionVerifier};
use crate::core::store::UserStore;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;
use validator::Validate;

/// Signs users in against a [`UserStore`] and keeps sessions in memory
///
/// Tokens are random UUIDs. A session lives for `ttl` after sign-in;
/// expired sessions are dropped the next time they are presented, and on
/// every sign-in.
#[derive(Clone)]
pub struct CredentialsProvider {
    users: Arc<dyn UserStore>,
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    ttl: Duration,
}

impl CredentialsProvider {
    pub fn new(users: Arc<dyn UserStore>, ttl: Duration) -> Self {
        Self {
            users,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Number of sessions currently held, expired ones included
    pub fn session_count(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }
}

#[async_trait]
impl SessionVerifier for CredentialsProvider {
    async fn verify_session(&self, token: Option<&str>) -> Result<Option<Session>> {
        let Some(token) = token else {
            return Ok(None);
        };

        let session = {
            let sessions = self
                .sessions
                .read()
                .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;
            sessions.get(token).cloned()
        };

        match session {
            Some(session) if session.is_expired(Utc::now()) => {
                self.sessions
                    .write()
                    .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?
                    .remove(token);
                tracing::debug!(user = %session.user.email, "session expired");
                Ok(None)
            }
            other => Ok(other),
        }
    }
}

#[async_trait]
impl SessionProvider for CredentialsProvider {
    async fn sign_in(&self, credentials: &Credentials) -> Result<Session> {
        if credentials.validate().is_err() {
            return Err(AuthError::CredentialsSignin.into());
        }

        let user = self
            .users
            .find_by_email(&credentials.email)
            .await
            .map_err(|e| AuthError::Callback(format!("user lookup failed: {}", e)))?
            .ok_or(AuthError::CredentialsSignin)?;

        if !verify_password(&credentials.password, &user.password_hash)? {
            return Err(AuthError::CredentialsSignin.into());
        }

        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let session = Session {
            token: Uuid::new_v4().to_string(),
            user: SessionUser {
                id: user.id,
                name: user.name,
                email: user.email,
            },
            expires_at,
        };

        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| AuthError::Callback(format!("session store unavailable: {}", e)))?;
        // abandoned sessions are never presented again
        sessions.retain(|_, s| !s.is_expired(now));
        sessions.insert(session.token.clone(), session.clone());

        Ok(session)
    }

    async fn sign_out(&self, token: &str) -> Result<()> {
        let removed = self
            .sessions
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?
            .remove(token);
        if let Some(session) = removed {
            tracing::info!(user = %session.user.email, "signed out");
        }
        Ok(())
    }
}
