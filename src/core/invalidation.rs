//! View invalidation signal
//!
//! After a successful mutation the invoice handlers tell the view layer that
//! whatever it derived from the `invoices` table is stale. The signal is
//! fire-and-forget: the handler's result does not depend on it.
//!
//! # Architecture
//!
//! ```text
//! create/update/delete ──▶ InvalidationBus::invalidate("/invoices")
//!                              ├──▶ revision["/invoices"] += 1   (ListingCache reads this)
//!                              └──▶ broadcast channel ──▶ subscribers
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Path whose derived views list invoices
pub const INVOICES_PATH: &str = "/invoices";

/// Receives "this path is stale" notifications
#[async_trait]
pub trait ViewInvalidator: Send + Sync {
    async fn invalidate(&self, path: &str);
}

/// A single invalidation, as seen by subscribers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invalidation {
    /// Unique signal ID
    pub id: Uuid,
    /// Stale path
    pub path: String,
    /// Revision of `path` after this signal
    pub revision: u64,
    pub timestamp: DateTime<Utc>,
}

/// Broadcast-based invalidation bus with a revision counter per path
///
/// Cheap to clone; clones share the channel and the counters.
#[derive(Debug, Clone)]
pub struct InvalidationBus {
    sender: broadcast::Sender<Invalidation>,
    revisions: Arc<RwLock<HashMap<String, u64>>>,
}

impl InvalidationBus {
    /// Create a new bus with the given channel capacity
    ///
    /// The capacity determines how many signals can be buffered before slow
    /// receivers start lagging.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            revisions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Bump the revision of `path` and notify subscribers
    ///
    /// Returns the number of receivers that got the signal.
    pub fn publish(&self, path: &str) -> usize {
        let revision = {
            let mut revisions = self.revisions.write().unwrap_or_else(|e| e.into_inner());
            let revision = revisions.entry(path.to_string()).or_insert(0);
            *revision += 1;
            *revision
        };

        let signal = Invalidation {
            id: Uuid::new_v4(),
            path: path.to_string(),
            revision,
            timestamp: Utc::now(),
        };
        // send() only fails when nobody listens
        self.sender.send(signal).unwrap_or(0)
    }

    /// Current revision of `path`; zero if it was never invalidated
    pub fn revision(&self, path: &str) -> u64 {
        self.revisions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(path)
            .copied()
            .unwrap_or(0)
    }

    /// Subscribe to future signals
    pub fn subscribe(&self) -> broadcast::Receiver<Invalidation> {
        self.sender.subscribe()
    }

    /// Get the current number of active subscribers
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for InvalidationBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl ViewInvalidator for InvalidationBus {
    async fn invalidate(&self, path: &str) {
        let receivers = self.publish(path);
        tracing::debug!(path, receivers, "view invalidated");
    }
}
