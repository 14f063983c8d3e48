//! Revision-checked cache of invoice listing pages
//!
//! Each entry remembers the revision of [`INVOICES_PATH`] it was filled at.
//! Once an invoice mutation invalidates that path the revision moves on and
//! every older entry reads as a miss. The number of entries is capped; past
//! the cap the oldest entry is evicted first.

use crate::core::invalidation::{INVOICES_PATH, InvalidationBus};
use crate::core::invoice::InvoiceListing;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

/// Default cap on cached pages
pub const MAX_ENTRIES: usize = 256;

/// One page of the invoice listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingPage {
    pub query: String,
    pub page: usize,
    pub total_pages: usize,
    pub invoices: Vec<InvoiceListing>,
}

#[derive(Debug, Clone)]
struct CachedPage {
    revision: u64,
    page: ListingPage,
}

/// Listing pages keyed by `(query, page)`
#[derive(Debug, Clone)]
pub struct ListingCache {
    bus: InvalidationBus,
    max_entries: usize,
    entries: Arc<RwLock<IndexMap<(String, usize), CachedPage>>>,
}

impl ListingCache {
    pub fn new(bus: InvalidationBus) -> Self {
        Self::with_max_entries(bus, MAX_ENTRIES)
    }

    /// Cache holding at most `max_entries` pages (at least one)
    pub fn with_max_entries(bus: InvalidationBus, max_entries: usize) -> Self {
        Self {
            bus,
            max_entries: max_entries.max(1),
            entries: Arc::new(RwLock::new(IndexMap::new())),
        }
    }

    /// Revision to pass to [`put`](Self::put); read it before querying storage
    pub fn revision(&self) -> u64 {
        self.bus.revision(INVOICES_PATH)
    }

    /// Cached page, if it is still current
    pub fn get(&self, query: &str, page: usize) -> Option<ListingPage> {
        let current = self.revision();
        let entries = self.entries.read().ok()?;
        entries
            .get(&(query.to_string(), page))
            .filter(|cached| cached.revision == current)
            .map(|cached| cached.page.clone())
    }

    /// Store a page read at `revision`
    pub fn put(&self, revision: u64, page: ListingPage) {
        let Ok(mut entries) = self.entries.write() else {
            return;
        };
        entries.retain(|_, cached| cached.revision >= revision);

        let key = (page.query.clone(), page.page);
        // re-inserting moves the key to the back of the eviction order
        entries.shift_remove(&key);
        while entries.len() >= self.max_entries {
            entries.shift_remove_index(0);
        }
        entries.insert(key, CachedPage { revision, page });
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
