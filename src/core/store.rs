//! Persistence traits for invoices and users
//!
//! The invoice handlers only ever talk to these traits. Backends live in
//! [`crate::storage`]; tests substitute their own fakes.

use crate::core::error::StorageError;
use crate::core::invoice::{Customer, Invoice, InvoiceListing, InvoicePatch, NewInvoice, User};
use async_trait::async_trait;

/// Result type for storage calls
pub type StoreResult<T> = Result<T, StorageError>;

/// Storage for the `invoices` table and the customers it references
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Insert a row; storage assigns and returns the id
    async fn insert(&self, invoice: NewInvoice) -> StoreResult<String>;

    /// Coalescing update: fields left `None` keep their stored value
    ///
    /// Returns the number of rows affected.
    async fn update(&self, id: &str, patch: InvoicePatch) -> StoreResult<u64>;

    /// Hard delete; returns the number of rows affected
    async fn delete(&self, id: &str) -> StoreResult<u64>;

    /// Fetch a single invoice
    async fn get(&self, id: &str) -> StoreResult<Option<Invoice>>;

    /// Invoices matching `query`, newest first, `page` counted from 1
    async fn list_invoices(
        &self,
        query: &str,
        page: usize,
        page_size: usize,
    ) -> StoreResult<Vec<InvoiceListing>>;

    /// Number of pages of `page_size` needed for the matches of `query`
    async fn count_pages(&self, query: &str, page_size: usize) -> StoreResult<usize>;

    /// All customers, ordered by name
    async fn customers(&self) -> StoreResult<Vec<Customer>>;
}

/// Lookup of dashboard users for sign-in
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;
}

/// Case-insensitive match of a listing row against a search query
///
/// Mirrors what the SQL backend searches: customer name and email, amount,
/// date and status.
pub fn listing_matches(row: &InvoiceListing, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    [
        row.name.to_lowercase(),
        row.email.to_lowercase(),
        row.amount.to_string(),
        row.date.format("%Y-%m-%d").to_string(),
        row.status.as_str().to_string(),
    ]
    .iter()
    .any(|haystack| haystack.contains(&needle))
}

/// `ceil(total / page_size)`
pub fn total_pages(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::invoice::InvoiceStatus;
    use chrono::{TimeZone, Utc};

    fn row() -> InvoiceListing {
        InvoiceListing {
            id: "inv-1".to_string(),
            customer_id: "cust-1".to_string(),
            name: "Delba de Oliveira".to_string(),
            email: "delba@oliveira.com".to_string(),
            image_url: None,
            amount: 4999,
            date: Utc.with_ymd_and_hms(2024, 3, 14, 0, 0, 0).unwrap(),
            status: InvoiceStatus::Paid,
        }
    }

    #[test]
    fn test_listing_matches_fields() {
        let row = row();
        assert!(listing_matches(&row, ""));
        assert!(listing_matches(&row, "delba"));
        assert!(listing_matches(&row, "OLIVEIRA.COM"));
        assert!(listing_matches(&row, "4999"));
        assert!(listing_matches(&row, "2024-03"));
        assert!(listing_matches(&row, "paid"));
        assert!(!listing_matches(&row, "pending"));
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 6), 0);
        assert_eq!(total_pages(6, 6), 1);
        assert_eq!(total_pages(7, 6), 2);
        assert_eq!(total_pages(7, 0), 0);
    }
}
