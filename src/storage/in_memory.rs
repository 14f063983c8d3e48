//! In-memory stores for testing and development
//!
//! The invoice store enforces the same constraints as the SQL schema
//! (non-null columns, the customer foreign key) so that handlers see the
//! same failures from both backends.

use crate::core::error::StorageError;
use crate::core::invoice::{Customer, Invoice, InvoiceListing, InvoicePatch, NewInvoice, User};
use crate::core::store::{InvoiceStore, StoreResult, UserStore, listing_matches, total_pages};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

const BACKEND: &str = "in-memory";

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::unavailable(BACKEND, format!("lock poisoned: {}", e))
}

fn not_null(column: &str) -> StorageError {
    StorageError::integrity(format!(
        "null value in column \"{}\" of relation \"invoices\" violates not-null constraint",
        column
    ))
}

fn check_amount(amount: i64) -> StoreResult<()> {
    if amount > 0 {
        Ok(())
    } else {
        Err(StorageError::integrity(format!(
            "new row for relation \"invoices\" violates check constraint \"invoices_amount_check\": amount {}",
            amount
        )))
    }
}

/// In-memory invoice store
///
/// Uses RwLock for thread-safe access. Customers are fixed at construction.
#[derive(Clone, Default)]
pub struct InMemoryInvoiceStore {
    invoices: Arc<RwLock<HashMap<String, Invoice>>>,
    customers: Arc<RwLock<HashMap<String, Customer>>>,
}

impl InMemoryInvoiceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with the customers invoices may reference
    pub fn with_customers(customers: impl IntoIterator<Item = Customer>) -> Self {
        let customers = customers.into_iter().map(|c| (c.id.clone(), c)).collect();
        Self {
            invoices: Arc::new(RwLock::new(HashMap::new())),
            customers: Arc::new(RwLock::new(customers)),
        }
    }

    fn check_customer(&self, customer_id: &str) -> StoreResult<()> {
        let customers = self.customers.read().map_err(poisoned)?;
        if customers.contains_key(customer_id) {
            Ok(())
        } else {
            Err(StorageError::integrity(format!(
                "insert or update on table \"invoices\" violates foreign key constraint \"invoices_customer_id_fkey\": customer '{}' does not exist",
                customer_id
            )))
        }
    }

    fn matching(&self, query: &str) -> StoreResult<Vec<InvoiceListing>> {
        let invoices = self.invoices.read().map_err(poisoned)?;
        let customers = self.customers.read().map_err(poisoned)?;

        let mut rows: Vec<InvoiceListing> = invoices
            .values()
            .filter_map(|invoice| {
                customers.get(&invoice.customer_id).map(|c| InvoiceListing {
                    id: invoice.id.clone(),
                    customer_id: c.id.clone(),
                    name: c.name.clone(),
                    email: c.email.clone(),
                    image_url: c.image_url.clone(),
                    amount: invoice.amount,
                    date: invoice.date,
                    status: invoice.status,
                })
            })
            .filter(|row| listing_matches(row, query))
            .collect();

        rows.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
        Ok(rows)
    }
}

#[async_trait]
impl InvoiceStore for InMemoryInvoiceStore {
    async fn insert(&self, invoice: NewInvoice) -> StoreResult<String> {
        let customer_id = invoice.customer_id.ok_or_else(|| not_null("customer_id"))?;
        let amount = invoice.amount.ok_or_else(|| not_null("amount"))?;
        let status = invoice.status.ok_or_else(|| not_null("status"))?;
        check_amount(amount)?;
        self.check_customer(&customer_id)?;

        let id = Uuid::new_v4().to_string();
        let mut invoices = self.invoices.write().map_err(poisoned)?;
        invoices.insert(
            id.clone(),
            Invoice {
                id: id.clone(),
                customer_id,
                amount,
                status,
                date: invoice.date,
            },
        );

        Ok(id)
    }

    async fn update(&self, id: &str, patch: InvoicePatch) -> StoreResult<u64> {
        if let Some(amount) = patch.amount {
            check_amount(amount)?;
        }
        if let Some(customer_id) = &patch.customer_id {
            self.check_customer(customer_id)?;
        }

        let mut invoices = self.invoices.write().map_err(poisoned)?;
        match invoices.get_mut(id) {
            Some(invoice) => {
                patch.apply_to(invoice);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, id: &str) -> StoreResult<u64> {
        let mut invoices = self.invoices.write().map_err(poisoned)?;
        Ok(invoices.remove(id).map_or(0, |_| 1))
    }

    async fn get(&self, id: &str) -> StoreResult<Option<Invoice>> {
        let invoices = self.invoices.read().map_err(poisoned)?;
        Ok(invoices.get(id).cloned())
    }

    async fn list_invoices(
        &self,
        query: &str,
        page: usize,
        page_size: usize,
    ) -> StoreResult<Vec<InvoiceListing>> {
        let offset = page.saturating_sub(1).saturating_mul(page_size);
        Ok(self
            .matching(query)?
            .into_iter()
            .skip(offset)
            .take(page_size)
            .collect())
    }

    async fn count_pages(&self, query: &str, page_size: usize) -> StoreResult<usize> {
        Ok(total_pages(self.matching(query)?.len(), page_size))
    }

    async fn customers(&self) -> StoreResult<Vec<Customer>> {
        let customers = self.customers.read().map_err(poisoned)?;
        let mut list: Vec<Customer> = customers.values().cloned().collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(list)
    }
}

/// In-memory user directory, keyed by email
#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserStore {
    pub fn new(users: impl IntoIterator<Item = User>) -> Self {
        let users = users.into_iter().map(|u| (u.email.clone(), u)).collect();
        Self {
            users: Arc::new(RwLock::new(users)),
        }
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().map_err(poisoned)?;
        Ok(users.get(email).cloned())
    }
}
