//! PostgreSQL storage backend using sqlx.
//!
//! Provides `PostgresInvoiceStore` and `PostgresUserStore` backed by a
//! `sqlx::PgPool`.
//!
//! # Feature flag
//!
//! This module is gated behind the `postgres` feature flag:
//! ```toml
//! [dependencies]
//! invoice-dashboard = { version = "0.1", features = ["postgres"] }
//! ```
//!
//! # Schema
//!
//! Tables come from `migrations/`: `customers`, `invoices` (UUID id,
//! amount in cents, `customer_id` foreign key) and `users`. Invoice ids
//! travel as text and are cast with `::uuid`, so a malformed id is reported
//! by the database like any other query failure.

use crate::core::error::StorageError;
use crate::core::invoice::{
    Customer, Invoice, InvoiceListing, InvoicePatch, InvoiceStatus, NewInvoice, User,
};
use crate::core::store::{InvoiceStore, StoreResult, UserStore, total_pages};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

const BACKEND: &str = "PostgreSQL";

/// Map a sqlx error onto [`StorageError`], keeping the driver message
fn storage_error(e: sqlx::Error) -> StorageError {
    match e {
        sqlx::Error::Database(db) => {
            let message = db.message().to_string();
            // class 23: integrity constraint violation
            if db.code().is_some_and(|code| code.starts_with("23")) {
                StorageError::integrity(message)
            } else {
                StorageError::query(BACKEND, message)
            }
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            StorageError::unavailable(BACKEND, e.to_string())
        }
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) => StorageError::Connection {
            backend: BACKEND.to_string(),
            message: e.to_string(),
        },
        other => StorageError::query(BACKEND, other.to_string()),
    }
}

fn parse_status(raw: &str) -> StoreResult<InvoiceStatus> {
    raw.parse()
        .map_err(|e: String| StorageError::query(BACKEND, e))
}

/// Connect a pool to `url`
pub async fn connect(url: &str, max_connections: u32) -> StoreResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await
        .map_err(|e| StorageError::Connection {
            backend: BACKEND.to_string(),
            message: e.to_string(),
        })
}

/// Apply the bundled migrations (idempotent)
///
/// Safe to call on every startup.
pub async fn ensure_schema(pool: &PgPool) -> StoreResult<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| StorageError::query(BACKEND, format!("migration failed: {}", e)))
}

type ListingRow = (
    String,
    String,
    String,
    String,
    Option<String>,
    i64,
    DateTime<Utc>,
    String,
);

const LISTING_FILTER: &str = "customers.name ILIKE $1 OR \
     customers.email ILIKE $1 OR \
     invoices.amount::text ILIKE $1 OR \
     invoices.date::text ILIKE $1 OR \
     invoices.status ILIKE $1";

/// Invoice storage backed by PostgreSQL.
///
/// # Example
///
/// ```rust,ignore
/// use dashboard::storage::{PostgresInvoiceStore, postgres};
///
/// let pool = postgres::connect("postgres://localhost/dashboard", 5).await?;
/// postgres::ensure_schema(&pool).await?;
/// let store = PostgresInvoiceStore::new(pool);
/// ```
#[derive(Clone, Debug)]
pub struct PostgresInvoiceStore {
    pool: PgPool,
}

impl PostgresInvoiceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl InvoiceStore for PostgresInvoiceStore {
    async fn insert(&self, invoice: NewInvoice) -> StoreResult<String> {
        let (id,): (String,) = sqlx::query_as(
            "INSERT INTO invoices (customer_id, amount, status, date) \
             VALUES ($1, $2, $3, $4) RETURNING id::text",
        )
        .bind(invoice.customer_id)
        .bind(invoice.amount)
        .bind(invoice.status.map(|s| s.as_str()))
        .bind(invoice.date)
        .fetch_one(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(id)
    }

    async fn update(&self, id: &str, patch: InvoicePatch) -> StoreResult<u64> {
        let result = sqlx::query(
            "UPDATE invoices SET \
                 customer_id = COALESCE($1, customer_id), \
                 amount = COALESCE($2, amount), \
                 status = COALESCE($3, status) \
             WHERE id = $4::uuid",
        )
        .bind(patch.customer_id)
        .bind(patch.amount)
        .bind(patch.status.map(|s| s.as_str()))
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, id: &str) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = $1::uuid")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(result.rows_affected())
    }

    async fn get(&self, id: &str) -> StoreResult<Option<Invoice>> {
        let row = sqlx::query_as::<_, (String, String, i64, String, DateTime<Utc>)>(
            "SELECT id::text, customer_id, amount, status, date \
             FROM invoices WHERE id = $1::uuid",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        match row {
            Some((id, customer_id, amount, status, date)) => Ok(Some(Invoice {
                id,
                customer_id,
                amount,
                status: parse_status(&status)?,
                date,
            })),
            None => Ok(None),
        }
    }

    async fn list_invoices(
        &self,
        query: &str,
        page: usize,
        page_size: usize,
    ) -> StoreResult<Vec<InvoiceListing>> {
        let offset = page.saturating_sub(1).saturating_mul(page_size);
        let sql = format!(
            "SELECT invoices.id::text, customers.id, customers.name, customers.email, \
                    customers.image_url, invoices.amount, invoices.date, invoices.status \
             FROM invoices JOIN customers ON invoices.customer_id = customers.id \
             WHERE {} \
             ORDER BY invoices.date DESC \
             LIMIT $2 OFFSET $3",
            LISTING_FILTER
        );

        let rows = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(format!("%{}%", query))
            .bind(page_size as i64)
            .bind(offset as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;

        rows.into_iter()
            .map(
                |(id, customer_id, name, email, image_url, amount, date, status)| {
                    Ok(InvoiceListing {
                        id,
                        customer_id,
                        name,
                        email,
                        image_url,
                        amount,
                        date,
                        status: parse_status(&status)?,
                    })
                },
            )
            .collect()
    }

    async fn count_pages(&self, query: &str, page_size: usize) -> StoreResult<usize> {
        let sql = format!(
            "SELECT COUNT(*) FROM invoices \
             JOIN customers ON invoices.customer_id = customers.id \
             WHERE {}",
            LISTING_FILTER
        );

        let (count,): (i64,) = sqlx::query_as(&sql)
            .bind(format!("%{}%", query))
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(total_pages(count.max(0) as usize, page_size))
    }

    async fn customers(&self) -> StoreResult<Vec<Customer>> {
        let rows = sqlx::query_as::<_, (String, String, String, Option<String>)>(
            "SELECT id, name, email, image_url FROM customers ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(rows
            .into_iter()
            .map(|(id, name, email, image_url)| Customer {
                id,
                name,
                email,
                image_url,
            })
            .collect())
    }
}

/// User lookup backed by the `users` table
#[derive(Clone, Debug)]
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, (String, String, String, String)>(
            "SELECT id::text, name, email, password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(row.map(|(id, name, email, password_hash)| User {
            id,
            name,
            email,
            password_hash,
        }))
    }
}
