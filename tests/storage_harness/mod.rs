//! Shared test harness for storage backend testing
//!
//! Provides the customer fixture every backend is seeded with, helpers for
//! building invoices, and the `invoice_store_tests!` contract suite.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//! use storage_harness::*;
//! ```

#![allow(dead_code)]

pub mod invoice_store_tests;

use chrono::{DateTime, Duration, Utc};
use dashboard::core::invoice::{Customer, InvoiceStatus, NewInvoice};

pub const AMY: &str = "3958dc9e-712f-4377-85e9-fec4b6a6442a";
pub const EVIL: &str = "cc27c14a-0acf-4f4a-a6c9-d45682c144b9";
pub const BALAZS: &str = "d6e15727-9fe1-4961-8c5b-ea44a9bd81aa";

/// Customers every store under test is seeded with
pub fn customers() -> Vec<Customer> {
    vec![
        Customer {
            id: AMY.to_string(),
            name: "Amy Burns".to_string(),
            email: "amy@burns.com".to_string(),
            image_url: Some("/customers/amy-burns.png".to_string()),
        },
        Customer {
            id: EVIL.to_string(),
            name: "Evil Rabbit".to_string(),
            email: "evil@rabbit.com".to_string(),
            image_url: None,
        },
        Customer {
            id: BALAZS.to_string(),
            name: "Balazs Orban".to_string(),
            email: "balazs@orban.com".to_string(),
            image_url: None,
        },
    ]
}

/// A complete invoice for `customer_id`
pub fn new_invoice(customer_id: &str, amount: i64, status: InvoiceStatus) -> NewInvoice {
    NewInvoice {
        customer_id: Some(customer_id.to_string()),
        amount: Some(amount),
        status: Some(status),
        date: Utc::now(),
    }
}

/// Same as [`new_invoice`], dated `days_ago` days back
pub fn dated_invoice(
    customer_id: &str,
    amount: i64,
    status: InvoiceStatus,
    days_ago: i64,
) -> NewInvoice {
    NewInvoice {
        date: days_before_now(days_ago),
        ..new_invoice(customer_id, amount, status)
    }
}

fn days_before_now(days: i64) -> DateTime<Utc> {
    Utc::now() - Duration::days(days)
}
