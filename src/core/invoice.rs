//! Invoice, customer and user records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Invoice lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Pending,
    Paid,
}

impl InvoiceStatus {
    /// Every accepted wire value, in form order
    pub const ALL: [InvoiceStatus; 2] = [InvoiceStatus::Pending, InvoiceStatus::Paid];

    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Paid => "paid",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(InvoiceStatus::Pending),
            "paid" => Ok(InvoiceStatus::Paid),
            other => Err(format!("unknown invoice status '{}'", other)),
        }
    }
}

/// A stored invoice. `amount` is in minor units (cents).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub customer_id: String,
    pub amount: i64,
    pub status: InvoiceStatus,
    pub date: DateTime<Utc>,
}

/// Values bound to the INSERT statement.
///
/// The bindings are nullable: an absent value is sent as NULL and it is up to
/// the storage constraints to reject it.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvoice {
    pub customer_id: Option<String>,
    pub amount: Option<i64>,
    pub status: Option<InvoiceStatus>,
    pub date: DateTime<Utc>,
}

/// Values bound to the UPDATE statement. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoicePatch {
    pub customer_id: Option<String>,
    pub amount: Option<i64>,
    pub status: Option<InvoiceStatus>,
}

impl InvoicePatch {
    /// Merge into a stored invoice, field by field
    pub fn apply_to(&self, invoice: &mut Invoice) {
        if let Some(customer_id) = &self.customer_id {
            invoice.customer_id = customer_id.clone();
        }
        if let Some(amount) = self.amount {
            invoice.amount = amount;
        }
        if let Some(status) = self.status {
            invoice.status = status;
        }
    }
}

/// Customer as shown in the invoice form and listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Invoice row joined with its customer, as listed on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceListing {
    pub id: String,
    pub customer_id: String,
    pub name: String,
    pub email: String,
    pub image_url: Option<String>,
    pub amount: i64,
    pub date: DateTime<Utc>,
    pub status: InvoiceStatus,
}

/// Dashboard user with an Argon2 PHC password hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Decimal currency to minor units, rounded to the nearest cent
///
/// `None` when the result does not fit a BIGINT column.
pub fn to_minor_units(amount: f64) -> Option<i64> {
    let cents = (amount * 100.0).round();
    // i64::MAX as f64 rounds up to 2^63, which is already out of range
    if cents.is_finite() && cents >= i64::MIN as f64 && cents < i64::MAX as f64 {
        Some(cents as i64)
    } else {
        None
    }
}

/// Minor units back to decimal currency
pub fn from_minor_units(cents: i64) -> f64 {
    cents as f64 / 100.0
}
