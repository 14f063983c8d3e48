//! Invoice form schema

use crate::core::invoice::{InvoicePatch, InvoiceStatus, NewInvoice, to_minor_units};
use crate::core::validation::{FieldRule, Schema, ValidatedFields, filters, validators};
use chrono::{DateTime, Utc};

pub const CUSTOMER_ID: &str = "customerId";
pub const AMOUNT: &str = "amount";
pub const STATUS: &str = "status";

pub const CUSTOMER_MESSAGE: &str = "Please select a customer.";
pub const AMOUNT_MESSAGE: &str = "Please enter an amount greater than $0.";
pub const STATUS_MESSAGE: &str = "Please select an invoice status.";

const STATUSES: &[&str] = &["pending", "paid"];

/// Which form the schema validates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
}

/// Rules for the invoice form
///
/// `id` and `date` never come from the form: storage assigns them on create
/// and they are immutable afterwards. Create and update currently require the
/// same three fields.
pub fn invoice_schema(operation: Operation) -> Schema {
    match operation {
        Operation::Create | Operation::Update => Schema::new()
            .rule(
                FieldRule::new(CUSTOMER_ID, CUSTOMER_MESSAGE)
                    .coerce(filters::trimmed_string())
                    .check(validators::non_empty(), CUSTOMER_MESSAGE),
            )
            .rule(
                FieldRule::new(AMOUNT, AMOUNT_MESSAGE)
                    .coerce(filters::number())
                    .check(validators::min_minor_units(1), AMOUNT_MESSAGE),
            )
            .rule(
                FieldRule::new(STATUS, STATUS_MESSAGE)
                    .coerce(filters::exact_string())
                    .check(validators::one_of(STATUSES), STATUS_MESSAGE),
            ),
    }
}

/// Typed view of the validated invoice fields
///
/// Fields are optional because a rule may be optional; an absent value is
/// bound as NULL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoiceFields {
    pub customer_id: Option<String>,
    pub amount: Option<f64>,
    pub status: Option<InvoiceStatus>,
}

impl InvoiceFields {
    pub fn from_validated(fields: &ValidatedFields) -> Self {
        Self {
            customer_id: fields
                .get(CUSTOMER_ID)
                .and_then(|v| v.as_str())
                .map(String::from),
            amount: fields.get(AMOUNT).and_then(|v| v.as_f64()),
            status: fields
                .get(STATUS)
                .and_then(|v| v.as_str())
                .and_then(|s| s.parse().ok()),
        }
    }

    /// INSERT bindings, amount converted to minor units
    pub fn into_new_invoice(self, date: DateTime<Utc>) -> NewInvoice {
        NewInvoice {
            customer_id: self.customer_id,
            amount: self.amount.and_then(to_minor_units),
            status: self.status,
            date,
        }
    }

    /// UPDATE bindings, amount converted to minor units
    pub fn into_patch(self) -> InvoicePatch {
        InvoicePatch {
            customer_id: self.customer_id,
            amount: self.amount.and_then(to_minor_units),
            status: self.status,
        }
    }
}
