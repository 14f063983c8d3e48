//! Invoice form handling: the field schema and the create/update/delete actions

pub mod actions;
pub mod schema;

pub use actions::{CreateInvoice, DeleteInvoice, InvoiceActions, UpdateInvoice};
pub use schema::{InvoiceFields, Operation, invoice_schema};
