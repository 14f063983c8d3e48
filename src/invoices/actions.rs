//! Invoice command handlers
//!
//! Each handler normalizes raw form input, validates it, issues one store
//! call and reports the outcome as an [`ActionState`]. Validation failures
//! and store failures never escape as errors.

use super::schema::{InvoiceFields, Operation, invoice_schema};
use crate::core::action::{ActionState, FormAction, normalize};
use crate::core::invalidation::{INVOICES_PATH, ViewInvalidator};
use crate::core::store::InvoiceStore;
use crate::core::validation::RawFields;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

pub const MISSING_ID: &str = "Invoice ID is required.";
pub const CREATE_INVALID: &str = "Missing Fields. Failed to Create Invoice.";
pub const UPDATE_INVALID: &str = "Missing fields. Failed to update invoice.";
pub const CREATED: &str = "Invoice created successfully";
pub const UPDATED: &str = "Invoice updated successfully";
pub const DELETED: &str = "Invoice deleted successfully";

/// Create/update/delete handlers sharing a store and an invalidator
#[derive(Clone)]
pub struct InvoiceActions {
    store: Arc<dyn InvoiceStore>,
    invalidator: Arc<dyn ViewInvalidator>,
}

impl InvoiceActions {
    pub fn new(store: Arc<dyn InvoiceStore>, invalidator: Arc<dyn ViewInvalidator>) -> Self {
        Self { store, invalidator }
    }

    pub fn store(&self) -> &Arc<dyn InvoiceStore> {
        &self.store
    }

    /// Create an invoice from `customerId`, `amount` and `status`
    pub async fn create_invoice(&self, _prev: ActionState, raw: RawFields) -> ActionState {
        let validated = match invoice_schema(Operation::Create).validate(&normalize(raw)) {
            Ok(fields) => fields,
            Err(errors) => {
                tracing::debug!(fields = ?errors.fields().collect::<Vec<_>>(), "create rejected");
                return ActionState::invalid(errors, CREATE_INVALID);
            }
        };

        let invoice = InvoiceFields::from_validated(&validated).into_new_invoice(Utc::now());

        match self.store.insert(invoice).await {
            Ok(id) => {
                tracing::info!(invoice_id = %id, "invoice created");
                self.invalidator.invalidate(INVOICES_PATH).await;
                ActionState::success(CREATED)
            }
            Err(e) => {
                tracing::warn!(error = %e, "invoice insert failed");
                ActionState::failed(format!("Error creating invoice: {}", e.message()))
            }
        }
    }

    /// Update the invoice `id`; fields the form leaves unset keep their value
    pub async fn update_invoice(&self, id: &str, _prev: ActionState, raw: RawFields) -> ActionState {
        let id = id.trim();
        if id.is_empty() {
            return ActionState::rejected(MISSING_ID);
        }

        let validated = match invoice_schema(Operation::Update).validate(&normalize(raw)) {
            Ok(fields) => fields,
            Err(errors) => {
                tracing::debug!(invoice_id = id, fields = ?errors.fields().collect::<Vec<_>>(), "update rejected");
                return ActionState::invalid(errors, UPDATE_INVALID);
            }
        };

        let patch = InvoiceFields::from_validated(&validated).into_patch();

        match self.store.update(id, patch).await {
            Ok(rows) => {
                tracing::info!(invoice_id = id, rows, "invoice updated");
                self.invalidator.invalidate(INVOICES_PATH).await;
                ActionState::success(UPDATED)
            }
            Err(e) => {
                tracing::warn!(invoice_id = id, error = %e, "invoice update failed");
                ActionState::failed(format!("Error updating invoice: {}", e.message()))
            }
        }
    }

    /// Delete the invoice `id`
    pub async fn delete_invoice(&self, id: &str) -> ActionState {
        let id = id.trim();
        if id.is_empty() {
            return ActionState::rejected(MISSING_ID);
        }

        match self.store.delete(id).await {
            Ok(rows) => {
                tracing::info!(invoice_id = id, rows, "invoice deleted");
                self.invalidator.invalidate(INVOICES_PATH).await;
                ActionState::success(DELETED)
            }
            Err(e) => {
                tracing::warn!(invoice_id = id, error = %e, "invoice delete failed");
                ActionState::failed(format!("Error deleting invoice: {}", e.message()))
            }
        }
    }

    /// Create action with the uniform form signature
    pub fn create(&self) -> CreateInvoice {
        CreateInvoice {
            actions: self.clone(),
        }
    }

    /// Update action with `id` bound ahead of time
    pub fn bind_update(&self, id: impl Into<String>) -> UpdateInvoice {
        UpdateInvoice {
            id: id.into(),
            actions: self.clone(),
        }
    }

    /// Delete action with `id` bound ahead of time; form input is ignored
    pub fn bind_delete(&self, id: impl Into<String>) -> DeleteInvoice {
        DeleteInvoice {
            id: id.into(),
            actions: self.clone(),
        }
    }
}

/// [`InvoiceActions::create_invoice`] as a [`FormAction`]
#[derive(Clone)]
pub struct CreateInvoice {
    actions: InvoiceActions,
}

#[async_trait]
impl FormAction for CreateInvoice {
    async fn invoke(&self, prev: ActionState, raw: RawFields) -> ActionState {
        self.actions.create_invoice(prev, raw).await
    }
}

/// [`InvoiceActions::update_invoice`] with the invoice id captured
#[derive(Clone)]
pub struct UpdateInvoice {
    id: String,
    actions: InvoiceActions,
}

#[async_trait]
impl FormAction for UpdateInvoice {
    async fn invoke(&self, prev: ActionState, raw: RawFields) -> ActionState {
        self.actions.update_invoice(&self.id, prev, raw).await
    }
}

/// [`InvoiceActions::delete_invoice`] with the invoice id captured
#[derive(Clone)]
pub struct DeleteInvoice {
    id: String,
    actions: InvoiceActions,
}

#[async_trait]
impl FormAction for DeleteInvoice {
    async fn invoke(&self, _prev: ActionState, _raw: RawFields) -> ActionState {
        self.actions.delete_invoice(&self.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::StorageError;
    use crate::core::invalidation::InvalidationBus;
    use crate::core::invoice::{Customer, Invoice, InvoiceListing, InvoicePatch, NewInvoice};
    use crate::core::store::StoreResult;
    use crate::invoices::schema::{AMOUNT, CUSTOMER_ID, STATUS};
    use serde_json::{Value, json};
    use std::sync::Mutex;

    /// Records every call; fails all of them when `fail_with` is set
    #[derive(Default)]
    struct RecordingStore {
        calls: Mutex<Vec<String>>,
        inserted: Mutex<Vec<NewInvoice>>,
        patches: Mutex<Vec<(String, InvoicePatch)>>,
        fail_with: Option<StorageError>,
    }

    impl RecordingStore {
        fn failing(message: &str) -> Self {
            Self {
                fail_with: Some(StorageError::query("test", message)),
                ..Default::default()
            }
        }

        fn record(&self, call: &str) -> StoreResult<()> {
            self.calls.lock().unwrap().push(call.to_string());
            match &self.fail_with {
                Some(e) => Err(e.clone()),
                None => Ok(()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl InvoiceStore for RecordingStore {
        async fn insert(&self, invoice: NewInvoice) -> StoreResult<String> {
            self.record("insert")?;
            self.inserted.lock().unwrap().push(invoice);
            Ok("inv-1".to_string())
        }

        async fn update(&self, id: &str, patch: InvoicePatch) -> StoreResult<u64> {
            self.record("update")?;
            self.patches.lock().unwrap().push((id.to_string(), patch));
            Ok(1)
        }

        async fn delete(&self, _id: &str) -> StoreResult<u64> {
            self.record("delete")?;
            Ok(1)
        }

        async fn get(&self, _id: &str) -> StoreResult<Option<Invoice>> {
            Ok(None)
        }

        async fn list_invoices(&self, _: &str, _: usize, _: usize) -> StoreResult<Vec<InvoiceListing>> {
            Ok(vec![])
        }

        async fn count_pages(&self, _: &str, _: usize) -> StoreResult<usize> {
            Ok(0)
        }

        async fn customers(&self) -> StoreResult<Vec<Customer>> {
            Ok(vec![])
        }
    }

    fn setup(store: RecordingStore) -> (InvoiceActions, Arc<RecordingStore>, InvalidationBus) {
        let store = Arc::new(store);
        let bus = InvalidationBus::new(8);
        let actions = InvoiceActions::new(store.clone(), Arc::new(bus.clone()));
        (actions, store, bus)
    }

    fn raw(value: Value) -> RawFields {
        value.as_object().cloned().unwrap_or_default()
    }

    fn valid_form() -> RawFields {
        raw(json!({"customerId": "cust-1", "amount": "49.99", "status": "paid"}))
    }

    #[tokio::test]
    async fn test_create_inserts_normalized_values() {
        let (actions, store, bus) = setup(RecordingStore::default());
        let before = Utc::now();

        let state = actions.create_invoice(ActionState::default(), valid_form()).await;

        assert_eq!(state, ActionState::success(CREATED));
        let inserted = store.inserted.lock().unwrap();
        assert_eq!(inserted.len(), 1);
        assert_eq!(inserted[0].customer_id.as_deref(), Some("cust-1"));
        assert_eq!(inserted[0].amount, Some(4999));
        assert_eq!(inserted[0].status, Some(crate::core::InvoiceStatus::Paid));
        assert!(inserted[0].date >= before && inserted[0].date <= Utc::now());
        assert_eq!(bus.revision(INVOICES_PATH), 1);
    }

    #[tokio::test]
    async fn test_create_invalid_input_skips_store() {
        let (actions, store, bus) = setup(RecordingStore::default());

        let state = actions
            .create_invoice(ActionState::default(), raw(json!({"amount": "-3", "status": "overdue"})))
            .await;

        assert_eq!(state.message(), Some(CREATE_INVALID));
        assert!(state.field_errors(CUSTOMER_ID).is_some());
        assert!(state.field_errors(AMOUNT).is_some());
        assert!(state.field_errors(STATUS).is_some());
        assert_eq!(store.call_count(), 0);
        assert_eq!(bus.revision(INVOICES_PATH), 0);
    }

    #[tokio::test]
    async fn test_create_storage_failure_becomes_message() {
        let (actions, _store, bus) = setup(RecordingStore::failing("violates foreign key constraint"));

        let state = actions.create_invoice(ActionState::default(), valid_form()).await;

        assert_eq!(
            state.message(),
            Some("Error creating invoice: violates foreign key constraint")
        );
        assert!(state.errors.is_none());
        assert_eq!(bus.revision(INVOICES_PATH), 0);
    }

    #[tokio::test]
    async fn test_update_requires_id() {
        let (actions, store, _bus) = setup(RecordingStore::default());

        for id in ["", "   "] {
            let state = actions
                .update_invoice(id, ActionState::default(), valid_form())
                .await;
            assert_eq!(state, ActionState::rejected(MISSING_ID));
        }
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_update_sends_patch_for_id() {
        let (actions, store, bus) = setup(RecordingStore::default());

        let state = actions
            .bind_update("inv-9")
            .invoke(ActionState::default(), valid_form())
            .await;

        assert_eq!(state.message(), Some(UPDATED));
        let patches = store.patches.lock().unwrap();
        assert_eq!(patches[0].0, "inv-9");
        assert_eq!(patches[0].1.amount, Some(4999));
        assert_eq!(bus.revision(INVOICES_PATH), 1);
    }

    #[tokio::test]
    async fn test_update_invalid_input_message() {
        let (actions, store, _bus) = setup(RecordingStore::default());

        let state = actions
            .update_invoice("inv-9", ActionState::default(), raw(json!({"customerId": "c"})))
            .await;

        assert_eq!(state.message(), Some(UPDATE_INVALID));
        assert!(!state.errors.as_ref().unwrap().contains(CUSTOMER_ID));
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_update_storage_failure_becomes_message() {
        let (actions, _store, _bus) = setup(RecordingStore::failing("deadlock detected"));

        let state = actions
            .update_invoice("inv-9", ActionState::default(), valid_form())
            .await;

        assert_eq!(state.message(), Some("Error updating invoice: deadlock detected"));
    }

    #[tokio::test]
    async fn test_delete_requires_id() {
        let (actions, store, _bus) = setup(RecordingStore::default());

        let state = actions.delete_invoice("").await;

        assert_eq!(state.message(), Some(MISSING_ID));
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_delete_success_and_failure() {
        let (actions, _store, bus) = setup(RecordingStore::default());
        assert_eq!(actions.delete_invoice("inv-1").await.message(), Some(DELETED));
        assert_eq!(bus.revision(INVOICES_PATH), 1);

        let (actions, _store, bus) = setup(RecordingStore::failing("connection refused"));
        let state = actions
            .bind_delete("inv-1")
            .invoke(ActionState::default(), RawFields::new())
            .await;
        assert_eq!(state.message(), Some("Error deleting invoice: connection refused"));
        assert_eq!(bus.revision(INVOICES_PATH), 0);
    }

    #[tokio::test]
    async fn test_previous_state_is_ignored() {
        let (actions, _store, _bus) = setup(RecordingStore::default());
        let prev = ActionState::failed("Error creating invoice: earlier failure");

        let state = actions.create().invoke(prev, valid_form()).await;

        assert_eq!(state, ActionState::success(CREATED));
    }
}
