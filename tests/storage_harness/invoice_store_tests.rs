//! Macro-generated test suite for `InvoiceStore` contract validation.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//!
//! use storage_harness::*;
//!
//! invoice_store_tests!(InMemoryInvoiceStore::with_customers(customers()));
//! ```
//!
//! # Generated Tests
//!
//! ## Writes
//! - `test_insert_and_get`: insert then read back every column
//! - `test_insert_null_column_is_rejected`: NULL binding fails with an integrity error
//! - `test_insert_unknown_customer_is_rejected`: foreign key violation
//! - `test_non_positive_amount_is_rejected`: insert and update hit the check constraint
//! - `test_update_coalesces_unset_fields`: `None` keeps the stored value
//! - `test_update_missing_row_affects_nothing`: 0 rows, no error
//! - `test_delete`: delete then get returns None; second delete affects 0 rows
//!
//! ## Reads
//! - `test_list_newest_first_and_paged`: ordering and 1-based pages
//! - `test_list_filters_case_insensitively`: name, email, status
//! - `test_count_pages`: ceil(matches / page_size)
//! - `test_customers_sorted_by_name`

/// Generate a full `InvoiceStore` conformance test suite.
///
/// `$factory` must evaluate to an `InvoiceStore` seeded with
/// [`customers()`](super::customers) and no invoices. It is re-evaluated for
/// each test.
#[macro_export]
macro_rules! invoice_store_tests {
    ($factory:expr) => {
        mod invoice_store_contract_tests {
            use super::*;
            use dashboard::core::error::StorageError;
            use dashboard::core::invoice::{InvoicePatch, InvoiceStatus};
            use dashboard::core::store::InvoiceStore;

            // ==================================================================
            // Writes
            // ==================================================================

            #[tokio::test]
            async fn test_insert_and_get() {
                let store = $factory;
                let invoice = new_invoice(AMY, 4999, InvoiceStatus::Pending);
                let date = invoice.date;

                let id = store.insert(invoice).await.unwrap();
                let stored = store.get(&id).await.unwrap().expect("invoice should exist");

                assert_eq!(stored.id, id);
                assert_eq!(stored.customer_id, AMY);
                assert_eq!(stored.amount, 4999);
                assert_eq!(stored.status, InvoiceStatus::Pending);
                assert!((stored.date - date).num_milliseconds().abs() < 1);
            }

            #[tokio::test]
            async fn test_insert_null_column_is_rejected() {
                let store = $factory;
                let mut invoice = new_invoice(AMY, 4999, InvoiceStatus::Pending);
                invoice.status = None;

                let err = store.insert(invoice).await.unwrap_err();

                assert!(matches!(err, StorageError::Integrity { .. }), "{err:?}");
                assert!(err.message().contains("status"), "{}", err.message());
            }

            #[tokio::test]
            async fn test_insert_unknown_customer_is_rejected() {
                let store = $factory;

                let err = store
                    .insert(new_invoice("no-such-customer", 100, InvoiceStatus::Paid))
                    .await
                    .unwrap_err();

                assert!(matches!(err, StorageError::Integrity { .. }), "{err:?}");
                assert!(err.message().contains("foreign key"), "{}", err.message());
            }

            #[tokio::test]
            async fn test_non_positive_amount_is_rejected() {
                let store = $factory;

                for amount in [0, -500] {
                    let err = store
                        .insert(new_invoice(AMY, amount, InvoiceStatus::Paid))
                        .await
                        .unwrap_err();
                    assert!(matches!(err, StorageError::Integrity { .. }), "{err:?}");
                    assert!(err.message().contains("check constraint"), "{}", err.message());
                }

                let id = store
                    .insert(new_invoice(AMY, 1, InvoiceStatus::Paid))
                    .await
                    .unwrap();
                let err = store
                    .update(
                        &id,
                        InvoicePatch {
                            amount: Some(0),
                            ..Default::default()
                        },
                    )
                    .await
                    .unwrap_err();
                assert!(matches!(err, StorageError::Integrity { .. }), "{err:?}");
                assert_eq!(store.get(&id).await.unwrap().unwrap().amount, 1);
                assert_eq!(store.count_pages("", 6).await.unwrap(), 1);
            }

            #[tokio::test]
            async fn test_update_coalesces_unset_fields() {
                let store = $factory;
                let id = store
                    .insert(new_invoice(AMY, 1000, InvoiceStatus::Pending))
                    .await
                    .unwrap();

                let rows = store
                    .update(
                        &id,
                        InvoicePatch {
                            customer_id: Some(EVIL.to_string()),
                            amount: Some(2500),
                            status: None,
                        },
                    )
                    .await
                    .unwrap();

                assert_eq!(rows, 1);
                let stored = store.get(&id).await.unwrap().unwrap();
                assert_eq!(stored.customer_id, EVIL);
                assert_eq!(stored.amount, 2500);
                assert_eq!(stored.status, InvoiceStatus::Pending);
            }

            #[tokio::test]
            async fn test_update_missing_row_affects_nothing() {
                let store = $factory;
                let rows = store
                    .update(
                        "00000000-0000-4000-8000-000000000000",
                        InvoicePatch {
                            amount: Some(1),
                            ..Default::default()
                        },
                    )
                    .await
                    .unwrap();
                assert_eq!(rows, 0);
            }

            #[tokio::test]
            async fn test_delete() {
                let store = $factory;
                let id = store
                    .insert(new_invoice(EVIL, 700, InvoiceStatus::Paid))
                    .await
                    .unwrap();

                assert_eq!(store.delete(&id).await.unwrap(), 1);
                assert!(store.get(&id).await.unwrap().is_none());
                assert_eq!(store.delete(&id).await.unwrap(), 0);
            }

            // ==================================================================
            // Reads
            // ==================================================================

            #[tokio::test]
            async fn test_list_newest_first_and_paged() {
                let store = $factory;
                for (days_ago, amount) in [(3, 300), (1, 100), (2, 200)] {
                    store
                        .insert(dated_invoice(AMY, amount, InvoiceStatus::Pending, days_ago))
                        .await
                        .unwrap();
                }

                let first = store.list_invoices("", 1, 2).await.unwrap();
                let amounts: Vec<i64> = first.iter().map(|row| row.amount).collect();
                assert_eq!(amounts, [100, 200]);
                assert_eq!(first[0].name, "Amy Burns");
                assert_eq!(first[0].email, "amy@burns.com");

                let second = store.list_invoices("", 2, 2).await.unwrap();
                assert_eq!(second.len(), 1);
                assert_eq!(second[0].amount, 300);

                assert!(store.list_invoices("", 3, 2).await.unwrap().is_empty());
            }

            #[tokio::test]
            async fn test_list_filters_case_insensitively() {
                let store = $factory;
                store
                    .insert(new_invoice(AMY, 100, InvoiceStatus::Pending))
                    .await
                    .unwrap();
                store
                    .insert(new_invoice(EVIL, 200, InvoiceStatus::Paid))
                    .await
                    .unwrap();

                let by_name = store.list_invoices("rabbit", 1, 6).await.unwrap();
                assert_eq!(by_name.len(), 1);
                assert_eq!(by_name[0].customer_id, EVIL);

                let by_email = store.list_invoices("BURNS.COM", 1, 6).await.unwrap();
                assert_eq!(by_email.len(), 1);

                let by_status = store.list_invoices("paid", 1, 6).await.unwrap();
                assert_eq!(by_status.len(), 1);
                assert_eq!(by_status[0].status, InvoiceStatus::Paid);

                assert!(store.list_invoices("nobody", 1, 6).await.unwrap().is_empty());
            }

            #[tokio::test]
            async fn test_count_pages() {
                let store = $factory;
                assert_eq!(store.count_pages("", 6).await.unwrap(), 0);

                for _ in 0..7 {
                    store
                        .insert(new_invoice(BALAZS, 100, InvoiceStatus::Pending))
                        .await
                        .unwrap();
                }

                assert_eq!(store.count_pages("", 6).await.unwrap(), 2);
                assert_eq!(store.count_pages("balazs", 7).await.unwrap(), 1);
                assert_eq!(store.count_pages("amy", 6).await.unwrap(), 0);
            }

            #[tokio::test]
            async fn test_customers_sorted_by_name() {
                let store = $factory;
                let names: Vec<String> = store
                    .customers()
                    .await
                    .unwrap()
                    .into_iter()
                    .map(|c| c.name)
                    .collect();
                assert_eq!(names, ["Amy Burns", "Balazs Orban", "Evil Rabbit"]);
            }
        }
    };
}
