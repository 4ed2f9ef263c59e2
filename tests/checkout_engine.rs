mod common;

use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use cashier_api::{
    dto::{products::ProductChanges, transactions::CheckoutRequest},
    error::{AppError, AppResult, ErrorKind},
    models::TransactionDetail,
    repository::{
        CatalogStore, CheckoutScope, CheckoutStore, LockedProduct, PageRequest, SaleLine,
        TransactionHeader, TransactionStore, memory::MemoryStore,
    },
    services::checkout_service::CheckoutEngine,
};
use common::{add_product, stock_of};

fn engine(store: &MemoryStore) -> CheckoutEngine {
    CheckoutEngine::new(Arc::new(store.clone()), Some(Duration::from_secs(5)))
}

async fn transaction_count(store: &MemoryStore) -> i64 {
    let (_, total) = store
        .list_transactions(PageRequest {
            limit: 100,
            offset: 0,
            newest_first: true,
        })
        .await
        .unwrap();
    total
}

#[tokio::test]
async fn single_line_sale_decrements_stock_and_records_transaction() {
    let store = MemoryStore::new();
    let indomie = add_product(&store, "Indomie", 3500, 10).await;

    let tx = engine(&store)
        .execute(&CheckoutRequest::new([(indomie.id, 4)]))
        .await
        .unwrap();

    assert_eq!(tx.total_amount, 14000);
    assert_eq!(tx.details.len(), 1);
    assert_eq!(tx.details[0].subtotal, 14000);
    assert_eq!(tx.details[0].product_name, "Indomie");
    assert_eq!(tx.details[0].transaction_id, tx.id);
    assert_eq!(stock_of(&store, indomie.id).await, 6);

    let stored = store.find_transaction(tx.id).await.unwrap();
    assert_eq!(stored, tx);
}

#[tokio::test]
async fn insufficient_stock_changes_nothing() {
    let store = MemoryStore::new();
    let p = add_product(&store, "Indomie", 3500, 3).await;

    let err = engine(&store)
        .execute(&CheckoutRequest::new([(p.id, 5)]))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(
        err.to_string(),
        "insufficient stock for product Indomie (available: 3, requested: 5)"
    );
    assert_eq!(stock_of(&store, p.id).await, 3);
    assert_eq!(transaction_count(&store).await, 0);
}

#[tokio::test]
async fn unknown_product_is_not_found_and_changes_nothing() {
    let store = MemoryStore::new();
    let p = add_product(&store, "Indomie", 3500, 10).await;

    let err = engine(&store)
        .execute(&CheckoutRequest::new([(p.id, 1), (999, 1)]))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.to_string(), "product id 999 not found");
    assert_eq!(stock_of(&store, p.id).await, 10);
    assert_eq!(transaction_count(&store).await, 0);
}

/// Store that must never be reached.
struct UnreachableStore;

#[async_trait]
impl CheckoutStore for UnreachableStore {
    async fn begin(&self) -> AppResult<Box<dyn CheckoutScope>> {
        panic!("storage touched for a malformed request");
    }
}

#[tokio::test]
async fn empty_request_is_rejected_before_storage() {
    let engine = CheckoutEngine::new(Arc::new(UnreachableStore), None);

    let err = engine.execute(&CheckoutRequest::default()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.to_string(), "items cannot be empty");

    let err = engine
        .execute(&CheckoutRequest::new([(1, 0)]))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "item[0] quantity must be positive");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_checkouts_never_oversell() {
    let store = MemoryStore::new();
    let id = add_product(&store, "Indomie", 3500, 10).await.id;
    let engine = engine(&store);

    let first = tokio::spawn({
        let engine = engine.clone();
        async move { engine.execute(&CheckoutRequest::new([(id, 6)])).await }
    });
    let second = tokio::spawn({
        let engine = engine.clone();
        async move { engine.execute(&CheckoutRequest::new([(id, 6)])).await }
    });
    let results = [first.await.unwrap(), second.await.unwrap()];

    let committed = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(committed, 1);
    let rejected = results
        .iter()
        .find_map(|r| r.as_ref().err())
        .expect("one checkout rejected");
    assert_eq!(rejected.kind(), ErrorKind::Validation);
    assert_eq!(stock_of(&store, id).await, 4);
    assert_eq!(transaction_count(&store).await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn many_single_unit_checkouts_sell_exactly_the_stock() {
    let store = MemoryStore::new();
    let id = add_product(&store, "Kopi", 2000, 10).await.id;
    let engine = engine(&store);

    let handles: Vec<_> = (0..25)
        .map(|_| {
            let engine = engine.clone();
            tokio::spawn(async move { engine.execute(&CheckoutRequest::new([(id, 1)])).await })
        })
        .collect();

    let mut committed = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            committed += 1;
        }
    }

    assert_eq!(committed, 10);
    assert_eq!(stock_of(&store, id).await, 0);
    assert_eq!(transaction_count(&store).await, 10);
}

#[tokio::test]
async fn multi_line_sale_conserves_stock_and_totals() {
    let store = MemoryStore::new();
    let a = add_product(&store, "Indomie", 3500, 10).await;
    let b = add_product(&store, "Teh Botol", 5000, 8).await;

    let tx = engine(&store)
        .execute(&CheckoutRequest::new([(b.id, 3), (a.id, 2)]))
        .await
        .unwrap();

    // Request order is kept.
    assert_eq!(tx.details[0].product_id, b.id);
    assert_eq!(tx.details[1].product_id, a.id);
    assert_eq!(tx.details[0].subtotal, 15000);
    assert_eq!(tx.details[1].subtotal, 7000);
    assert_eq!(
        tx.total_amount,
        tx.details.iter().map(|d| d.subtotal).sum::<i64>()
    );
    assert_eq!(stock_of(&store, a.id).await, 8);
    assert_eq!(stock_of(&store, b.id).await, 5);
}

#[tokio::test]
async fn one_short_line_rejects_the_whole_sale() {
    let store = MemoryStore::new();
    let a = add_product(&store, "Indomie", 3500, 10).await;
    let b = add_product(&store, "Teh Botol", 5000, 1).await;

    let err = engine(&store)
        .execute(&CheckoutRequest::new([(a.id, 2), (b.id, 2)]))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(stock_of(&store, a.id).await, 10);
    assert_eq!(stock_of(&store, b.id).await, 1);
}

#[tokio::test]
async fn duplicate_lines_are_merged_into_one_detail() {
    let store = MemoryStore::new();
    let a = add_product(&store, "Indomie", 3500, 10).await;
    let b = add_product(&store, "Kopi", 2000, 10).await;

    let tx = engine(&store)
        .execute(&CheckoutRequest::new([(a.id, 2), (b.id, 1), (a.id, 3)]))
        .await
        .unwrap();

    assert_eq!(tx.details.len(), 2);
    assert_eq!(tx.details[0].product_id, a.id);
    assert_eq!(tx.details[0].quantity, 5);
    assert_eq!(tx.details[0].subtotal, 17500);
    assert_eq!(stock_of(&store, a.id).await, 5);
}

#[tokio::test]
async fn duplicate_lines_are_checked_against_stock_together() {
    let store = MemoryStore::new();
    let a = add_product(&store, "Indomie", 3500, 4).await;

    let err = engine(&store)
        .execute(&CheckoutRequest::new([(a.id, 3), (a.id, 3)]))
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "insufficient stock for product Indomie (available: 4, requested: 6)"
    );
    assert_eq!(stock_of(&store, a.id).await, 4);
}

#[tokio::test]
async fn recorded_sale_keeps_price_and_name_at_sale_time() {
    let store = MemoryStore::new();
    let p = add_product(&store, "Indomie", 3500, 10).await;
    let tx = engine(&store)
        .execute(&CheckoutRequest::new([(p.id, 2)]))
        .await
        .unwrap();

    store
        .update_product(
            p.id,
            ProductChanges {
                name: Some("Indomie Goreng".into()),
                price: Some(4000),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let stored = store.find_transaction(tx.id).await.unwrap();
    assert_eq!(stored.details[0].product_name, "Indomie");
    assert_eq!(stored.details[0].subtotal, 7000);
    assert_eq!(stored.total_amount, 7000);
}

#[tokio::test]
async fn sold_out_product_still_sells_after_restock() {
    let store = MemoryStore::new();
    let p = add_product(&store, "Roti", 16000, 1).await;
    let engine = engine(&store);

    engine.execute(&CheckoutRequest::new([(p.id, 1)])).await.unwrap();
    assert!(engine.execute(&CheckoutRequest::new([(p.id, 1)])).await.is_err());

    store
        .update_product(
            p.id,
            ProductChanges {
                stock: Some(3),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    engine.execute(&CheckoutRequest::new([(p.id, 3)])).await.unwrap();
    assert_eq!(stock_of(&store, p.id).await, 0);
}

/// Delegates to the in-memory store but fails at one chosen step.
#[derive(Clone, Copy, PartialEq, Eq)]
enum FailAt {
    InsertDetails,
    Commit,
    Lock { delay: Duration },
    /// Commits, then is slow to acknowledge.
    SlowCommitAck { delay: Duration },
}

struct FlakyStore {
    inner: MemoryStore,
    fail_at: FailAt,
}

struct FlakyScope {
    inner: Box<dyn CheckoutScope>,
    fail_at: FailAt,
}

#[async_trait]
impl CheckoutStore for FlakyStore {
    async fn begin(&self) -> AppResult<Box<dyn CheckoutScope>> {
        let inner = self.inner.begin().await?;
        Ok(Box::new(FlakyScope {
            inner,
            fail_at: self.fail_at,
        }))
    }
}

#[async_trait]
impl CheckoutScope for FlakyScope {
    async fn lock_products(&mut self, ids: &[i32]) -> AppResult<HashMap<i32, LockedProduct>> {
        if let FailAt::Lock { delay } = self.fail_at {
            tokio::time::sleep(delay).await;
        }
        self.inner.lock_products(ids).await
    }

    async fn decrement_stock(&mut self, product_id: i32, quantity: i32) -> AppResult<()> {
        self.inner.decrement_stock(product_id, quantity).await
    }

    async fn insert_transaction(&mut self, total_amount: i64) -> AppResult<TransactionHeader> {
        self.inner.insert_transaction(total_amount).await
    }

    async fn insert_details(
        &mut self,
        transaction_id: i32,
        lines: &[SaleLine],
    ) -> AppResult<Vec<TransactionDetail>> {
        if self.fail_at == FailAt::InsertDetails {
            return Err(AppError::from(sqlx::Error::PoolTimedOut));
        }
        self.inner.insert_details(transaction_id, lines).await
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        match self.fail_at {
            FailAt::Commit => Err(AppError::from(sqlx::Error::PoolClosed)),
            FailAt::SlowCommitAck { delay } => {
                self.inner.commit().await?;
                tokio::time::sleep(delay).await;
                Ok(())
            }
            _ => self.inner.commit().await,
        }
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        self.inner.rollback().await
    }
}

#[tokio::test]
async fn storage_failure_after_decrement_rolls_everything_back() {
    for fail_at in [FailAt::InsertDetails, FailAt::Commit] {
        let store = MemoryStore::new();
        let p = add_product(&store, "Indomie", 3500, 10).await;
        let engine = CheckoutEngine::new(
            Arc::new(FlakyStore {
                inner: store.clone(),
                fail_at,
            }),
            None,
        );

        let err = engine
            .execute(&CheckoutRequest::new([(p.id, 4)]))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(stock_of(&store, p.id).await, 10);
        assert_eq!(transaction_count(&store).await, 0);
    }
}

#[tokio::test]
async fn deadline_expiry_is_internal_and_releases_the_lock() {
    let store = MemoryStore::new();
    let p = add_product(&store, "Indomie", 3500, 10).await;
    let slow = CheckoutEngine::new(
        Arc::new(FlakyStore {
            inner: store.clone(),
            fail_at: FailAt::Lock {
                delay: Duration::from_secs(30),
            },
        }),
        Some(Duration::from_millis(50)),
    );

    let err = slow
        .execute(&CheckoutRequest::new([(p.id, 1)]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert_eq!(stock_of(&store, p.id).await, 10);

    // The abandoned unit of work no longer holds the store.
    engine(&store)
        .execute(&CheckoutRequest::new([(p.id, 1)]))
        .await
        .unwrap();
    assert_eq!(stock_of(&store, p.id).await, 9);
}

#[tokio::test]
async fn deadline_does_not_hide_a_committed_sale() {
    let store = MemoryStore::new();
    let p = add_product(&store, "Indomie", 3500, 10).await;
    let engine = CheckoutEngine::new(
        Arc::new(FlakyStore {
            inner: store.clone(),
            fail_at: FailAt::SlowCommitAck {
                delay: Duration::from_millis(200),
            },
        }),
        Some(Duration::from_millis(50)),
    );

    let tx = engine
        .execute(&CheckoutRequest::new([(p.id, 4)]))
        .await
        .unwrap();

    assert_eq!(tx.total_amount, 14000);
    assert_eq!(stock_of(&store, p.id).await, 6);
    assert_eq!(transaction_count(&store).await, 1);
    assert_eq!(store.find_transaction(tx.id).await.unwrap(), tx);
}
