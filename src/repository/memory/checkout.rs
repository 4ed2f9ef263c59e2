use std::collections::HashMap;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::OwnedRwLockWriteGuard;

use super::{MemoryState, MemoryStore, catalog::product_not_found};
use crate::{
    error::AppResult,
    models::{Transaction, TransactionDetail},
    repository::{CheckoutScope, CheckoutStore, LockedProduct, SaleLine, TransactionHeader},
};

#[async_trait]
impl CheckoutStore for MemoryStore {
    async fn begin(&self) -> AppResult<Box<dyn CheckoutScope>> {
        let guard = self.state.clone().write_owned().await;
        Ok(Box::new(MemoryCheckoutScope::new(guard, self.now())))
    }
}

/// Unit of work over the in-memory state. Holds the exclusive lock for its
/// whole life and stages every change until `commit`.
pub struct MemoryCheckoutScope {
    guard: OwnedRwLockWriteGuard<MemoryState>,
    now: DateTime<Utc>,
    taken: HashMap<i32, i32>,
    header: Option<(TransactionHeader, i64)>,
    details: Vec<TransactionDetail>,
    last_transaction_id: i32,
    last_detail_id: i32,
}

impl MemoryCheckoutScope {
    fn new(guard: OwnedRwLockWriteGuard<MemoryState>, now: DateTime<Utc>) -> Self {
        let last_transaction_id = guard.last_transaction_id;
        let last_detail_id = guard.last_detail_id;
        Self {
            guard,
            now,
            taken: HashMap::new(),
            header: None,
            details: Vec::new(),
            last_transaction_id,
            last_detail_id,
        }
    }

    fn available(&self, product_id: i32, stock: i32) -> i32 {
        stock - self.taken.get(&product_id).copied().unwrap_or(0)
    }
}

#[async_trait]
impl CheckoutScope for MemoryCheckoutScope {
    async fn lock_products(&mut self, ids: &[i32]) -> AppResult<HashMap<i32, LockedProduct>> {
        // The write guard taken in `begin` already excludes everyone else.
        let mut locked = HashMap::with_capacity(ids.len());
        for id in ids {
            if let Some(product) = self.guard.products.get(id) {
                locked.insert(
                    *id,
                    LockedProduct {
                        id: product.id,
                        name: product.name.clone(),
                        price: product.price,
                        stock: self.available(product.id, product.stock),
                    },
                );
            }
        }
        Ok(locked)
    }

    async fn decrement_stock(&mut self, product_id: i32, quantity: i32) -> AppResult<()> {
        let stock = self
            .guard
            .products
            .get(&product_id)
            .map(|p| p.stock)
            .ok_or_else(|| product_not_found(product_id))?;
        if self.available(product_id, stock) < quantity {
            return Err(anyhow!("stock of product {product_id} would go negative").into());
        }
        *self.taken.entry(product_id).or_insert(0) += quantity;
        Ok(())
    }

    async fn insert_transaction(&mut self, total_amount: i64) -> AppResult<TransactionHeader> {
        if self.header.is_some() {
            return Err(anyhow!("unit of work already holds a transaction").into());
        }
        self.last_transaction_id += 1;
        let header = TransactionHeader {
            id: self.last_transaction_id,
            created_at: self.now,
        };
        self.header = Some((header, total_amount));
        Ok(header)
    }

    async fn insert_details(
        &mut self,
        transaction_id: i32,
        lines: &[SaleLine],
    ) -> AppResult<Vec<TransactionDetail>> {
        if self.header.map(|(h, _)| h.id) != Some(transaction_id) {
            return Err(anyhow!("transaction {transaction_id} is not part of this unit of work").into());
        }
        let mut inserted = Vec::with_capacity(lines.len());
        for line in lines {
            self.last_detail_id += 1;
            inserted.push(TransactionDetail {
                id: self.last_detail_id,
                transaction_id,
                product_id: line.product_id,
                product_name: line.product_name.clone(),
                quantity: line.quantity,
                subtotal: line.subtotal,
            });
        }
        self.details.extend(inserted.iter().cloned());
        Ok(inserted)
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let MemoryCheckoutScope {
            mut guard,
            taken,
            header,
            details,
            last_transaction_id,
            last_detail_id,
            ..
        } = *self;

        for (product_id, quantity) in taken {
            if let Some(product) = guard.products.get_mut(&product_id) {
                product.stock -= quantity;
            }
        }
        if let Some((header, total_amount)) = header {
            guard.transactions.push(Transaction {
                id: header.id,
                total_amount,
                created_at: header.created_at,
                details,
            });
        }
        guard.last_transaction_id = last_transaction_id;
        guard.last_detail_id = last_detail_id;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        // Staged changes live only in the scope; releasing the guard is enough.
        Ok(())
    }
}
