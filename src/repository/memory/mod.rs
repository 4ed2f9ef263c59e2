//! Volatile backend. All state sits behind one reader/writer lock: plain reads
//! share it, and a checkout holds the write half from lock to commit.

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::{
    error::AppResult,
    models::{Category, Product, Transaction},
    repository::StorageHealth,
};

mod catalog;
mod checkout;
mod ledger;

pub use checkout::MemoryCheckoutScope;

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Debug, Default)]
pub(crate) struct MemoryState {
    categories: BTreeMap<i32, Category>,
    /// Stored without the resolved `category`; reads fill it in.
    products: BTreeMap<i32, Product>,
    /// Ascending id order, which is also commit order.
    transactions: Vec<Transaction>,
    last_category_id: i32,
    last_product_id: i32,
    last_transaction_id: i32,
    last_detail_id: i32,
}

impl MemoryState {
    fn with_category(&self, product: &Product) -> Product {
        let mut product = product.clone();
        product.category = product
            .category_id
            .and_then(|id| self.categories.get(&id).cloned());
        product
    }
}

#[derive(Clone)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
    clock: Clock,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_clock(Utc::now)
    }

    /// Store whose timestamps and notion of "today" come from `clock`.
    pub fn with_clock<F>(clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        Self {
            state: Arc::new(RwLock::new(MemoryState::default())),
            clock: Arc::new(clock),
        }
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }
}

#[async_trait]
impl StorageHealth for MemoryStore {
    fn backend(&self) -> &'static str {
        "in-memory"
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}
