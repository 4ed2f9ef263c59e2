//! Storage seams. Services and the checkout engine only see these traits;
//! [`memory::MemoryStore`] and [`postgres::PostgresStore`] implement all of them.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    dto::{
        categories::{CategoryChanges, NewCategory},
        products::{NewProduct, ProductChanges, ProductFilter},
        reports::ReportRange,
    },
    error::AppResult,
    models::{Category, Product, ReportSummary, TopProduct, Transaction, TransactionDetail},
};

pub mod memory;
pub mod postgres;

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn find_product(&self, id: i32) -> AppResult<Product>;
    async fn list_products(&self, filter: &ProductFilter) -> AppResult<Vec<Product>>;
    async fn create_product(&self, product: NewProduct) -> AppResult<Product>;
    async fn update_product(&self, id: i32, changes: ProductChanges) -> AppResult<Product>;
    async fn delete_product(&self, id: i32) -> AppResult<()>;

    async fn find_category(&self, id: i32) -> AppResult<Category>;
    async fn list_categories(&self) -> AppResult<Vec<Category>>;
    async fn create_category(&self, category: NewCategory) -> AppResult<Category>;
    async fn update_category(&self, id: i32, changes: CategoryChanges) -> AppResult<Category>;
    async fn delete_category(&self, id: i32) -> AppResult<()>;
}

/// Product row as read under the checkout lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockedProduct {
    pub id: i32,
    pub name: String,
    pub price: i64,
    pub stock: i32,
}

/// Priced line about to be written as a transaction detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleLine {
    pub product_id: i32,
    pub product_name: String,
    pub quantity: i32,
    pub subtotal: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionHeader {
    pub id: i32,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait CheckoutStore: Send + Sync {
    /// Opens an atomic unit of work.
    async fn begin(&self) -> AppResult<Box<dyn CheckoutScope>>;
}

/// One atomic unit of work. Dropping a scope without calling
/// [`CheckoutScope::commit`] discards everything it did.
#[async_trait]
pub trait CheckoutScope: Send {
    /// Locks and reads every listed product in one batch. Unknown ids are
    /// simply absent from the map.
    async fn lock_products(&mut self, ids: &[i32]) -> AppResult<HashMap<i32, LockedProduct>>;
    async fn decrement_stock(&mut self, product_id: i32, quantity: i32) -> AppResult<()>;
    async fn insert_transaction(&mut self, total_amount: i64) -> AppResult<TransactionHeader>;
    async fn insert_details(
        &mut self,
        transaction_id: i32,
        lines: &[SaleLine],
    ) -> AppResult<Vec<TransactionDetail>>;
    async fn commit(self: Box<Self>) -> AppResult<()>;
    async fn rollback(self: Box<Self>) -> AppResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u64,
    pub offset: u64,
    pub newest_first: bool,
}

#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn find_transaction(&self, id: i32) -> AppResult<Transaction>;
    /// Returns one page of transactions and the total number stored.
    async fn list_transactions(&self, page: PageRequest) -> AppResult<(Vec<Transaction>, i64)>;
}

#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn summary(&self, range: ReportRange) -> AppResult<ReportSummary>;
}

#[async_trait]
pub trait StorageHealth: Send + Sync {
    fn backend(&self) -> &'static str;
    async fn ping(&self) -> AppResult<()>;
}

/// Everything a backend has to provide to run the API.
pub trait Store: CatalogStore + CheckoutStore + TransactionStore + ReportStore + StorageHealth {}

impl<T> Store for T where
    T: CatalogStore + CheckoutStore + TransactionStore + ReportStore + StorageHealth
{
}

/// Picks the best seller among detail rows: highest summed quantity, ties go
/// to the lowest product id. `current_name` lets a backend prefer today's
/// catalog name over the snapshot stored on the rows.
pub(crate) fn top_product<'a, I, F>(details: I, current_name: F) -> Option<TopProduct>
where
    I: IntoIterator<Item = &'a TransactionDetail>,
    F: Fn(i32) -> Option<String>,
{
    let mut sold: BTreeMap<i32, (i64, &'a str)> = BTreeMap::new();
    for detail in details {
        let entry = sold
            .entry(detail.product_id)
            .or_insert((0, detail.product_name.as_str()));
        entry.0 += i64::from(detail.quantity);
        entry.1 = detail.product_name.as_str();
    }

    // BTreeMap iterates ids ascending, so only a strictly larger total
    // replaces the current best.
    let mut best: Option<(i32, i64, &str)> = None;
    for (product_id, (sold_qty, snapshot)) in sold {
        if best.is_none_or(|(_, top_qty, _)| sold_qty > top_qty) {
            best = Some((product_id, sold_qty, snapshot));
        }
    }
    let (product_id, sold_qty, snapshot) = best?;

    Some(TopProduct {
        name: current_name(product_id).unwrap_or_else(|| snapshot.to_string()),
        sold_qty,
    })
}
