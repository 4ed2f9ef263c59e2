use std::collections::HashMap;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
    sea_query::{Expr, LockType},
};

use super::{PostgresStore, detail_from_entity};
use crate::{
    entity::{
        products::{Column as ProdCol, Entity as Products},
        transaction_details::ActiveModel as DetailActive,
        transactions::ActiveModel as TransactionActive,
    },
    error::AppResult,
    models::TransactionDetail,
    repository::{CheckoutScope, CheckoutStore, LockedProduct, SaleLine, TransactionHeader},
};

#[async_trait]
impl CheckoutStore for PostgresStore {
    async fn begin(&self) -> AppResult<Box<dyn CheckoutScope>> {
        let txn = self.orm.begin().await?;
        Ok(Box::new(PostgresCheckoutScope { txn }))
    }
}

/// Wraps a database transaction. sea-orm rolls a dropped transaction back,
/// which gives the scope its implicit rollback.
pub struct PostgresCheckoutScope {
    txn: DatabaseTransaction,
}

#[async_trait]
impl CheckoutScope for PostgresCheckoutScope {
    async fn lock_products(&mut self, ids: &[i32]) -> AppResult<HashMap<i32, LockedProduct>> {
        // SELECT ... FOR UPDATE, ordered by id so overlapping checkouts take
        // row locks in the same order and cannot deadlock each other.
        let rows = Products::find()
            .filter(ProdCol::Id.is_in(ids.iter().copied()))
            .order_by_asc(ProdCol::Id)
            .lock(LockType::Update)
            .all(&self.txn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|p| {
                (
                    p.id,
                    LockedProduct {
                        id: p.id,
                        name: p.name,
                        price: p.price,
                        stock: p.stock,
                    },
                )
            })
            .collect())
    }

    async fn decrement_stock(&mut self, product_id: i32, quantity: i32) -> AppResult<()> {
        let result = Products::update_many()
            .col_expr(ProdCol::Stock, Expr::col(ProdCol::Stock).sub(quantity))
            .filter(ProdCol::Id.eq(product_id))
            .filter(ProdCol::Stock.gte(quantity))
            .exec(&self.txn)
            .await?;
        if result.rows_affected != 1 {
            return Err(anyhow!("stock of product {product_id} would go negative").into());
        }
        Ok(())
    }

    async fn insert_transaction(&mut self, total_amount: i64) -> AppResult<TransactionHeader> {
        let header = TransactionActive {
            total_amount: Set(total_amount),
            ..Default::default()
        }
        .insert(&self.txn)
        .await?;
        Ok(TransactionHeader {
            id: header.id,
            created_at: header.created_at.with_timezone(&Utc),
        })
    }

    async fn insert_details(
        &mut self,
        transaction_id: i32,
        lines: &[SaleLine],
    ) -> AppResult<Vec<TransactionDetail>> {
        let mut inserted = Vec::with_capacity(lines.len());
        for line in lines {
            let detail = DetailActive {
                transaction_id: Set(transaction_id),
                product_id: Set(line.product_id),
                product_name: Set(line.product_name.clone()),
                quantity: Set(line.quantity),
                subtotal: Set(line.subtotal),
                ..Default::default()
            }
            .insert(&self.txn)
            .await?;
            inserted.push(detail_from_entity(detail));
        }
        Ok(inserted)
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.txn.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        self.txn.rollback().await?;
        Ok(())
    }
}
