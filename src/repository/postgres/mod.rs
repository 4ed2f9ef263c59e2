//! PostgreSQL backend. Row work goes through sea-orm entities; aggregate
//! queries and the health probe use the underlying sqlx pool directly.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{DatabaseConnection, SqlxPostgresConnector};
use sqlx::PgPool;

use crate::{
    entity::{categories, products, transaction_details, transactions},
    error::AppResult,
    models::{Category, Product, Transaction, TransactionDetail},
    repository::StorageHealth,
};

mod catalog;
mod checkout;
mod ledger;

pub use checkout::PostgresCheckoutScope;

#[derive(Clone)]
pub struct PostgresStore {
    orm: DatabaseConnection,
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        let orm = SqlxPostgresConnector::from_sqlx_postgres_pool(pool.clone());
        Self { orm, pool }
    }
}

#[async_trait]
impl StorageHealth for PostgresStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn category_from_entity(model: categories::Model) -> Category {
    Category {
        id: model.id,
        name: model.name,
        description: model.description,
    }
}

fn product_from_entity(model: products::Model, category: Option<categories::Model>) -> Product {
    Product {
        id: model.id,
        name: model.name,
        price: model.price,
        stock: model.stock,
        active: model.active,
        category_id: model.category_id,
        category: category.map(category_from_entity),
    }
}

fn detail_from_entity(model: transaction_details::Model) -> TransactionDetail {
    TransactionDetail {
        id: model.id,
        transaction_id: model.transaction_id,
        product_id: model.product_id,
        product_name: model.product_name,
        quantity: model.quantity,
        subtotal: model.subtotal,
    }
}

fn transaction_from_entity(
    model: transactions::Model,
    details: Vec<transaction_details::Model>,
) -> Transaction {
    Transaction {
        id: model.id,
        total_amount: model.total_amount,
        created_at: model.created_at.with_timezone(&Utc),
        details: details.into_iter().map(detail_from_entity).collect(),
    }
}
