use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: i32,
    pub name: String,
    /// Unit price in the smallest currency unit.
    pub price: i64,
    pub stock: i32,
    pub active: bool,
    pub category_id: Option<i32>,
    /// Resolved on reads; absent when unset or when the category is gone.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub category: Option<Category>,
}

/// Committed sale. Append-only: never updated or deleted once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Transaction {
    pub id: i32,
    pub total_amount: i64,
    pub created_at: DateTime<Utc>,
    pub details: Vec<TransactionDetail>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TransactionDetail {
    pub id: i32,
    pub transaction_id: i32,
    pub product_id: i32,
    /// Product name as it was at sale time.
    pub product_name: String,
    pub quantity: i32,
    pub subtotal: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReportSummary {
    pub total_revenue: i64,
    pub total_transaction: i64,
    pub top_product: Option<TopProduct>,
}

impl ReportSummary {
    pub fn empty() -> Self {
        Self {
            total_revenue: 0,
            total_transaction: 0,
            top_product: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TopProduct {
    pub name: String,
    pub sold_qty: i64,
}
