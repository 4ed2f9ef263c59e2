use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::Transaction,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CheckoutItem {
    pub product_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub items: Vec<CheckoutItem>,
}

impl CheckoutRequest {
    pub fn new(items: impl IntoIterator<Item = (i32, i32)>) -> Self {
        Self {
            items: items
                .into_iter()
                .map(|(product_id, quantity)| CheckoutItem {
                    product_id,
                    quantity,
                })
                .collect(),
        }
    }

    /// Shape check run before any storage access.
    pub fn validate(&self) -> AppResult<()> {
        if self.items.is_empty() {
            return Err(AppError::validation("items cannot be empty"));
        }
        for (i, item) in self.items.iter().enumerate() {
            if item.product_id <= 0 {
                return Err(AppError::validation(format!(
                    "item[{i}] product_id must be positive"
                )));
            }
            if item.quantity <= 0 {
                return Err(AppError::validation(format!(
                    "item[{i}] quantity must be positive"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionList {
    pub items: Vec<Transaction>,
}
