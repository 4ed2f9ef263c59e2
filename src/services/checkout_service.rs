use std::{collections::HashMap, sync::Arc, time::Duration};

use anyhow::anyhow;

use crate::{
    dto::transactions::{CheckoutItem, CheckoutRequest},
    error::{AppError, AppResult},
    models::Transaction,
    repository::{CheckoutScope, CheckoutStore, LockedProduct, SaleLine},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Turns a checkout request into one committed transaction, or into nothing.
#[derive(Clone)]
pub struct CheckoutEngine {
    store: Arc<dyn CheckoutStore>,
    timeout: Option<Duration>,
}

impl CheckoutEngine {
    pub fn new(store: Arc<dyn CheckoutStore>, timeout: Option<Duration>) -> Self {
        Self { store, timeout }
    }

    #[tracing::instrument(skip_all, fields(items = request.items.len()))]
    pub async fn execute(&self, request: &CheckoutRequest) -> AppResult<Transaction> {
        request.validate()?;
        let lines = merge_lines(&request.items);

        let outcome = self.run(&lines).await;

        match &outcome {
            Ok(transaction) => tracing::info!(
                transaction_id = transaction.id,
                total_amount = transaction.total_amount,
                "checkout committed"
            ),
            Err(err) => tracing::debug!(error = %err, kind = ?err.kind(), "checkout rejected"),
        }
        outcome
    }

    async fn run(&self, lines: &[CheckoutItem]) -> AppResult<Transaction> {
        // The deadline covers staging only; an issued commit is never cut short.
        let staged = match self.timeout {
            // Expiry drops the in-flight unit of work, which rolls it back.
            Some(limit) => tokio::time::timeout(limit, self.stage(lines))
                .await
                .unwrap_or_else(|_| {
                    Err(anyhow!("checkout did not finish within {}ms", limit.as_millis()).into())
                }),
            None => self.stage(lines).await,
        };
        let (scope, transaction) = staged?;
        scope.commit().await?;
        Ok(transaction)
    }

    /// Runs everything up to commit and hands back the still-open scope.
    async fn stage(
        &self,
        lines: &[CheckoutItem],
    ) -> AppResult<(Box<dyn CheckoutScope>, Transaction)> {
        let mut scope = self.store.begin().await?;
        match apply(scope.as_mut(), lines).await {
            Ok(transaction) => Ok((scope, transaction)),
            Err(err) => {
                if let Err(rollback_err) = scope.rollback().await {
                    tracing::warn!(error = %rollback_err, "checkout rollback failed");
                }
                Err(err)
            }
        }
    }
}

/// Steps 3 to 7 of a checkout, all inside `scope`. Nothing here commits.
async fn apply(scope: &mut dyn CheckoutScope, lines: &[CheckoutItem]) -> AppResult<Transaction> {
    let ids: Vec<i32> = lines.iter().map(|l| l.product_id).collect();
    let locked = scope.lock_products(&ids).await?;

    let (sale, total_amount) = price_lines(lines, &locked)?;

    for line in &sale {
        scope.decrement_stock(line.product_id, line.quantity).await?;
    }

    let header = scope.insert_transaction(total_amount).await?;
    let details = scope.insert_details(header.id, &sale).await?;

    Ok(Transaction {
        id: header.id,
        total_amount,
        created_at: header.created_at,
        details,
    })
}

/// Collapses repeated product ids into one line at the first occurrence,
/// summing quantities. Request order is otherwise kept.
pub fn merge_lines(items: &[CheckoutItem]) -> Vec<CheckoutItem> {
    let mut position: HashMap<i32, usize> = HashMap::with_capacity(items.len());
    let mut merged: Vec<CheckoutItem> = Vec::with_capacity(items.len());
    for item in items {
        match position.get(&item.product_id) {
            Some(&at) => {
                merged[at].quantity = merged[at].quantity.saturating_add(item.quantity);
            }
            None => {
                position.insert(item.product_id, merged.len());
                merged.push(*item);
            }
        }
    }
    merged
}

/// Checks every line against the locked rows before anything is written and
/// prices them at the locked price.
pub fn price_lines(
    lines: &[CheckoutItem],
    locked: &HashMap<i32, LockedProduct>,
) -> AppResult<(Vec<SaleLine>, i64)> {
    let mut sale = Vec::with_capacity(lines.len());
    let mut total_amount: i64 = 0;

    for line in lines {
        let product = locked
            .get(&line.product_id)
            .ok_or_else(|| AppError::not_found(format!("product id {} not found", line.product_id)))?;

        if line.quantity > product.stock {
            return Err(AppError::validation(format!(
                "insufficient stock for product {} (available: {}, requested: {})",
                product.name, product.stock, line.quantity
            )));
        }

        let subtotal = product
            .price
            .checked_mul(i64::from(line.quantity))
            .and_then(|s| total_amount.checked_add(s).map(|t| (s, t)));
        let Some((subtotal, running)) = subtotal else {
            return Err(AppError::validation(format!(
                "total for product {} is too large",
                product.name
            )));
        };
        total_amount = running;

        sale.push(SaleLine {
            product_id: product.id,
            product_name: product.name.clone(),
            quantity: line.quantity,
            subtotal,
        });
    }

    Ok((sale, total_amount))
}

pub async fn checkout(
    state: &AppState,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<Transaction>> {
    let transaction = state.checkout.execute(&payload).await?;
    Ok(ApiResponse::success(
        "Checkout success",
        transaction,
        Some(Meta::empty()),
    ))
}
