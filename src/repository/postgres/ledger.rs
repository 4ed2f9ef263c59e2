use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};

use super::{PostgresStore, transaction_from_entity};
use crate::{
    dto::reports::ReportRange,
    entity::{
        transaction_details::{Column as DetailCol, Entity as TransactionDetails},
        transactions::{Column as TxCol, Entity as Transactions},
    },
    error::{AppError, AppResult},
    models::{ReportSummary, TopProduct, Transaction},
    repository::{PageRequest, ReportStore, TransactionStore},
};

// A NULL bound means "today" by the database clock.
const TOTALS_SQL: &str = r#"
    SELECT COALESCE(SUM(total_amount), 0)::BIGINT, COUNT(*)
    FROM transactions
    WHERE DATE(created_at) BETWEEN COALESCE($1::DATE, CURRENT_DATE)
                               AND COALESCE($2::DATE, CURRENT_DATE)
"#;

// Name: current catalog name, or the newest snapshot once the product is gone.
const TOP_PRODUCT_SQL: &str = r#"
    SELECT COALESCE(MAX(p.name), (ARRAY_AGG(td.product_name ORDER BY td.id DESC))[1]) AS name,
           SUM(td.quantity)::BIGINT AS sold_qty
    FROM transaction_details td
    JOIN transactions t ON t.id = td.transaction_id
    LEFT JOIN products p ON p.id = td.product_id
    WHERE DATE(t.created_at) BETWEEN COALESCE($1::DATE, CURRENT_DATE)
                                 AND COALESCE($2::DATE, CURRENT_DATE)
    GROUP BY td.product_id
    ORDER BY sold_qty DESC, td.product_id ASC
    LIMIT 1
"#;

#[async_trait]
impl TransactionStore for PostgresStore {
    async fn find_transaction(&self, id: i32) -> AppResult<Transaction> {
        let header = Transactions::find_by_id(id).one(&self.orm).await?;
        let header = match header {
            Some(t) => t,
            None => {
                return Err(AppError::not_found(format!("transaction id {id} not found")));
            }
        };

        let details = TransactionDetails::find()
            .filter(DetailCol::TransactionId.eq(header.id))
            .order_by_asc(DetailCol::Id)
            .all(&self.orm)
            .await?;

        Ok(transaction_from_entity(header, details))
    }

    async fn list_transactions(&self, page: PageRequest) -> AppResult<(Vec<Transaction>, i64)> {
        let mut finder = Transactions::find();
        finder = if page.newest_first {
            finder.order_by_desc(TxCol::Id)
        } else {
            finder.order_by_asc(TxCol::Id)
        };

        let total = finder.clone().count(&self.orm).await? as i64;
        let headers = finder
            .limit(page.limit)
            .offset(page.offset)
            .all(&self.orm)
            .await?;

        let ids: Vec<i32> = headers.iter().map(|t| t.id).collect();
        let mut details_by_tx: HashMap<i32, Vec<_>> = HashMap::new();
        if !ids.is_empty() {
            for detail in TransactionDetails::find()
                .filter(DetailCol::TransactionId.is_in(ids))
                .order_by_asc(DetailCol::Id)
                .all(&self.orm)
                .await?
            {
                details_by_tx
                    .entry(detail.transaction_id)
                    .or_default()
                    .push(detail);
            }
        }

        let items = headers
            .into_iter()
            .map(|t| {
                let details = details_by_tx.remove(&t.id).unwrap_or_default();
                transaction_from_entity(t, details)
            })
            .collect();
        Ok((items, total))
    }
}

#[async_trait]
impl ReportStore for PostgresStore {
    async fn summary(&self, range: ReportRange) -> AppResult<ReportSummary> {
        let (start, end): (Option<NaiveDate>, Option<NaiveDate>) = match range {
            ReportRange::Today => (None, None),
            ReportRange::Between { start, end } => (Some(start), Some(end)),
        };

        let (total_revenue, total_transaction): (i64, i64) = sqlx::query_as(TOTALS_SQL)
            .bind(start)
            .bind(end)
            .fetch_one(&self.pool)
            .await?;

        let top: Option<(String, i64)> = sqlx::query_as(TOP_PRODUCT_SQL)
            .bind(start)
            .bind(end)
            .fetch_optional(&self.pool)
            .await?;

        Ok(ReportSummary {
            total_revenue,
            total_transaction,
            top_product: top.map(|(name, sold_qty)| TopProduct { name, sold_qty }),
        })
    }
}
