use async_trait::async_trait;

use super::MemoryStore;
use crate::{
    dto::reports::ReportRange,
    error::{AppError, AppResult},
    models::{ReportSummary, Transaction},
    repository::{PageRequest, ReportStore, TransactionStore, top_product},
};

#[async_trait]
impl TransactionStore for MemoryStore {
    async fn find_transaction(&self, id: i32) -> AppResult<Transaction> {
        let state = self.state.read().await;
        state
            .transactions
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("transaction id {id} not found")))
    }

    async fn list_transactions(&self, page: PageRequest) -> AppResult<(Vec<Transaction>, i64)> {
        let state = self.state.read().await;
        let total = state.transactions.len() as i64;
        let offset = usize::try_from(page.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit).unwrap_or(usize::MAX);
        let items = if page.newest_first {
            state
                .transactions
                .iter()
                .rev()
                .skip(offset)
                .take(limit)
                .cloned()
                .collect()
        } else {
            state
                .transactions
                .iter()
                .skip(offset)
                .take(limit)
                .cloned()
                .collect()
        };
        Ok((items, total))
    }
}

#[async_trait]
impl ReportStore for MemoryStore {
    async fn summary(&self, range: ReportRange) -> AppResult<ReportSummary> {
        let (start, end) = match range {
            ReportRange::Today => {
                let today = self.now().date_naive();
                (today, today)
            }
            ReportRange::Between { start, end } => (start, end),
        };

        let state = self.state.read().await;
        let in_range: Vec<&Transaction> = state
            .transactions
            .iter()
            .filter(|t| {
                let day = t.created_at.date_naive();
                start <= day && day <= end
            })
            .collect();

        if in_range.is_empty() {
            return Ok(ReportSummary::empty());
        }

        let top = top_product(in_range.iter().copied().flat_map(|t| t.details.iter()), |id| {
            state.products.get(&id).map(|p| p.name.clone())
        });

        Ok(ReportSummary {
            total_revenue: in_range
                .iter()
                .fold(0_i64, |sum, t| sum.saturating_add(t.total_amount)),
            total_transaction: in_range.len() as i64,
            top_product: top,
        })
    }
}
