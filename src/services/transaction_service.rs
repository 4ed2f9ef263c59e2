use crate::{
    dto::transactions::TransactionList,
    error::AppResult,
    models::Transaction,
    response::{ApiResponse, Meta},
    repository::{PageRequest, TransactionStore},
    routes::params::{SortOrder, TransactionQuery},
    state::AppState,
};

pub async fn list_transactions(
    state: &AppState,
    query: TransactionQuery,
) -> AppResult<ApiResponse<TransactionList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let newest_first = !matches!(query.sort_order, Some(SortOrder::Asc));

    let (items, total) = state
        .store
        .list_transactions(PageRequest {
            limit: limit as u64,
            offset: offset as u64,
            newest_first,
        })
        .await?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Transactions",
        TransactionList { items },
        Some(meta),
    ))
}

pub async fn get_transaction(state: &AppState, id: i32) -> AppResult<ApiResponse<Transaction>> {
    let transaction = state.store.find_transaction(id).await?;
    Ok(ApiResponse::success("Transaction", transaction, Some(Meta::empty())))
}
