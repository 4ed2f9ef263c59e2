use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};

use crate::{
    dto::transactions::{CheckoutRequest, TransactionList},
    error::AppResult,
    models::Transaction,
    response::ApiResponse,
    routes::params::TransactionQuery,
    services::{checkout_service, transaction_service},
    state::AppState,
};

pub fn checkout_router() -> Router<AppState> {
    Router::new().route("/", post(checkout))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_transactions))
        .route("/{id}", get(get_transaction))
}

#[utoipa::path(
    post,
    path = "/api/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Committed transaction", body = ApiResponse<Transaction>),
        (status = 400, description = "Malformed request or insufficient stock"),
        (status = 404, description = "Unknown product"),
        (status = 500, description = "Storage failure or checkout deadline exceeded"),
    ),
    tag = "Transactions"
)]
pub async fn checkout(
    State(state): State<AppState>,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Transaction>>)> {
    let resp = checkout_service::checkout(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/transactions",
    params(TransactionQuery),
    responses(
        (status = 200, description = "List transactions", body = ApiResponse<TransactionList>)
    ),
    tag = "Transactions"
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<TransactionQuery>,
) -> AppResult<Json<ApiResponse<TransactionList>>> {
    let resp = transaction_service::list_transactions(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/transactions/{id}",
    params(("id" = i32, Path, description = "Transaction ID")),
    responses(
        (status = 200, description = "Transaction with details", body = ApiResponse<Transaction>),
        (status = 404, description = "Transaction not found"),
    ),
    tag = "Transactions"
)]
pub async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Transaction>>> {
    let resp = transaction_service::get_transaction(&state, id).await?;
    Ok(Json(resp))
}
