use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::reports::ReportRangeQuery,
    error::AppResult,
    models::ReportSummary,
    response::ApiResponse,
    services::report_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(report_between))
        .route("/today", get(report_today))
}

#[utoipa::path(
    get,
    path = "/api/report/today",
    responses(
        (status = 200, description = "Summary of today's sales", body = ApiResponse<ReportSummary>)
    ),
    tag = "Reports"
)]
pub async fn report_today(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<ReportSummary>>> {
    let resp = report_service::today(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/report",
    params(ReportRangeQuery),
    responses(
        (status = 200, description = "Summary over an inclusive date range", body = ApiResponse<ReportSummary>),
        (status = 400, description = "Missing or inverted dates"),
    ),
    tag = "Reports"
)]
pub async fn report_between(
    State(state): State<AppState>,
    Query(query): Query<ReportRangeQuery>,
) -> AppResult<Json<ApiResponse<ReportSummary>>> {
    let resp = report_service::between(&state, query).await?;
    Ok(Json(resp))
}
