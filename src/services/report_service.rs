use crate::{
    dto::reports::{ReportRange, ReportRangeQuery},
    error::AppResult,
    models::ReportSummary,
    repository::ReportStore,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn today(state: &AppState) -> AppResult<ApiResponse<ReportSummary>> {
    let summary = state.store.summary(ReportRange::Today).await?;
    Ok(ApiResponse::success("Report today", summary, Some(Meta::empty())))
}

pub async fn between(
    state: &AppState,
    query: ReportRangeQuery,
) -> AppResult<ApiResponse<ReportSummary>> {
    let range = query.into_range()?;
    let summary = state.store.summary(range).await?;
    Ok(ApiResponse::success("Report", summary, Some(Meta::empty())))
}
