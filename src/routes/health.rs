use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    repository::StorageHealth,
    response::{ApiResponse, Meta},
    state::AppState,
};

#[derive(Serialize, ToSchema)]
pub struct HealthData {
    pub status: String,
    pub storage: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "OK", body = ApiResponse<HealthData>),
        (status = 503, description = "Storage unreachable", body = ApiResponse<HealthData>),
    ),
    tag = "Health"
)]
pub async fn health_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<HealthData>>) {
    let storage = state.store.backend().to_string();
    let (status, code) = match state.store.ping().await {
        Ok(()) => ("ok", StatusCode::OK),
        Err(err) => {
            tracing::warn!(error = %err, storage = %storage, "health probe failed");
            ("degraded", StatusCode::SERVICE_UNAVAILABLE)
        }
    };

    let data = HealthData {
        status: status.to_string(),
        storage,
    };
    (
        code,
        Json(ApiResponse::success(
            "Health check",
            data,
            Some(Meta::empty()),
        )),
    )
}

#[derive(Serialize, ToSchema)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    pub docs: String,
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service banner", body = ApiResponse<ServiceInfo>),
    ),
    tag = "Health"
)]
pub async fn root() -> Json<ApiResponse<ServiceInfo>> {
    let data = ServiceInfo {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        docs: "/docs".to_string(),
    };
    Json(ApiResponse::success("Cashier API", data, Some(Meta::empty())))
}
