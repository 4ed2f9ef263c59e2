use crate::{
    dto::categories::{CategoryList, CreateCategoryRequest, UpdateCategoryRequest},
    error::AppResult,
    models::Category,
    repository::CatalogStore,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<CategoryList>> {
    let items = state.store.list_categories().await?;
    let meta = Meta::whole(items.len());
    Ok(ApiResponse::success("Categories", CategoryList { items }, Some(meta)))
}

pub async fn get_category(state: &AppState, id: i32) -> AppResult<ApiResponse<Category>> {
    let category = state.store.find_category(id).await?;
    Ok(ApiResponse::success("Category", category, None))
}

pub async fn create_category(
    state: &AppState,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    let category = payload.validate_for_create()?;
    let category = state.store.create_category(category).await?;
    Ok(ApiResponse::success(
        "Category created",
        category,
        Some(Meta::empty()),
    ))
}

pub async fn update_category(
    state: &AppState,
    id: i32,
    payload: UpdateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    let changes = payload.validate_for_update()?;
    let category = state.store.update_category(id, changes).await?;
    Ok(ApiResponse::success("Updated", category, Some(Meta::empty())))
}

/// Products that pointed at the category keep their `category_id`; reads
/// simply stop resolving it.
pub async fn delete_category(
    state: &AppState,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    state.store.delete_category(id).await?;
    Ok(ApiResponse::acknowledged("Deleted"))
}
