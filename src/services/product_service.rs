use crate::{
    dto::products::{CreateProductRequest, ProductFilter, ProductList, UpdateProductRequest},
    error::AppResult,
    models::Product,
    repository::CatalogStore,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_products(
    state: &AppState,
    filter: ProductFilter,
) -> AppResult<ApiResponse<ProductList>> {
    let items = state.store.list_products(&filter).await?;
    let meta = Meta::whole(items.len());
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

pub async fn get_product(state: &AppState, id: i32) -> AppResult<ApiResponse<Product>> {
    let product = state.store.find_product(id).await?;
    Ok(ApiResponse::success("Product", product, None))
}

pub async fn create_product(
    state: &AppState,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let product = payload.validate_for_create()?;
    let product = state.store.create_product(product).await?;
    tracing::debug!(product_id = product.id, "product created");
    Ok(ApiResponse::success(
        "Product created",
        product,
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    id: i32,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let changes = payload.validate_for_update()?;
    let product = state.store.update_product(id, changes).await?;
    Ok(ApiResponse::success("Updated", product, Some(Meta::empty())))
}

pub async fn delete_product(
    state: &AppState,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    state.store.delete_product(id).await?;
    tracing::debug!(product_id = id, "product deleted");
    Ok(ApiResponse::acknowledged("Deleted"))
}
