use async_trait::async_trait;

use super::MemoryStore;
use crate::{
    dto::{
        categories::{CategoryChanges, NewCategory},
        products::{NewProduct, ProductChanges, ProductFilter},
    },
    error::{AppError, AppResult},
    models::{Category, Product},
    repository::CatalogStore,
};

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn find_product(&self, id: i32) -> AppResult<Product> {
        let state = self.state.read().await;
        state
            .products
            .get(&id)
            .map(|p| state.with_category(p))
            .ok_or_else(|| product_not_found(id))
    }

    async fn list_products(&self, filter: &ProductFilter) -> AppResult<Vec<Product>> {
        let needle = filter
            .name
            .as_deref()
            .filter(|n| !n.is_empty())
            .map(str::to_lowercase);
        let state = self.state.read().await;
        Ok(state
            .products
            .values()
            .filter(|p| match &needle {
                Some(needle) => p.name.to_lowercase().contains(needle),
                None => true,
            })
            .filter(|p| filter.active.is_none_or(|active| p.active == active))
            .map(|p| state.with_category(p))
            .collect())
    }

    async fn create_product(&self, product: NewProduct) -> AppResult<Product> {
        let mut state = self.state.write().await;
        state.last_product_id += 1;
        let created = Product {
            id: state.last_product_id,
            name: product.name,
            price: product.price,
            stock: product.stock,
            active: product.active,
            category_id: product.category_id,
            category: None,
        };
        state.products.insert(created.id, created.clone());
        Ok(state.with_category(&created))
    }

    async fn update_product(&self, id: i32, changes: ProductChanges) -> AppResult<Product> {
        let mut state = self.state.write().await;
        let product = state
            .products
            .get_mut(&id)
            .ok_or_else(|| product_not_found(id))?;
        changes.apply_to(product);
        let updated = product.clone();
        Ok(state.with_category(&updated))
    }

    async fn delete_product(&self, id: i32) -> AppResult<()> {
        let mut state = self.state.write().await;
        state
            .products
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| product_not_found(id))
    }

    async fn find_category(&self, id: i32) -> AppResult<Category> {
        let state = self.state.read().await;
        state
            .categories
            .get(&id)
            .cloned()
            .ok_or_else(|| category_not_found(id))
    }

    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let state = self.state.read().await;
        Ok(state.categories.values().cloned().collect())
    }

    async fn create_category(&self, category: NewCategory) -> AppResult<Category> {
        let mut state = self.state.write().await;
        state.last_category_id += 1;
        let created = Category {
            id: state.last_category_id,
            name: category.name,
            description: category.description,
        };
        state.categories.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_category(&self, id: i32, changes: CategoryChanges) -> AppResult<Category> {
        let mut state = self.state.write().await;
        let category = state
            .categories
            .get_mut(&id)
            .ok_or_else(|| category_not_found(id))?;
        changes.apply_to(category);
        Ok(category.clone())
    }

    async fn delete_category(&self, id: i32) -> AppResult<()> {
        // Products keep their category_id; reads just stop resolving it.
        let mut state = self.state.write().await;
        state
            .categories
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| category_not_found(id))
    }
}

pub(super) fn product_not_found(id: i32) -> AppError {
    AppError::not_found(format!("product id {id} not found"))
}

fn category_not_found(id: i32) -> AppError {
    AppError::not_found(format!("category id {id} not found"))
}
