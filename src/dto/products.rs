use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::Product,
};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub price: i64,
    pub stock: i32,
    #[serde(default = "default_active")]
    pub active: bool,
    pub category_id: Option<i32>,
}

/// Partial update. `category_id: null` detaches the product from its category,
/// while omitting the field leaves it as is.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub price: Option<i64>,
    pub stock: Option<i32>,
    pub active: Option<bool>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<i32>)]
    pub category_id: Option<Option<i32>>,
}

/// Validated product ready for insertion; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub price: i64,
    pub stock: i32,
    pub active: bool,
    pub category_id: Option<i32>,
}

/// Validated set of field changes for an existing product.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub price: Option<i64>,
    pub stock: Option<i32>,
    pub active: Option<bool>,
    pub category_id: Option<Option<i32>>,
}

impl ProductChanges {
    pub fn apply_to(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(active) = self.active {
            product.active = active;
        }
        if let Some(category_id) = self.category_id {
            product.category_id = category_id;
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ProductFilter {
    /// Case-insensitive substring of the product name.
    pub name: Option<String>,
    pub active: Option<bool>,
}

#[derive(Serialize, ToSchema)]
pub struct ProductList {
    pub items: Vec<Product>,
}

impl CreateProductRequest {
    pub fn validate_for_create(self) -> AppResult<NewProduct> {
        let name = check_name(&self.name)?;
        check_price(self.price)?;
        check_stock(self.stock)?;
        check_category(self.category_id)?;
        Ok(NewProduct {
            name,
            price: self.price,
            stock: self.stock,
            active: self.active,
            category_id: self.category_id,
        })
    }
}

impl UpdateProductRequest {
    pub fn validate_for_update(self) -> AppResult<ProductChanges> {
        if self.name.is_none()
            && self.price.is_none()
            && self.stock.is_none()
            && self.active.is_none()
            && self.category_id.is_none()
        {
            return Err(AppError::validation("at least one field must be provided"));
        }
        let name = self.name.as_deref().map(check_name).transpose()?;
        if let Some(price) = self.price {
            check_price(price)?;
        }
        if let Some(stock) = self.stock {
            check_stock(stock)?;
        }
        if let Some(category_id) = self.category_id {
            check_category(category_id)?;
        }
        Ok(ProductChanges {
            name,
            price: self.price,
            stock: self.stock,
            active: self.active,
            category_id: self.category_id,
        })
    }
}

fn default_active() -> bool {
    true
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn check_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::validation("name is required"));
    }
    Ok(name.to_string())
}

fn check_price(price: i64) -> AppResult<()> {
    if price < 0 {
        return Err(AppError::validation("price must not be negative"));
    }
    Ok(())
}

fn check_stock(stock: i32) -> AppResult<()> {
    if stock < 0 {
        return Err(AppError::validation("stock must not be negative"));
    }
    Ok(())
}

fn check_category(category_id: Option<i32>) -> AppResult<()> {
    match category_id {
        Some(id) if id <= 0 => Err(AppError::validation("category_id must be positive")),
        _ => Ok(()),
    }
}
