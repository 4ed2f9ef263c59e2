use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
    sea_query::{Expr, LikeExpr, extension::postgres::PgExpr},
};

use super::{PostgresStore, category_from_entity, product_from_entity};
use crate::{
    dto::{
        categories::{CategoryChanges, NewCategory},
        products::{NewProduct, ProductChanges, ProductFilter},
    },
    entity::{
        categories::{ActiveModel as CategoryActive, Column as CatCol, Entity as Categories},
        products::{ActiveModel as ProductActive, Column as ProdCol, Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    models::{Category, Product},
    repository::CatalogStore,
};

impl PostgresStore {
    async fn resolve_category(&self, model: ProductModel) -> AppResult<Product> {
        let category = match model.category_id {
            Some(category_id) => Categories::find_by_id(category_id).one(&self.orm).await?,
            None => None,
        };
        Ok(product_from_entity(model, category))
    }
}

#[async_trait]
impl CatalogStore for PostgresStore {
    async fn find_product(&self, id: i32) -> AppResult<Product> {
        let found = Products::find_by_id(id)
            .find_also_related(Categories)
            .one(&self.orm)
            .await?;
        match found {
            Some((product, category)) => Ok(product_from_entity(product, category)),
            None => Err(product_not_found(id)),
        }
    }

    async fn list_products(&self, filter: &ProductFilter) -> AppResult<Vec<Product>> {
        let mut condition = Condition::all();
        if let Some(name) = filter.name.as_ref().filter(|n| !n.is_empty()) {
            condition = condition.add(Expr::col(ProdCol::Name).ilike(contains_pattern(name)));
        }
        if let Some(active) = filter.active {
            condition = condition.add(ProdCol::Active.eq(active));
        }

        let rows = Products::find()
            .filter(condition)
            .find_also_related(Categories)
            .order_by_asc(ProdCol::Id)
            .all(&self.orm)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(product, category)| product_from_entity(product, category))
            .collect())
    }

    async fn create_product(&self, product: NewProduct) -> AppResult<Product> {
        let created = ProductActive {
            name: Set(product.name),
            price: Set(product.price),
            stock: Set(product.stock),
            active: Set(product.active),
            category_id: Set(product.category_id),
            ..Default::default()
        }
        .insert(&self.orm)
        .await?;
        self.resolve_category(created).await
    }

    async fn update_product(&self, id: i32, changes: ProductChanges) -> AppResult<Product> {
        let existing = Products::find_by_id(id).one(&self.orm).await?;
        let existing = match existing {
            Some(p) => p,
            None => return Err(product_not_found(id)),
        };

        let mut active: ProductActive = existing.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(price) = changes.price {
            active.price = Set(price);
        }
        if let Some(stock) = changes.stock {
            active.stock = Set(stock);
        }
        if let Some(flag) = changes.active {
            active.active = Set(flag);
        }
        if let Some(category_id) = changes.category_id {
            active.category_id = Set(category_id);
        }

        let updated = active.update(&self.orm).await?;
        self.resolve_category(updated).await
    }

    async fn delete_product(&self, id: i32) -> AppResult<()> {
        let result = Products::delete_by_id(id).exec(&self.orm).await?;
        if result.rows_affected == 0 {
            return Err(product_not_found(id));
        }
        Ok(())
    }

    async fn find_category(&self, id: i32) -> AppResult<Category> {
        Categories::find_by_id(id)
            .one(&self.orm)
            .await?
            .map(category_from_entity)
            .ok_or_else(|| category_not_found(id))
    }

    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        Ok(Categories::find()
            .order_by_asc(CatCol::Id)
            .all(&self.orm)
            .await?
            .into_iter()
            .map(category_from_entity)
            .collect())
    }

    async fn create_category(&self, category: NewCategory) -> AppResult<Category> {
        let created = CategoryActive {
            name: Set(category.name),
            description: Set(category.description),
            ..Default::default()
        }
        .insert(&self.orm)
        .await?;
        Ok(category_from_entity(created))
    }

    async fn update_category(&self, id: i32, changes: CategoryChanges) -> AppResult<Category> {
        let existing = Categories::find_by_id(id).one(&self.orm).await?;
        let existing = match existing {
            Some(c) => c,
            None => return Err(category_not_found(id)),
        };

        let mut active: CategoryActive = existing.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(description) = changes.description {
            active.description = Set(Some(description));
        }
        let updated = active.update(&self.orm).await?;
        Ok(category_from_entity(updated))
    }

    async fn delete_category(&self, id: i32) -> AppResult<()> {
        let result = Categories::delete_by_id(id).exec(&self.orm).await?;
        if result.rows_affected == 0 {
            return Err(category_not_found(id));
        }
        Ok(())
    }
}

/// `%name%` with LIKE metacharacters in `name` matched literally.
fn contains_pattern(name: &str) -> LikeExpr {
    let mut escaped = String::with_capacity(name.len() + 2);
    escaped.push('%');
    for c in name.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    LikeExpr::new(escaped).escape('\\')
}

fn product_not_found(id: i32) -> AppError {
    AppError::not_found(format!("product id {id} not found"))
}

fn category_not_found(id: i32) -> AppError {
    AppError::not_found(format!("category id {id} not found"))
}
