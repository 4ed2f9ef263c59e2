use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::Category,
};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl CategoryChanges {
    pub fn apply_to(&self, category: &mut Category) {
        if let Some(name) = &self.name {
            category.name = name.clone();
        }
        if let Some(description) = &self.description {
            category.description = Some(description.clone());
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct CategoryList {
    pub items: Vec<Category>,
}

impl CreateCategoryRequest {
    pub fn validate_for_create(self) -> AppResult<NewCategory> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::validation("name is required"));
        }
        Ok(NewCategory {
            name: name.to_string(),
            description: self.description,
        })
    }
}

impl UpdateCategoryRequest {
    pub fn validate_for_update(self) -> AppResult<CategoryChanges> {
        if self.name.is_none() && self.description.is_none() {
            return Err(AppError::validation("at least one field must be provided"));
        }
        let name = match self.name {
            Some(name) if name.trim().is_empty() => {
                return Err(AppError::validation("name must not be blank"));
            }
            Some(name) => Some(name.trim().to_string()),
            None => None,
        };
        Ok(CategoryChanges {
            name,
            description: self.description,
        })
    }
}
