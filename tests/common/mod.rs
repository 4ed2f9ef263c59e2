#![allow(dead_code)]

use cashier_api::{
    dto::{categories::NewCategory, products::NewProduct},
    models::{Category, Product},
    repository::{CatalogStore, memory::MemoryStore},
};

pub async fn add_product(store: &MemoryStore, name: &str, price: i64, stock: i32) -> Product {
    store
        .create_product(NewProduct {
            name: name.to_string(),
            price,
            stock,
            active: true,
            category_id: None,
        })
        .await
        .expect("create product")
}

pub async fn add_category(store: &MemoryStore, name: &str) -> Category {
    store
        .create_category(NewCategory {
            name: name.to_string(),
            description: None,
        })
        .await
        .expect("create category")
}

pub async fn stock_of(store: &MemoryStore, id: i32) -> i32 {
    store.find_product(id).await.expect("product").stock
}
