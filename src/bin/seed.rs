use anyhow::Context;
use cashier_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    let url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set to seed the database")?;

    let pool = create_pool(&config, url).await?;
    // Ensure migrations are applied.
    run_migrations(&pool).await?;

    let food = ensure_category(&pool, "Makanan", "Makanan instan dan ringan").await?;
    let drinks = ensure_category(&pool, "Minuman", "Minuman kemasan").await?;
    seed_products(&pool, food, drinks).await?;

    println!("Seed completed");
    Ok(())
}

async fn ensure_category(pool: &sqlx::PgPool, name: &str, description: &str) -> anyhow::Result<i32> {
    let existing: Option<(i32,)> = sqlx::query_as("SELECT id FROM categories WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    if let Some((id,)) = existing {
        return Ok(id);
    }

    let (id,): (i32,) = sqlx::query_as(
        "INSERT INTO categories (name, description) VALUES ($1, $2) RETURNING id",
    )
    .bind(name)
    .bind(description)
    .fetch_one(pool)
    .await?;

    println!("Ensured category {name} (id={id})");
    Ok(id)
}

async fn seed_products(pool: &sqlx::PgPool, food: i32, drinks: i32) -> anyhow::Result<()> {
    let products = vec![
        ("Indomie Goreng", 3500_i64, 100_i32, food),
        ("Chitato Sapi Panggang", 11000, 40, food),
        ("Roti Tawar", 16000, 20, food),
        ("Teh Botol Sosro", 5000, 60, drinks),
        ("Kopi Kapal Api", 2000, 150, drinks),
        ("Aqua 600ml", 4000, 80, drinks),
    ];

    let mut inserted = 0;
    for (name, price, stock, category_id) in products {
        let result = sqlx::query(
            r#"
            INSERT INTO products (name, price, stock, active, category_id)
            SELECT $1::TEXT, $2::BIGINT, $3::INT, TRUE, $4::INT
            WHERE NOT EXISTS (SELECT 1 FROM products WHERE name = $1)
            "#,
        )
        .bind(name)
        .bind(price)
        .bind(stock)
        .bind(category_id)
        .execute(pool)
        .await?;
        inserted += result.rows_affected();
    }

    println!("Seeded {inserted} products");
    Ok(())
}
