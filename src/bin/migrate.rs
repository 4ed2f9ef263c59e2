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
        .context("DATABASE_URL must be set to run migrations")?;
    let pool = create_pool(&config, url).await?;
    run_migrations(&pool).await?;
    println!("Migrations applied");
    Ok(())
}
