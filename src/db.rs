use anyhow::{Context, Result};
use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::config::AppConfig;

/// Open the PostgreSQL pool sized from the config.
pub async fn create_pool(config: &AppConfig, database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .min_connections(config.db_min_connections)
        .connect(database_url)
        .await
        .context("failed to connect to PostgreSQL")?;
    Ok(pool)
}

/// Apply the SQL files in `migrations/`, skipping the ones already recorded.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("failed to apply migrations")?;
    Ok(())
}
