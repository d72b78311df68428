use std::time::Duration;

use anyhow::{bail, Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Tables the gate and the generation endpoints read or write.
const REQUIRED_TABLES: [&str; 5] = [
    "users",
    "ln_payments",
    "jobs",
    "cover_letters",
    "optimized_resumes",
];

/// Creates a PostgreSQL connection pool and checks the schema is in place.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
        .context("Failed to connect to PostgreSQL")?;

    ensure_schema(&pool).await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

async fn ensure_schema(pool: &PgPool) -> Result<()> {
    let missing: Vec<String> = sqlx::query_scalar(
        "SELECT t FROM unnest($1::text[]) AS t WHERE to_regclass(t) IS NULL",
    )
    .bind(&REQUIRED_TABLES[..])
    .fetch_all(pool)
    .await?;

    if !missing.is_empty() {
        bail!(
            "Database is missing tables [{}]; apply the files in migrations/ in order",
            missing.join(", ")
        );
    }
    Ok(())
}
