use crate::config::DatabaseConfig;
use crate::errors::{ComplianceError, ComplianceResult};
use sqlx::{postgres::PgPoolOptions, Executor, PgPool};
use std::time::Duration;

const SCHEMA: &str = include_str!("../schema.sql");

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.url)
        .await?;

    Ok(pool)
}

pub async fn health_check(pool: &PgPool) -> ComplianceResult<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(|e| ComplianceError::Store(format!("Database health check failed: {}", e)))
}

/// Create missing tables and indexes. Idempotent.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    pool.execute(SCHEMA).await?;
    Ok(())
}
