//! Deployment Ledger: sqlx/Postgres models and repositories.
//!
//! Every tenant-scoped repository method takes the `creator_id` and applies
//! it inside the SQL predicate, so cross-tenant reads and writes are
//! impossible by construction rather than by caller discipline.

pub mod models;
pub mod repositories;

use sqlx::postgres::PgPoolOptions;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Cheap liveness probe for startup and health endpoints.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
