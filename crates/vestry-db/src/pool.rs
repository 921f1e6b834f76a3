//! PostgreSQL connection pool

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Pool handle shared by the repositories
pub type DbPool = PgPool;

/// Connect to `database_url`.
///
/// Profile lookups are short, so the pool stays small and gives up quickly
/// when no connection is free.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}
