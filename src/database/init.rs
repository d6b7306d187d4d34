//! Connection pool setup and embedded migrations.

use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};

/// Alias used throughout the application for the shared connection pool.
pub type DbPool = Pool<Postgres>;

/// Connect and bring the schema up to date. Called once at startup;
/// failure is fatal to the process.
pub async fn connect(database_url: &str) -> Result<DbPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(8)
        .connect(database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}
