//! SQLite connection setup shared by the cache and the ledger
//!
//! - WAL mode so readers never block the single writer
//! - Migrations embedded from `./migrations`

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

/// Open a connection pool and run pending migrations
///
/// # Arguments
///
/// * `database_url` - SQLite URL (e.g., "sqlite:./data/livecost.db" or "sqlite::memory:")
/// * `max_connections` - Pool size; forced to 1 for in-memory databases,
///   since every connection would otherwise see its own empty database
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool> {
    let in_memory = is_in_memory(database_url);

    let mut options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("Invalid database URL: {}", database_url))?
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(30))
        .pragma("synchronous", "NORMAL");

    if !in_memory {
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    let mut pool_options = SqlitePoolOptions::new().acquire_timeout(Duration::from_secs(30));
    pool_options = if in_memory {
        // The database lives exactly as long as its one connection
        pool_options
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        pool_options.max_connections(max_connections.max(1))
    };

    let pool = pool_options
        .connect_with(options)
        .await
        .context("Failed to connect to database")?;

    run_migrations(&pool).await?;

    Ok(pool)
}

async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations completed");
    Ok(())
}

/// Cheap liveness probe used by the health endpoint
pub async fn ping(pool: &SqlitePool) -> bool {
    sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(pool)
        .await
        .is_ok()
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}
