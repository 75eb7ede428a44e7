use super::{CacheEntry, TtlCache};
use crate::clock::{Clock, SystemClock};
use crate::error::{component, CostError};
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;

/// TTL cache persisted in the `api_cache` table
///
/// Timestamps are Unix milliseconds taken from the injected clock rather
/// than SQLite's `datetime('now')`, so lookups and sweeps agree with the
/// in-memory backend to the millisecond.
pub struct SqliteCache {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl SqliteCache {
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    pub fn with_system_clock(pool: SqlitePool) -> Self {
        Self::new(pool, Arc::new(SystemClock))
    }
}

fn storage_error(err: impl std::fmt::Display) -> CostError {
    CostError::unavailable(component::CACHE, err)
}

#[async_trait]
impl TtlCache for SqliteCache {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, CostError> {
        let now = self.clock.now().timestamp_millis();

        let row: Option<String> = sqlx::query_scalar(
            "SELECT response_data FROM api_cache
             WHERE cache_key = ? AND expires_at > ?",
        )
        .bind(key)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        let Some(data) = row else {
            return Ok(None);
        };

        match serde_json::from_str(&data) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                // Treated as a miss; the caller's next set overwrites the row
                tracing::warn!(key = %key, error = %e, "Discarding unreadable cache payload");
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, value: serde_json::Value, ttl: Duration) -> Result<(), CostError> {
        let entry = CacheEntry::new(key, value, self.clock.now(), ttl);
        let data = serde_json::to_string(&entry.payload).map_err(storage_error)?;

        sqlx::query(
            "INSERT INTO api_cache (cache_key, response_data, created_at, expires_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(cache_key) DO UPDATE SET
                response_data = excluded.response_data,
                created_at = excluded.created_at,
                expires_at = excluded.expires_at",
        )
        .bind(&entry.key)
        .bind(&data)
        .bind(entry.created_at.timestamp_millis())
        .bind(entry.expires_at.timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(())
    }

    async fn sweep_expired(&self) -> Result<u64, CostError> {
        let now = self.clock.now().timestamp_millis();

        let result = sqlx::query("DELETE FROM api_cache WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        tracing::debug!(removed = result.rows_affected(), "Swept SQLite cache");
        Ok(result.rows_affected())
    }

    async fn len(&self) -> Result<u64, CostError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM api_cache")
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(count as u64)
    }
}
