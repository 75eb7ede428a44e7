//! Time-to-live keyed cache
//!
//! Entries carry an absolute expiry. An entry is valid while
//! `now < expires_at`; `get` treats anything else as absent and
//! `sweep_expired` deletes exactly those entries, so the two never
//! disagree about a given instant.
//!
//! There is no capacity-based eviction. Expiry is the only removal path.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryCache;
pub use sqlite::SqliteCache;

use crate::error::CostError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default lifetime of a region multiplier entry
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// A stored cache entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(key: &str, payload: serde_json::Value, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            key: key.to_string(),
            payload,
            created_at: now,
            expires_at: now
                .checked_add_signed(ttl_delta(ttl))
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    /// Whether the entry is still served at `now`
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// TTL as a chrono delta, never shorter than one millisecond so that
/// `expires_at > created_at` always holds
pub(crate) fn ttl_delta(ttl: Duration) -> chrono::Duration {
    let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(36_500));
    ttl.max(chrono::Duration::milliseconds(1))
}

/// Key→value store with per-entry absolute expiry
#[async_trait]
pub trait TtlCache: Send + Sync {
    /// Look up a live entry. Expired entries are reported as absent.
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, CostError>;

    /// Insert or replace the entry for `key`, expiring `ttl` from now
    async fn set(&self, key: &str, value: serde_json::Value, ttl: Duration) -> Result<(), CostError>;

    /// Delete every expired entry, returning how many were removed
    async fn sweep_expired(&self) -> Result<u64, CostError>;

    /// Number of entries physically stored, expired ones included
    async fn len(&self) -> Result<u64, CostError>;
}
