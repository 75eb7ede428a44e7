use super::{CacheEntry, TtlCache};
use crate::clock::{Clock, SystemClock};
use crate::error::CostError;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;

/// In-process TTL cache backed by a `DashMap`
pub struct MemoryCache {
    entries: DashMap<String, CacheEntry>,
    clock: Arc<dyn Clock>,
}

impl MemoryCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

#[async_trait]
impl TtlCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, CostError> {
        let now = self.clock.now();

        match self.entries.get(key) {
            Some(entry) if entry.is_live(now) => return Ok(Some(entry.payload.clone())),
            Some(_) => {}
            None => return Ok(None),
        }

        // Expired. Only drop it if nobody replaced it in the meantime.
        self.entries.remove_if(key, |_, entry| !entry.is_live(now));
        Ok(None)
    }

    async fn set(&self, key: &str, value: serde_json::Value, ttl: Duration) -> Result<(), CostError> {
        let entry = CacheEntry::new(key, value, self.clock.now(), ttl);
        self.entries.insert(key.to_string(), entry);
        Ok(())
    }

    async fn sweep_expired(&self) -> Result<u64, CostError> {
        let now = self.clock.now();
        let mut removed = 0u64;
        self.entries.retain(|_, entry| {
            let live = entry.is_live(now);
            if !live {
                removed += 1;
            }
            live
        });

        tracing::debug!(removed = removed, "Swept in-memory cache");
        Ok(removed)
    }

    async fn len(&self) -> Result<u64, CostError> {
        Ok(self.entries.len() as u64)
    }
}
