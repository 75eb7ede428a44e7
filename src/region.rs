//! Region cost multipliers
//!
//! Multipliers come from a compiled-in table and are cached under
//! `region_costs_<region>` for the configured TTL, so repeated lookups for
//! the same region inside one window never recompute.

use crate::cache::{TtlCache, DEFAULT_TTL};
use crate::error::{component, CostError};
use crate::metrics;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Scaling factors applied to the baseline cost categories
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionMultiplierSet {
    pub rent: f64,
    pub food: f64,
    pub transport: f64,
    pub utilities: f64,
}

impl RegionMultiplierSet {
    /// Multipliers applied to regions missing from the table
    pub const NEUTRAL: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(rent: f64, food: f64, transport: f64, utilities: f64) -> Self {
        Self {
            rent,
            food,
            transport,
            utilities,
        }
    }

    fn is_valid(&self) -> bool {
        [self.rent, self.food, self.transport, self.utilities]
            .iter()
            .all(|m| m.is_finite() && *m > 0.0)
    }
}

const REGION_TABLE: [(&str, RegionMultiplierSet); 10] = [
    ("NYC", RegionMultiplierSet::new(1.4, 1.3, 1.2, 1.1)),
    ("LA", RegionMultiplierSet::new(1.2, 1.15, 1.3, 1.0)),
    ("Chicago", RegionMultiplierSet::new(0.95, 1.0, 0.9, 1.05)),
    ("Austin", RegionMultiplierSet::new(0.9, 0.95, 1.0, 0.9)),
    ("Miami", RegionMultiplierSet::new(1.05, 1.1, 1.0, 1.0)),
    ("Seattle", RegionMultiplierSet::new(1.15, 1.1, 1.05, 0.95)),
    ("Boston", RegionMultiplierSet::new(1.25, 1.15, 1.0, 1.1)),
    ("Denver", RegionMultiplierSet::new(0.95, 1.0, 1.05, 0.95)),
    ("Dallas", RegionMultiplierSet::new(0.85, 0.9, 1.1, 0.85)),
    ("Phoenix", RegionMultiplierSet::new(0.8, 0.85, 1.15, 1.0)),
];

/// Region identifiers present in the static table
pub fn known_regions() -> Vec<&'static str> {
    REGION_TABLE.iter().map(|(name, _)| *name).collect()
}

fn table_entry(region: &str) -> Option<RegionMultiplierSet> {
    REGION_TABLE
        .iter()
        .find(|(name, _)| *name == region)
        .map(|(_, set)| *set)
}

/// Table lookup, falling back to neutral multipliers
pub fn lookup(region: &str) -> RegionMultiplierSet {
    table_entry(region).unwrap_or(RegionMultiplierSet::NEUTRAL)
}

pub fn cache_key(region: &str) -> String {
    format!("region_costs_{}", region)
}

/// Resolves regions to multiplier sets through the TTL cache
#[derive(Clone)]
pub struct RegionCostProvider {
    cache: Arc<dyn TtlCache>,
    ttl: Duration,
}

impl RegionCostProvider {
    pub fn new(cache: Arc<dyn TtlCache>) -> Self {
        Self::with_ttl(cache, DEFAULT_TTL)
    }

    pub fn with_ttl(cache: Arc<dyn TtlCache>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    pub fn cache(&self) -> &Arc<dyn TtlCache> {
        &self.cache
    }

    pub async fn resolve(&self, region: &str) -> Result<RegionMultiplierSet, CostError> {
        let key = cache_key(region);

        if let Some(payload) = self.cache.get(&key).await? {
            match serde_json::from_value::<RegionMultiplierSet>(payload) {
                Ok(set) if set.is_valid() => {
                    tracing::debug!(region = %region, "Region cost cache hit");
                    metrics::record_region_cache(true);
                    return Ok(set);
                }
                _ => {
                    tracing::warn!(region = %region, "Discarding unreadable cached region costs");
                }
            }
        }

        tracing::debug!(region = %region, "Region cost cache miss");
        metrics::record_region_cache(false);

        let set = table_entry(region).unwrap_or_else(|| {
            tracing::debug!(region = %region, "Unknown region, using neutral multipliers");
            RegionMultiplierSet::NEUTRAL
        });

        let payload = serde_json::to_value(set)
            .map_err(|e| CostError::unavailable(component::REGION, e))?;
        self.cache.set(&key, payload, self.ttl).await?;

        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::clock::{from_millis, ManualClock};
    use async_trait::async_trait;
    use serde_json::json;

    fn create_provider() -> (RegionCostProvider, Arc<MemoryCache>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(from_millis(1_700_000_000_000)));
        let cache = Arc::new(MemoryCache::new(clock.clone()));
        (RegionCostProvider::new(cache.clone()), cache, clock)
    }

    #[test]
    fn test_table_has_ten_regions() {
        let regions = known_regions();
        assert_eq!(regions.len(), 10);
        assert!(regions.contains(&"Austin"));
        assert!(REGION_TABLE.iter().all(|(_, set)| set.is_valid()));
    }

    #[tokio::test]
    async fn test_resolve_known_region_and_cache() {
        let (provider, cache, _) = create_provider();

        let set = provider.resolve("Austin").await.unwrap();
        assert_eq!(set, RegionMultiplierSet::new(0.9, 0.95, 1.0, 0.9));

        let cached = cache.get("region_costs_Austin").await.unwrap().unwrap();
        assert_eq!(cached, json!({"rent": 0.9, "food": 0.95, "transport": 1.0, "utilities": 0.9}));
    }

    #[tokio::test]
    async fn test_unknown_region_is_neutral_and_cached() {
        let (provider, cache, clock) = create_provider();

        assert_eq!(provider.resolve("Mars").await.unwrap(), RegionMultiplierSet::NEUTRAL);
        assert!(cache.get("region_costs_Mars").await.unwrap().is_some());

        // Still cached just before the default TTL runs out
        clock.advance(chrono::Duration::hours(23));
        assert!(cache.get("region_costs_Mars").await.unwrap().is_some());
        clock.advance(chrono::Duration::hours(1));
        assert!(cache.get("region_costs_Mars").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cache_hit_returns_cached_payload_unchanged() {
        let (provider, cache, _) = create_provider();
        cache
            .set(
                "region_costs_NYC",
                json!({"rent": 2.0, "food": 2.0, "transport": 2.0, "utilities": 2.0}),
                Duration::from_secs(60),
            )
            .await
            .unwrap();

        let set = provider.resolve("NYC").await.unwrap();
        assert_eq!(set, RegionMultiplierSet::new(2.0, 2.0, 2.0, 2.0));
    }

    #[tokio::test]
    async fn test_unreadable_payload_is_recomputed() {
        let (provider, cache, _) = create_provider();
        cache
            .set("region_costs_LA", json!("garbage"), Duration::from_secs(60))
            .await
            .unwrap();

        let set = provider.resolve("LA").await.unwrap();
        assert_eq!(set, RegionMultiplierSet::new(1.2, 1.15, 1.3, 1.0));
    }

    struct BrokenCache;

    #[async_trait]
    impl TtlCache for BrokenCache {
        async fn get(&self, _key: &str) -> Result<Option<serde_json::Value>, CostError> {
            Err(CostError::unavailable(component::CACHE, "database is locked"))
        }

        async fn set(&self, _key: &str, _value: serde_json::Value, _ttl: Duration) -> Result<(), CostError> {
            Err(CostError::unavailable(component::CACHE, "database is locked"))
        }

        async fn sweep_expired(&self) -> Result<u64, CostError> {
            Ok(0)
        }

        async fn len(&self) -> Result<u64, CostError> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn test_cache_failure_is_dependency_unavailable() {
        let provider = RegionCostProvider::new(Arc::new(BrokenCache));
        let err = provider.resolve("NYC").await.unwrap_err();
        assert_eq!(err.component(), component::CACHE);
    }
}
