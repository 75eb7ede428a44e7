use super::{AggregateStats, Ledger, NewQueryRecord, QueryRecord};
use crate::error::CostError;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// In-process ledger
///
/// Id assignment and the push happen under one write lock, so concurrent
/// appends get distinct ids and readers never see a half-written record.
#[derive(Default)]
pub struct MemoryLedger {
    records: RwLock<Vec<QueryRecord>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn append(&self, record: NewQueryRecord) -> Result<i64, CostError> {
        let mut records = self.records.write().await;
        let id = records.last().map_or(1, |last| last.id + 1);
        records.push(record.into_record(id));
        Ok(id)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<QueryRecord>, CostError> {
        let records = self.records.read().await;

        let mut recent: Vec<QueryRecord> = records.clone();
        recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        recent.truncate(limit);

        Ok(recent)
    }

    async fn aggregate(&self) -> Result<AggregateStats, CostError> {
        let records = self.records.read().await;

        let mut by_region: BTreeMap<String, u64> = BTreeMap::new();
        let mut cost_sum = 0.0;
        for record in records.iter() {
            *by_region.entry(record.inputs.region.clone()).or_default() += 1;
            cost_sum += record.total_cost;
        }

        Ok(AggregateStats::from_parts(
            records.len() as u64,
            by_region,
            cost_sum,
        ))
    }
}
