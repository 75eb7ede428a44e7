//! Append-only ledger of composed predictions
//!
//! Every composition appends exactly one record. Records are never updated
//! or deleted; ids are monotonically increasing and never reused.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryLedger;
pub use sqlite::SqliteLedger;

use crate::breakdown::{round2, CostBreakdown};
use crate::error::CostError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw request inputs stored alongside each result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryInputs {
    pub region: String,
    pub apartment_size: String,
    pub dining_frequency: u32,
    pub car_type: String,
    pub commute_miles: f64,
}

/// A record about to be appended; the ledger assigns the id
#[derive(Debug, Clone, PartialEq)]
pub struct NewQueryRecord {
    pub inputs: QueryInputs,
    pub breakdown: CostBreakdown,
    total_cost: f64,
    pub timestamp: DateTime<Utc>,
}

impl NewQueryRecord {
    /// The total is always derived from the breakdown
    pub fn new(inputs: QueryInputs, breakdown: CostBreakdown, timestamp: DateTime<Utc>) -> Self {
        Self {
            inputs,
            total_cost: breakdown.total(),
            breakdown,
            timestamp,
        }
    }

    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    fn into_record(self, id: i64) -> QueryRecord {
        QueryRecord {
            id,
            inputs: self.inputs,
            breakdown: self.breakdown,
            total_cost: self.total_cost,
            timestamp: self.timestamp,
        }
    }
}

/// A persisted ledger record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRecord {
    pub id: i64,
    #[serde(flatten)]
    pub inputs: QueryInputs,
    pub breakdown: CostBreakdown,
    pub total_cost: f64,
    pub timestamp: DateTime<Utc>,
}

/// Aggregate statistics over the whole ledger, computed on demand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub total_queries: u64,
    pub queries_by_region: BTreeMap<String, u64>,
    /// Mean total cost rounded to cents, 0 for an empty ledger
    pub average_cost: f64,
}

impl AggregateStats {
    pub(crate) fn from_parts(
        total_queries: u64,
        queries_by_region: BTreeMap<String, u64>,
        cost_sum: f64,
    ) -> Self {
        let average_cost = if total_queries == 0 {
            0.0
        } else {
            round2(cost_sum / total_queries as f64)
        };

        Self {
            total_queries,
            queries_by_region,
            average_cost,
        }
    }
}

/// Append-only store of composed predictions
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Persist a record and return its newly assigned id
    async fn append(&self, record: NewQueryRecord) -> Result<i64, CostError>;

    /// Most recent records first (timestamp desc, then id desc), at most `limit`
    async fn recent(&self, limit: usize) -> Result<Vec<QueryRecord>, CostError>;

    async fn aggregate(&self) -> Result<AggregateStats, CostError>;
}
