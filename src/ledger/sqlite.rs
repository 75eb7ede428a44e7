use super::{AggregateStats, Ledger, NewQueryRecord, QueryInputs, QueryRecord};
use crate::clock::from_millis;
use crate::error::{component, CostError};
use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::collections::BTreeMap;

/// Ledger persisted in the `user_queries` table
///
/// Ids come from `AUTOINCREMENT`, which SQLite never reuses, and each
/// append is a single INSERT.
pub struct SqliteLedger {
    pool: SqlitePool,
}

impl SqliteLedger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn storage_error(err: impl std::fmt::Display) -> CostError {
    CostError::unavailable(component::LEDGER, err)
}

fn record_from_row(row: &SqliteRow) -> Result<QueryRecord, CostError> {
    let breakdown: String = row.try_get("breakdown").map_err(storage_error)?;
    let dining_frequency: i64 = row.try_get("dining_frequency").map_err(storage_error)?;

    Ok(QueryRecord {
        id: row.try_get("id").map_err(storage_error)?,
        inputs: QueryInputs {
            region: row.try_get("region").map_err(storage_error)?,
            apartment_size: row.try_get("apartment_size").map_err(storage_error)?,
            dining_frequency: dining_frequency as u32,
            car_type: row.try_get("car_type").map_err(storage_error)?,
            commute_miles: row.try_get("commute_miles").map_err(storage_error)?,
        },
        breakdown: serde_json::from_str(&breakdown).map_err(storage_error)?,
        total_cost: row.try_get("total_cost").map_err(storage_error)?,
        timestamp: from_millis(row.try_get("timestamp").map_err(storage_error)?),
    })
}

#[async_trait]
impl Ledger for SqliteLedger {
    async fn append(&self, record: NewQueryRecord) -> Result<i64, CostError> {
        let breakdown = serde_json::to_string(&record.breakdown).map_err(storage_error)?;

        let result = sqlx::query(
            "INSERT INTO user_queries
             (region, apartment_size, dining_frequency, car_type, commute_miles,
              total_cost, breakdown, timestamp)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.inputs.region)
        .bind(&record.inputs.apartment_size)
        .bind(record.inputs.dining_frequency as i64)
        .bind(&record.inputs.car_type)
        .bind(record.inputs.commute_miles)
        .bind(record.total_cost())
        .bind(&breakdown)
        .bind(record.timestamp.timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(result.last_insert_rowid())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<QueryRecord>, CostError> {
        let rows = sqlx::query(
            "SELECT id, region, apartment_size, dining_frequency, car_type, commute_miles,
                    total_cost, breakdown, timestamp
             FROM user_queries
             ORDER BY timestamp DESC, id DESC
             LIMIT ?",
        )
        .bind(limit.min(i64::MAX as usize) as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        rows.iter().map(record_from_row).collect()
    }

    async fn aggregate(&self) -> Result<AggregateStats, CostError> {
        // One read transaction so the three reads see the same snapshot
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        let (total, cost_sum): (i64, Option<f64>) =
            sqlx::query_as("SELECT COUNT(*), SUM(total_cost) FROM user_queries")
                .fetch_one(&mut *tx)
                .await
                .map_err(storage_error)?;

        let by_region: Vec<(String, i64)> = sqlx::query_as(
            "SELECT region, COUNT(*) FROM user_queries GROUP BY region",
        )
        .fetch_all(&mut *tx)
        .await
        .map_err(storage_error)?;

        tx.commit().await.map_err(storage_error)?;

        let queries_by_region: BTreeMap<String, u64> = by_region
            .into_iter()
            .map(|(region, count)| (region, count as u64))
            .collect();

        Ok(AggregateStats::from_parts(
            total as u64,
            queries_by_region,
            cost_sum.unwrap_or(0.0),
        ))
    }
}
