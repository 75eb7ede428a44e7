//! Prediction composition
//!
//! Merges the regression model's four category estimates, the lifestyle
//! lookup tables and the region multipliers into an itemized monthly
//! breakdown, then appends the result to the ledger.
//!
//! The ledger append is the commit point and the last await of
//! [`Composer::compose`]: any failure, or dropping the future before the
//! append, leaves nothing behind.

use crate::breakdown::{round2, CostBreakdown};
use crate::clock::{Clock, SystemClock};
use crate::error::CostError;
use crate::ledger::{AggregateStats, Ledger, NewQueryRecord, QueryInputs, QueryRecord};
use crate::lifestyle::LifestyleSelections;
use crate::metrics;
use crate::model::{CategoryEstimates, FeatureEncoder, RegressionModel};
use crate::region::{RegionCostProvider, RegionMultiplierSet};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Confidence label derived from the model's R²
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    /// `> 0.90` High, `> 0.75` Medium, otherwise Low
    pub fn from_r_squared(r_squared: f64) -> Self {
        if r_squared > 0.90 {
            Confidence::High
        } else if r_squared > 0.75 {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "High",
            Confidence::Medium => "Medium",
            Confidence::Low => "Low",
        }
    }
}

/// Everything a caller supplies for one prediction
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRequest {
    pub inputs: QueryInputs,
    pub lifestyle: LifestyleSelections,
}

/// Itemized result of one composition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub breakdown: CostBreakdown,
    pub total_cost: f64,
    pub confidence: Confidence,
}

/// A composed prediction together with its ledger record
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedPrediction {
    pub result: PredictionResult,
    pub record_id: i64,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Scale model estimates and lifestyle baselines by region multipliers
///
/// Each category is rounded to cents on its own; the four lifestyle
/// categories borrow the `food` (entertainment, groceries) and `utilities`
/// (fitness, healthcare) multipliers.
pub fn merge_breakdown(
    estimates: &CategoryEstimates,
    lifestyle: &LifestyleSelections,
    multipliers: &RegionMultiplierSet,
) -> CostBreakdown {
    CostBreakdown {
        rent: round2(estimates.rent * multipliers.rent),
        food: round2(estimates.food * multipliers.food),
        transportation: round2(estimates.transportation * multipliers.transport),
        utilities: round2(estimates.utilities * multipliers.utilities),
        entertainment: round2(lifestyle.entertainment.monthly_cost() * multipliers.food),
        groceries: round2(lifestyle.groceries.monthly_cost() * multipliers.food),
        fitness: round2(lifestyle.fitness.monthly_cost() * multipliers.utilities),
        healthcare: round2(lifestyle.healthcare.monthly_cost() * multipliers.utilities),
    }
}

/// Composes predictions and records them in the ledger
pub struct Composer {
    regions: RegionCostProvider,
    model: Arc<dyn RegressionModel>,
    encoder: FeatureEncoder,
    ledger: Arc<dyn Ledger>,
    clock: Arc<dyn Clock>,
}

impl Composer {
    pub fn new(
        regions: RegionCostProvider,
        model: Arc<dyn RegressionModel>,
        encoder: FeatureEncoder,
        ledger: Arc<dyn Ledger>,
    ) -> Self {
        Self {
            regions,
            model,
            encoder,
            ledger,
            clock: Arc::new(SystemClock),
        }
    }

    /// Use `clock` for record timestamps
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn model(&self) -> &Arc<dyn RegressionModel> {
        &self.model
    }

    pub fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    pub fn regions(&self) -> &RegionCostProvider {
        &self.regions
    }

    /// Confidence every prediction currently receives
    pub fn confidence(&self) -> Confidence {
        Confidence::from_r_squared(self.model.r_squared())
    }

    pub async fn compose(&self, request: &PredictionRequest) -> Result<ComposedPrediction, CostError> {
        let start = Instant::now();
        let region = request.inputs.region.as_str();

        let outcome = self.compose_inner(request).await;
        match &outcome {
            Ok(composed) => {
                tracing::info!(
                    region = %region,
                    query_id = composed.record_id,
                    total_cost = composed.result.total_cost,
                    confidence = composed.result.confidence.as_str(),
                    "Prediction composed"
                );
                metrics::record_prediction(composed.result.confidence.as_str(), start.elapsed());
            }
            Err(e) => {
                tracing::error!(region = %region, error = %e, "Composition failed");
                metrics::record_composition_failure(e.component());
            }
        }

        outcome
    }

    async fn compose_inner(&self, request: &PredictionRequest) -> Result<ComposedPrediction, CostError> {
        let multipliers = self.regions.resolve(&request.inputs.region).await?;

        let features = self.encoder.encode(&request.inputs);
        let estimates = self.model.predict(&features).await?.validate()?;

        let breakdown = merge_breakdown(&estimates, &request.lifestyle, &multipliers);
        let timestamp = self.clock.now();
        let record = NewQueryRecord::new(request.inputs.clone(), breakdown, timestamp);

        let result = PredictionResult {
            breakdown,
            total_cost: record.total_cost(),
            confidence: self.confidence(),
        };

        let record_id = self.ledger.append(record).await?;

        Ok(ComposedPrediction {
            result,
            record_id,
            timestamp,
        })
    }

    pub async fn recent_queries(&self, limit: usize) -> Result<Vec<QueryRecord>, CostError> {
        self.ledger.recent(limit).await
    }

    pub async fn statistics(&self) -> Result<AggregateStats, CostError> {
        self.ledger.aggregate().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MemoryCache, TtlCache};
    use crate::error::component;
    use crate::ledger::MemoryLedger;
    use crate::lifestyle::{Entertainment, Fitness, Groceries, Healthcare};
    use crate::model::FeatureVector;
    use async_trait::async_trait;
    use std::time::Duration;

    struct FixedModel {
        estimates: CategoryEstimates,
        r_squared: f64,
    }

    #[async_trait]
    impl RegressionModel for FixedModel {
        fn name(&self) -> &str {
            "fixed"
        }

        fn r_squared(&self) -> f64 {
            self.r_squared
        }

        async fn predict(&self, _features: &FeatureVector) -> Result<CategoryEstimates, CostError> {
            Ok(self.estimates)
        }
    }

    struct DownModel;

    #[async_trait]
    impl RegressionModel for DownModel {
        fn name(&self) -> &str {
            "down"
        }

        fn r_squared(&self) -> f64 {
            0.95
        }

        async fn predict(&self, _features: &FeatureVector) -> Result<CategoryEstimates, CostError> {
            Err(CostError::unavailable(component::MODEL, "connection refused"))
        }
    }

    /// Never answers, like a remote model stuck mid-request
    struct HangingModel;

    #[async_trait]
    impl RegressionModel for HangingModel {
        fn name(&self) -> &str {
            "hanging"
        }

        fn r_squared(&self) -> f64 {
            0.8
        }

        async fn predict(&self, _features: &FeatureVector) -> Result<CategoryEstimates, CostError> {
            std::future::pending().await
        }
    }

    struct LockedCache;

    #[async_trait]
    impl TtlCache for LockedCache {
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

    const ESTIMATES: CategoryEstimates = CategoryEstimates {
        rent: 1500.0,
        food: 400.0,
        transportation: 150.0,
        utilities: 120.0,
    };

    fn austin_lifestyle() -> LifestyleSelections {
        LifestyleSelections {
            entertainment: Entertainment::Moderate,
            groceries: Groceries::Budget,
            fitness: Fitness::None,
            healthcare: Healthcare::Standard,
        }
    }

    fn request(region: &str) -> PredictionRequest {
        PredictionRequest {
            inputs: QueryInputs {
                region: region.to_string(),
                apartment_size: "1BR".to_string(),
                dining_frequency: 3,
                car_type: "sedan".to_string(),
                commute_miles: 10.0,
            },
            lifestyle: austin_lifestyle(),
        }
    }

    fn create_composer(model: Arc<dyn RegressionModel>) -> (Composer, Arc<MemoryLedger>) {
        let ledger = Arc::new(MemoryLedger::new());
        let regions = RegionCostProvider::new(Arc::new(MemoryCache::default()));
        let composer = Composer::new(regions, model, FeatureEncoder::default(), ledger.clone());
        (composer, ledger)
    }

    #[test]
    fn test_confidence_step_function() {
        assert_eq!(Confidence::from_r_squared(0.95), Confidence::High);
        assert_eq!(Confidence::from_r_squared(0.80), Confidence::Medium);
        assert_eq!(Confidence::from_r_squared(0.50), Confidence::Low);
        assert_eq!(Confidence::from_r_squared(0.90), Confidence::Medium);
        assert_eq!(Confidence::from_r_squared(0.75), Confidence::Low);
    }

    #[test]
    fn test_merge_breakdown_austin() {
        let multipliers = RegionMultiplierSet::new(0.9, 0.95, 1.0, 0.9);
        let breakdown = merge_breakdown(&ESTIMATES, &austin_lifestyle(), &multipliers);

        assert_eq!(
            breakdown,
            CostBreakdown {
                rent: 1350.0,
                food: 380.0,
                transportation: 150.0,
                utilities: 108.0,
                entertainment: 166.25,
                groceries: 237.5,
                fitness: 0.0,
                healthcare: 135.0,
            }
        );
        assert_eq!(breakdown.total(), 2526.75);
    }

    #[test]
    fn test_transportation_uses_transport_multiplier() {
        let multipliers = RegionMultiplierSet::new(1.0, 1.0, 2.0, 1.0);
        let breakdown = merge_breakdown(&ESTIMATES, &austin_lifestyle(), &multipliers);
        assert_eq!(breakdown.transportation, 300.0);
        assert_eq!(breakdown.rent, 1500.0);
    }

    #[tokio::test]
    async fn test_compose_appends_one_record() {
        let model = Arc::new(FixedModel {
            estimates: ESTIMATES,
            r_squared: 0.72,
        });
        let (composer, ledger) = create_composer(model);

        let composed = composer.compose(&request("Austin")).await.unwrap();
        assert_eq!(composed.record_id, 1);
        assert_eq!(composed.result.total_cost, 2526.75);
        assert_eq!(composed.result.confidence, Confidence::Low);

        let records = ledger.recent(10).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].breakdown, composed.result.breakdown);
        assert_eq!(records[0].total_cost, 2526.75);
    }

    #[tokio::test]
    async fn test_model_failure_persists_nothing() {
        let (composer, ledger) = create_composer(Arc::new(DownModel));

        let err = composer.compose(&request("NYC")).await.unwrap_err();
        assert_eq!(err.component(), component::MODEL);
        assert_eq!(ledger.aggregate().await.unwrap().total_queries, 0);
    }

    #[tokio::test]
    async fn test_cancelled_composition_persists_nothing() {
        let (composer, ledger) = create_composer(Arc::new(HangingModel));

        let outcome =
            tokio::time::timeout(Duration::from_millis(50), composer.compose(&request("NYC"))).await;
        assert!(outcome.is_err());

        assert_eq!(ledger.aggregate().await.unwrap().total_queries, 0);
        assert!(ledger.recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_region_cache_failure_persists_nothing() {
        let ledger = Arc::new(MemoryLedger::new());
        let model = Arc::new(FixedModel {
            estimates: ESTIMATES,
            r_squared: 0.8,
        });
        let composer = Composer::new(
            RegionCostProvider::new(Arc::new(LockedCache)),
            model,
            FeatureEncoder::default(),
            ledger.clone(),
        );

        let err = composer.compose(&request("Austin")).await.unwrap_err();
        assert_eq!(err.component(), component::CACHE);
        assert_eq!(ledger.aggregate().await.unwrap().total_queries, 0);
    }

    #[tokio::test]
    async fn test_statistics_and_recent_delegate_to_ledger() {
        let model = Arc::new(FixedModel {
            estimates: ESTIMATES,
            r_squared: 0.92,
        });
        let (composer, _) = create_composer(model);

        composer.compose(&request("Austin")).await.unwrap();
        composer.compose(&request("Mars")).await.unwrap();

        let stats = composer.statistics().await.unwrap();
        assert_eq!(stats.total_queries, 2);
        assert_eq!(stats.queries_by_region.get("Mars"), Some(&1));
        assert_eq!(composer.recent_queries(1).await.unwrap().len(), 1);
        assert_eq!(composer.confidence(), Confidence::High);
    }
}
