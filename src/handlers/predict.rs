//! `POST /predict`
//!
//! Validates the raw request at the boundary, hands a typed
//! [`PredictionRequest`] to the composer and echoes the inputs back in a
//! human-readable summary.

use super::AppState;
use crate::breakdown::CostBreakdown;
use crate::composer::{Confidence, PredictionRequest};
use crate::error::AppError;
use crate::ledger::QueryInputs;
use crate::lifestyle::LifestyleSelections;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Json;
use serde::{Deserialize, Serialize};

const APARTMENT_SIZES: [&str; 4] = ["studio", "1BR", "2BR", "3BR"];
const CAR_TYPES: [&str; 4] = ["compact", "sedan", "suv", "electric"];
const MAX_DINING_FREQUENCY: i64 = 15;
const MAX_COMMUTE_MILES: f64 = 100.0;

#[derive(Debug, Clone, Deserialize)]
pub struct PredictPayload {
    #[serde(alias = "city")]
    pub region: String,
    pub apartment_size: String,
    /// Restaurant meals per week
    pub dining_frequency: i64,
    pub car_type: String,
    /// Daily round-trip commute
    pub commute_miles: f64,
    pub entertainment_budget: Option<String>,
    pub grocery_habits: Option<String>,
    pub fitness_routine: Option<String>,
    pub healthcare_needs: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InputSummary {
    pub apartment_size: String,
    pub dining_frequency: String,
    pub car_type: String,
    pub commute_miles: String,
    pub entertainment: &'static str,
    pub groceries: &'static str,
    pub fitness: &'static str,
    pub healthcare: &'static str,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub region: String,
    pub total_monthly_cost: f64,
    pub breakdown: CostBreakdown,
    pub confidence: Confidence,
    pub input_summary: InputSummary,
    pub query_id: i64,
    pub timestamp: String,
}

impl PredictPayload {
    /// Boundary validation; lifestyle values are never rejected
    pub fn validate(&self) -> Result<PredictionRequest, AppError> {
        let region = self.region.trim();
        if region.is_empty() {
            return Err(AppError::BadRequest("region must not be empty".to_string()));
        }

        if !APARTMENT_SIZES.contains(&self.apartment_size.as_str()) {
            return Err(AppError::BadRequest(format!(
                "apartment_size must be one of {}",
                APARTMENT_SIZES.join(", ")
            )));
        }

        if !(0..=MAX_DINING_FREQUENCY).contains(&self.dining_frequency) {
            return Err(AppError::BadRequest(format!(
                "dining_frequency must be between 0 and {}",
                MAX_DINING_FREQUENCY
            )));
        }

        if !CAR_TYPES.contains(&self.car_type.as_str()) {
            return Err(AppError::BadRequest(format!(
                "car_type must be one of {}",
                CAR_TYPES.join(", ")
            )));
        }

        if !self.commute_miles.is_finite() || !(0.0..=MAX_COMMUTE_MILES).contains(&self.commute_miles) {
            return Err(AppError::BadRequest(format!(
                "commute_miles must be between 0 and {}",
                MAX_COMMUTE_MILES
            )));
        }

        Ok(PredictionRequest {
            inputs: QueryInputs {
                region: region.to_string(),
                apartment_size: self.apartment_size.clone(),
                dining_frequency: self.dining_frequency as u32,
                car_type: self.car_type.clone(),
                commute_miles: self.commute_miles,
            },
            lifestyle: LifestyleSelections::parse(
                self.entertainment_budget.as_deref(),
                self.grocery_habits.as_deref(),
                self.fitness_routine.as_deref(),
                self.healthcare_needs.as_deref(),
            ),
        })
    }
}

fn summarize(request: &PredictionRequest) -> InputSummary {
    InputSummary {
        apartment_size: request.inputs.apartment_size.clone(),
        dining_frequency: format!("{}x/week", request.inputs.dining_frequency),
        car_type: request.inputs.car_type.clone(),
        commute_miles: format!("{:?} miles/day", request.inputs.commute_miles),
        entertainment: request.lifestyle.entertainment.as_str(),
        groceries: request.lifestyle.groceries.as_str(),
        fitness: request.lifestyle.fitness.as_str(),
        healthcare: request.lifestyle.healthcare.as_str(),
    }
}

/// POST /predict - compose and record an itemized monthly cost estimate
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictPayload>, JsonRejection>,
) -> Result<Json<PredictResponse>, AppError> {
    let Json(payload) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let request = payload.validate()?;

    let composed = state.composer.compose(&request).await?;

    Ok(Json(PredictResponse {
        region: request.inputs.region.clone(),
        total_monthly_cost: composed.result.total_cost,
        breakdown: composed.result.breakdown,
        confidence: composed.result.confidence,
        input_summary: summarize(&request),
        query_id: composed.record_id,
        timestamp: composed.timestamp.to_rfc3339(),
    }))
}
