use super::AppState;
use crate::model::{FEATURE_NAMES, MODEL_CATEGORIES};
use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

/// GET /model-info
pub async fn model_info(State(state): State<AppState>) -> impl IntoResponse {
    let model = state.composer.model();

    Json(json!({
        "model": model.name(),
        "r_squared": model.r_squared(),
        "confidence": state.composer.confidence(),
        "features": FEATURE_NAMES,
        "categories": MODEL_CATEGORIES,
        "encoders": state.composer.encoder().classes(),
    }))
}
