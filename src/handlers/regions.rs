use crate::region;
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// GET /regions - identifiers with compiled-in multipliers
pub async fn list_regions() -> impl IntoResponse {
    let regions = region::known_regions();
    (
        StatusCode::OK,
        Json(json!({
            "count": regions.len(),
            "regions": regions,
        })),
    )
}
