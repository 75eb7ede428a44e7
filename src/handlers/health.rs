use super::AppState;
use crate::database;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

/// Health check endpoint, also served at `/`
///
/// Always 200 while the process is serving; `status` is `degraded` when the
/// database does not answer.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let (database, healthy) = match &state.database {
        Some(pool) if database::ping(pool).await => ("connected", true),
        Some(_) => ("unreachable", false),
        None => ("in-memory", true),
    };

    (
        StatusCode::OK,
        Json(json!({
            "status": if healthy { "healthy" } else { "degraded" },
            "service": "livecost",
            "version": env!("CARGO_PKG_VERSION"),
            "model": state.composer.model().name(),
            "database": database,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })),
    )
}
