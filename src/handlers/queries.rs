use super::AppState;
use crate::error::AppError;
use crate::ledger::{AggregateStats, QueryRecord};
use axum::extract::{Query, State};
use axum::response::Json;
use serde::{Deserialize, Serialize};

const DEFAULT_RECENT_LIMIT: usize = 10;
const MAX_RECENT_LIMIT: usize = 100;

/// Query parameters for recent queries
#[derive(Debug, Deserialize)]
pub struct RecentParams {
    /// Maximum number of results (capped at 100)
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_RECENT_LIMIT
}

#[derive(Debug, Serialize)]
pub struct RecentResponse {
    pub count: usize,
    pub queries: Vec<QueryRecord>,
}

/// GET /statistics
pub async fn statistics(State(state): State<AppState>) -> Result<Json<AggregateStats>, AppError> {
    Ok(Json(state.composer.statistics().await?))
}

/// GET /recent-queries?limit=N
pub async fn recent_queries(
    State(state): State<AppState>,
    Query(params): Query<RecentParams>,
) -> Result<Json<RecentResponse>, AppError> {
    let limit = params.limit.min(MAX_RECENT_LIMIT);
    let queries = state.composer.recent_queries(limit).await?;

    Ok(Json(RecentResponse {
        count: queries.len(),
        queries,
    }))
}
