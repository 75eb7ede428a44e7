pub mod health;
pub mod metrics_handler;
pub mod model_info;
pub mod predict;
pub mod queries;
pub mod regions;

use crate::composer::Composer;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Shared state for the prediction API
#[derive(Clone)]
pub struct AppState {
    pub composer: Arc<Composer>,
    /// `None` when storage is in-memory
    pub database: Option<SqlitePool>,
}
