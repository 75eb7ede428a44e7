use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::SqlitePool;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    cache::{MemoryCache, SqliteCache, TtlCache},
    composer::Composer,
    config::{Config, DatabaseConfig, ModelKind, ServerConfig, StorageBackend},
    database, handlers,
    handlers::AppState,
    ledger::{Ledger, MemoryLedger, SqliteLedger},
    metrics,
    model::{LinearModel, RegressionModel, RemoteModel},
    region::RegionCostProvider,
    signals::setup_signal_handlers,
    sweeper,
};

/// Cache and ledger backends selected by configuration
#[derive(Clone)]
pub struct Storage {
    pub cache: Arc<dyn TtlCache>,
    pub ledger: Arc<dyn Ledger>,
    pub pool: Option<SqlitePool>,
}

/// Open the configured storage backend
pub async fn open_storage(config: &DatabaseConfig) -> Result<Storage> {
    match config.backend {
        StorageBackend::Sqlite => {
            let pool = database::connect(&config.url, config.max_connections).await?;
            info!(url = %config.url, "Using SQLite storage");
            Ok(Storage {
                cache: Arc::new(SqliteCache::with_system_clock(pool.clone())),
                ledger: Arc::new(SqliteLedger::new(pool.clone())),
                pool: Some(pool),
            })
        }
        StorageBackend::Memory => {
            info!("Using in-memory storage; nothing survives a restart");
            Ok(Storage {
                cache: Arc::new(MemoryCache::default()),
                ledger: Arc::new(MemoryLedger::new()),
                pool: None,
            })
        }
    }
}

/// Construct the configured regression model
pub fn build_model(config: &Config) -> Result<Arc<dyn RegressionModel>> {
    let model: Arc<dyn RegressionModel> = match config.model.kind {
        ModelKind::Linear => Arc::new(LinearModel::new(config.model.linear, config.model.r_squared)),
        ModelKind::Remote => {
            let remote = config
                .model
                .remote
                .as_ref()
                .context("model.kind = \"remote\" requires a [model.remote] section")?;
            Arc::new(RemoteModel::new(
                &remote.base_url,
                Duration::from_secs(remote.timeout_seconds),
                config.model.r_squared,
            )?)
        }
    };

    info!(
        model = model.name(),
        r_squared = model.r_squared(),
        "Regression model ready"
    );
    Ok(model)
}

/// Wire storage and model into the composer
pub fn build_app_state(config: &Config, storage: &Storage) -> Result<AppState> {
    let regions = RegionCostProvider::with_ttl(storage.cache.clone(), config.cache.region_ttl());
    let composer = Composer::new(
        regions,
        build_model(config)?,
        config.encoders.clone(),
        storage.ledger.clone(),
    );

    Ok(AppState {
        composer: Arc::new(composer),
        database: storage.pool.clone(),
    })
}

/// Start the LiveCost server
///
/// This function:
/// 1. Opens storage and builds the composer
/// 2. Initializes metrics and spawns the cache sweeper
/// 3. Sets up signal handlers for graceful shutdown
/// 4. Serves requests until a shutdown signal arrives
pub async fn start_server(config: Config) -> Result<()> {
    let storage = open_storage(&config.database).await?;
    let state = build_app_state(&config, &storage)?;

    let metrics_handle = if config.metrics.enabled {
        info!("Initializing Prometheus metrics...");
        Some(Arc::new(metrics::init_metrics().context("Failed to install Prometheus recorder")?))
    } else {
        None
    };

    let sweep_handle = sweeper::spawn_sweep_task(storage.cache.clone(), config.cache.sweep_interval());

    let (shutdown_tx, signal_handle) = setup_signal_handlers();
    let mut shutdown_rx = shutdown_tx.subscribe();

    let app = create_router(&config, state, metrics_handle);

    let addr = SocketAddr::from((
        config
            .server
            .host
            .parse::<std::net::IpAddr>()
            .with_context(|| format!("Invalid server.host: {}", config.server.host))?,
        config.server.port,
    ));

    info!("Starting LiveCost on {}", addr);
    info!(
        "Configuration: storage {:?}, model {:?}, region TTL {}s, sweep every {}s",
        config.database.backend,
        config.model.kind,
        config.cache.region_ttl_seconds,
        config.cache.sweep_interval_seconds
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
            info!("Shutdown signal received, draining connections...");
        })
        .await?;

    sweep_handle.abort();
    signal_handle.await?;
    if let Some(pool) = storage.pool {
        pool.close().await;
    }
    info!("Server stopped gracefully");

    Ok(())
}

/// Create the Axum router with all routes and middleware
pub fn create_router(
    config: &Config,
    state: AppState,
    metrics_handle: Option<Arc<PrometheusHandle>>,
) -> Router {
    let mut app = Router::new()
        .route("/", get(handlers::health::health_check))
        .route("/health", get(handlers::health::health_check))
        .route("/regions", get(handlers::regions::list_regions))
        .route("/predict", post(handlers::predict::predict))
        .route("/statistics", get(handlers::queries::statistics))
        .route("/recent-queries", get(handlers::queries::recent_queries))
        .route("/model-info", get(handlers::model_info::model_info))
        .with_state(state);

    if let Some(handle) = metrics_handle {
        let metrics_routes = Router::new()
            .route(&config.metrics.endpoint, get(handlers::metrics_handler::metrics))
            .with_state(handle);
        app = app.merge(metrics_routes);
    }

    app.layer(DefaultBodyLimit::max(64 * 1024))
        .layer(build_cors_layer(&config.server))
        .layer(TraceLayer::new_for_http())
}

fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if config.cors_origins.is_empty() || config.cors_origins.iter().any(|o| o == "*") {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(origins))
}
