use crate::model::{FeatureEncoder, LinearCoefficients};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub model: ModelConfig,
    pub encoders: FeatureEncoder,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    /// Allowed CORS origins; `"*"` allows any
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            cors_origins: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub backend: StorageBackend,
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Sqlite,
            url: "sqlite:livecost.db".to_string(),
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    pub region_ttl_seconds: u64,
    pub sweep_interval_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            region_ttl_seconds: 86400,
            sweep_interval_seconds: 3600,
        }
    }
}

impl CacheConfig {
    pub fn region_ttl(&self) -> Duration {
        Duration::from_secs(self.region_ttl_seconds)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    #[default]
    Linear,
    Remote,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelConfig {
    pub kind: ModelKind,
    /// Held-out R² reported with every prediction
    pub r_squared: f64,
    pub linear: LinearCoefficients,
    pub remote: Option<RemoteModelConfig>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            kind: ModelKind::Linear,
            r_squared: 0.8,
            linear: LinearCoefficients::default(),
            remote: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RemoteModelConfig {
    pub base_url: String,
    #[serde(default = "default_remote_timeout")]
    pub timeout_seconds: u64,
}

fn default_remote_timeout() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "/metrics".to_string(),
        }
    }
}

/// Load `path` layered with `LIVECOST__SECTION__KEY` environment overrides
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "Config file not found, using defaults");
    }

    let config = config::Config::builder()
        .add_source(
            config::File::from(path)
                .format(config::FileFormat::Toml)
                .required(false),
        )
        .add_source(
            config::Environment::with_prefix("LIVECOST")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    validate_config(&cfg)?;

    Ok(cfg)
}

pub fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    if cfg.cache.region_ttl_seconds == 0 {
        anyhow::bail!("cache.region_ttl_seconds must be positive");
    }

    if cfg.cache.sweep_interval_seconds == 0 {
        anyhow::bail!("cache.sweep_interval_seconds must be positive");
    }

    if cfg.database.backend == StorageBackend::Sqlite {
        if cfg.database.url.trim().is_empty() {
            anyhow::bail!("database.url cannot be empty");
        }
        if cfg.database.max_connections == 0 {
            anyhow::bail!("database.max_connections must be at least 1");
        }
    }

    if !cfg.model.r_squared.is_finite() {
        anyhow::bail!("model.r_squared must be a finite number");
    }
    if !(0.0..=1.0).contains(&cfg.model.r_squared) {
        tracing::warn!(
            r_squared = cfg.model.r_squared,
            "model.r_squared is outside [0, 1]; confidence labels may be misleading"
        );
    }

    match cfg.model.kind {
        ModelKind::Linear => {
            let tables = [
                ("rent", &cfg.model.linear.rent),
                ("food", &cfg.model.linear.food),
                ("transportation", &cfg.model.linear.transportation),
                ("utilities", &cfg.model.linear.utilities),
            ];
            for (category, table) in tables {
                if !table.intercept.is_finite() || table.weights.iter().any(|w| !w.is_finite()) {
                    anyhow::bail!("model.linear.{} has non-finite coefficients", category);
                }
            }
        }
        ModelKind::Remote => {
            let Some(remote) = &cfg.model.remote else {
                anyhow::bail!("model.kind = \"remote\" requires a [model.remote] section");
            };
            if remote.base_url.trim().is_empty() {
                anyhow::bail!("model.remote.base_url cannot be empty");
            }
            if remote.timeout_seconds == 0 {
                anyhow::bail!("model.remote.timeout_seconds must be positive");
            }
        }
    }

    if cfg.metrics.enabled && !cfg.metrics.endpoint.starts_with('/') {
        anyhow::bail!("metrics.endpoint must start with '/'");
    }

    Ok(())
}
