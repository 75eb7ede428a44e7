//! Command implementations for the CLI
//!
//! - start: run the HTTP server
//! - stats / recent: read the ledger
//! - cache: region cache maintenance
//! - config: configuration display and validation

pub mod cache;
pub mod config;
pub mod recent;
pub mod start;
pub mod stats;

use anyhow::Result;
use livecost::config::{Config, StorageBackend};
use livecost::server::{self, Storage};

/// Open storage for a one-shot command, warning when it cannot hold history
pub(crate) async fn open_persistent_storage(cfg: &Config) -> Result<Storage> {
    if cfg.database.backend == StorageBackend::Memory {
        eprintln!("Warning: database.backend is \"memory\"; there is no persisted data to read");
    }
    server::open_storage(&cfg.database).await
}
