use anyhow::Result;
use colored::Colorize;
use livecost::{config::Config, server};
use tracing::info;

/// Execute the start command
///
/// Blocks until a shutdown signal is received.
pub async fn execute(cfg: Config) -> Result<()> {
    println!("{}", "Starting LiveCost in foreground mode...".green());
    info!("Starting LiveCost");

    server::start_server(cfg).await
}
