use anyhow::Result;
use colored::Colorize;
use livecost::config::Config;
use livecost::sweeper;

/// Execute `cache sweep`
pub async fn sweep(cfg: &Config) -> Result<()> {
    let storage = super::open_persistent_storage(cfg).await?;

    let before = storage.cache.len().await?;
    let removed = sweeper::run_sweep_now(storage.cache.as_ref()).await?;

    println!(
        "{} Removed {} expired entries ({} remaining)",
        "✓".green(),
        removed,
        before.saturating_sub(removed)
    );
    Ok(())
}
