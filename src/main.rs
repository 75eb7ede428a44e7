use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use livecost::config::{self, LogFormat};
use livecost::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    // Logging settings come from the config, so load it before anything logs
    let loaded = config::load_config(&args.config);
    match &loaded {
        Ok(cfg) => init_tracing(&cfg.server.log_level, cfg.server.log_format),
        Err(_) => init_tracing("info", LogFormat::Text),
    }

    match args.get_command() {
        cli::Commands::Version => {
            println!("LiveCost v{}", env!("CARGO_PKG_VERSION"));
        }
        cli::Commands::Config {
            action: cli::ConfigCommands::Validate,
        } => {
            commands::config::validate(&args.config, loaded)?;
        }
        cli::Commands::Config {
            action: cli::ConfigCommands::Show,
        } => commands::config::show(&loaded?)?,
        cli::Commands::Start => commands::start::execute(loaded?).await?,
        cli::Commands::Stats => commands::stats::execute(&loaded?).await?,
        cli::Commands::Recent { limit } => commands::recent::execute(&loaded?, limit).await?,
        cli::Commands::Cache {
            action: cli::CacheCommands::Sweep,
        } => commands::cache::sweep(&loaded?).await?,
    }

    Ok(())
}
