use anyhow::Result;
use colored::Colorize;
use livecost::config::{Config, ModelKind};
use std::path::Path;
use tracing::info;

/// Execute the config show command
///
/// Prints the effective configuration (file + environment + defaults) as TOML
pub fn show(cfg: &Config) -> Result<()> {
    println!("{}", "Current Configuration:".green().bold());
    println!();

    let toml_string = toml::to_string_pretty(cfg)?;
    println!("{}", toml_string);

    info!("Configuration displayed successfully");
    Ok(())
}

/// Execute the config validate command
pub fn validate(path: &Path, loaded: Result<Config>) -> Result<()> {
    println!(
        "{}",
        format!("Validating configuration ({})...", path.display()).yellow()
    );

    let cfg = match loaded {
        Ok(cfg) => cfg,
        Err(e) => {
            println!("{} {:#}", "✗ Configuration is invalid:".red(), e);
            return Err(e);
        }
    };

    println!("{}", "✓ Configuration is valid".green());
    println!();
    println!("{}", "Summary:".bold());
    println!("  Listen:            {}:{}", cfg.server.host, cfg.server.port);
    println!("  Storage:           {:?} ({})", cfg.database.backend, cfg.database.url);
    println!("  Model:             {}", describe_model(&cfg));
    println!("  Region TTL:        {}s", cfg.cache.region_ttl_seconds);
    println!("  Sweep interval:    {}s", cfg.cache.sweep_interval_seconds);

    info!("Configuration validation successful");
    Ok(())
}

fn describe_model(cfg: &Config) -> String {
    match (&cfg.model.kind, &cfg.model.remote) {
        (ModelKind::Remote, Some(remote)) => {
            format!("remote {} (R² {})", remote.base_url, cfg.model.r_squared)
        }
        _ => format!("linear (R² {})", cfg.model.r_squared),
    }
}
