use std::path::PathBuf;

use anyhow::Context;
use autopost_core::AppConfig;
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "autopost",
    version,
    about = "Watch screenshot directories and post new images to a webhook"
)]
pub struct Cli {
    /// JSON configuration file. Falls back to AUTOPOST_CONFIG when omitted.
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Seconds between scans of each directory
    #[arg(long)]
    pub interval: Option<u64>,

    /// Directory for temporary resized and watermarked images
    #[arg(long)]
    pub scratch_dir: Option<PathBuf>,

    /// Print the retained in-memory log when exiting
    #[arg(long)]
    pub print_log: bool,

    /// Include debug entries when printing the log
    #[arg(long, requires = "print_log")]
    pub debug_log: bool,
}

/// Load configuration from `--config` or the environment and apply flag
/// overrides. Validation is left to the caller.
pub fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => AppConfig::from_env().context("Failed to load config from environment")?,
    };

    if let Some(interval) = cli.interval {
        config.watch_interval_secs = interval;
    }
    Ok(config)
}

/// [`load_config`] followed by validation.
pub fn resolve_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let config = load_config(cli)?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}
