use anyhow::{Context, Result};
use clap::Parser;
use job_scout::cli::{handle_command, Cli};
use job_scout::core::{ConfigManager, Settings};
use std::fs::OpenOptions;
use tracing::info;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FILE: &str = "job-scout.log";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = ConfigManager::load()?;
    ConfigManager::ensure_directories(&settings).await?;

    init_logging(&settings)?;

    info!("Starting job-scout");
    handle_command(cli, settings).await
}

fn init_logging(settings: &Settings) -> Result<()> {
    let log_path = settings.storage.logs_dir.join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    // RUST_LOG wins over LOG_LEVEL.
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_level.0))
        .context("Invalid log level")?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(
            fmt::layer()
                .json()
                .with_writer(file)
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    Ok(())
}
