//! Huddle terminal client entry point.

use std::{fs, path::Path, sync::Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use huddle_app::Runtime;
use huddle_client::system_env::SystemEnv;
use huddle_tui::{
    TerminalDriver,
    config::{Args, FileConfig, Settings},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let file = FileConfig::load(args.config.as_ref())?;
    let settings = Settings::resolve(args, file)?;

    // The terminal owns stdout, so logs go to a file.
    if let Some(path) = &settings.log_file {
        init_logging(path, settings.verbose)?;
    }

    tracing::info!(server = %settings.server_url, room = ?settings.room, "starting huddle");

    let driver = TerminalDriver::new(settings.transport_config())?;
    Runtime::new(driver, SystemEnv::new(), settings.runtime_config()).run().await?;

    tracing::info!("huddle exited");
    Ok(())
}

fn init_logging(path: &Path, verbose: bool) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .init();
    Ok(())
}
