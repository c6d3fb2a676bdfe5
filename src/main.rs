mod app;
mod cli;

use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ecslink_config::logging::{
    ensure_log_dir, log_file_path, log_level_to_filter, rotate_log_files, DEFAULT_MAX_LOG_FILES,
    DEFAULT_MAX_LOG_SIZE,
};
use ecslink_config::{load_config, load_file, AppPaths, Config, LogConfig};

use crate::app::App;
use crate::cli::Cli;

fn load(cli: &Cli) -> Result<Config> {
    if let Some(path) = &cli.config {
        return load_file(path).with_context(|| format!("cannot load config {}", path.display()));
    }
    let paths = AppPaths::detect().context("failed to detect config directory")?;
    let project_dir = std::env::current_dir().ok();
    load_config(paths.config_dir(), project_dir.as_deref()).context("cannot load config")
}

/// Logs go to stderr, or to `log.file` when set, so stdout stays parseable.
fn init_logging(log: &LogConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level_to_filter(log.level)));

    match log_file_path(log) {
        Some(path) => {
            ensure_log_dir(path)?;
            rotate_log_files(path, DEFAULT_MAX_LOG_SIZE, DEFAULT_MAX_LOG_FILES)?;
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let config = load(&cli)?;
    init_logging(&config.log)?;

    let app = App::new(config, cli.endpoint.clone());
    app.run(cli).await
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("ecslink: {e:#}");
        std::process::exit(1);
    }
}
