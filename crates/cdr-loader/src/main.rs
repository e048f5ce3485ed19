//! CDR Loader - scan, load and archive call-record extracts

use anyhow::{Context, Result};
use cdr_common::logging::{init_logging, LogConfig, LogLevel};
use cdr_loader::{
    config::{Config, DEFAULT_CONFIG_PATH},
    db,
    ingest::{Ingestor, PgSession},
};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "cdr-loader")]
#[command(author, version, about = "Load call-record extract files into PostgreSQL")]
struct Cli {
    /// Configuration file
    #[arg(short, long, env = "CDR_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Directory to scan, overriding the configuration file
    #[arg(short, long)]
    scan_path: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    // Environment variables take precedence over the flags
    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("cdr-loader")
        .filter_directives("sqlx=warn")
        .build()
        .merge_env()?;

    let _guard = init_logging(&log_config)?;

    run(cli)
        .await
        .inspect_err(|e| error!(error = %format!("{:#}", e), "Run aborted"))
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::from_file(&cli.config)
        .with_context(|| format!("Unable to load configuration from {}", cli.config.display()))?;
    if let Some(scan_path) = cli.scan_path {
        config.scan_path = scan_path;
    }
    config.validate().context("Configuration is unusable")?;

    info!(
        scan_path = %config.scan_path.display(),
        archive = %config.archive_root().display(),
        "Configuration loaded"
    );

    let pool = db::create_pool(&config.database)
        .await
        .context("Failed to connect to database")?;
    db::health_check(&pool)
        .await
        .context("Database health check failed")?;

    Ingestor::new(config, PgSession::new(pool))?.run().await?;

    Ok(())
}
