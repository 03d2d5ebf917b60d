//! uvhd-scan - list user profile disks and show which are in use

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use uvhd_scan::config::{Config, DEFAULT_LOG_FILTER};
use uvhd_scan::output::{write_disks, OutputFormat};
use uvhd_scan::{resolve_search_paths, DiskScanner, LocalStorage};

/// List user profile disks (UVHD-<SID>.vhdx) with their owners and lock state
#[derive(Parser, Debug)]
#[command(name = "uvhd-scan")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Directories to search (defaults to the current directory)
    paths: Vec<String>,

    /// Only show disks that are currently in use
    #[arg(short, long)]
    locked: bool,

    /// JSON account map used to resolve SIDs [env: UVHD_SID_MAP]
    #[arg(long)]
    sid_map: Option<PathBuf>,

    /// Server or domain controller for account lookups (Windows) [env: UVHD_DIRECTORY_SERVER]
    #[arg(long)]
    server: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

fn main() -> Result<()> {
    // Load .env from the working directory, then its parent
    if dotenvy::dotenv().is_err() {
        let _ = dotenvy::from_path("../.env");
    }

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(path) = cli.sid_map {
        config = config.with_sid_map(path);
    }
    if let Some(server) = cli.server {
        config = config.with_directory_server(server);
    }

    let current_dir = std::env::current_dir().context("Failed to determine current directory")?;
    let search_paths = resolve_search_paths(&cli.paths, &current_dir);

    let directory = config
        .open_directory()
        .context("Failed to open identity directory")?;
    tracing::debug!("Using {} directory", directory.name());

    let storage = LocalStorage::new();
    let scanner = DiskScanner::new(&storage, &directory);
    let disks = scanner
        .scan(&search_paths, cli.locked)
        .context("Profile disk scan failed")?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_disks(&mut out, &disks, cli.format).context("Failed to write results")?;

    Ok(())
}
