//! ramdisk binary.
//!
//! Starts an in-memory filesystem and dispatches requests to it, one per
//! line, from stdin or a script file.
//!
//! Usage:
//!   # Interactive
//!   cargo run -p ramdisk-cli
//!
//!   # Debug tracing (path resolution steps) on stderr
//!   cargo run -p ramdisk-cli -- --debug
//!
//!   # Custom capacities
//!   cargo run -p ramdisk-cli -- --config ramdisk.ron --script requests.txt

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufRead, BufReader};
use tracing_subscriber::{EnvFilter, fmt};

use ramdisk_cli::serve;
use ramdisk_kernel::{RamdiskBackend, RamdiskConfig};

/// In-memory filesystem request dispatcher.
#[derive(Parser, Debug)]
#[command(name = "ramdisk")]
#[command(about = "Fixed-capacity in-memory filesystem")]
struct Args {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// RON configuration file (capacities, root mode)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Read requests from this file instead of stdin
    #[arg(long)]
    script: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Replies go to stdout; logs stay on stderr.
    let filter = if args.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
    if args.debug {
        tracing::info!("Debug logging enabled");
    }

    let config = match &args.config {
        Some(path) => RamdiskConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => RamdiskConfig::default(),
    };
    let fs = RamdiskBackend::with_config(config);
    tracing::info!(
        max_entries = fs.config().max_entries,
        max_file_size = fs.config().max_file_size,
        max_name_len = fs.config().max_name_len,
        "Starting ramdisk"
    );

    let input: Box<dyn AsyncBufRead + Unpin> = match &args.script {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("opening script {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };

    let stats = serve(&fs, input, tokio::io::stdout())
        .await
        .inspect_err(|e| tracing::error!("dispatch error: {:?}", e))?;

    tracing::info!(
        requests = stats.requests,
        errors = stats.errors,
        "ramdisk shutting down"
    );
    Ok(())
}
