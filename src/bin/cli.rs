//! CaskKV CLI
//!
//! Opens a store directory in-process, runs one command and closes it.

use std::process::ExitCode;

use caskkv::{CaskError, Config, Store, SyncStrategy};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

/// CaskKV CLI
#[derive(Parser, Debug)]
#[command(name = "caskkv-cli")]
#[command(about = "CLI for the CaskKV embedded key-value store")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./caskkv_data")]
    data_dir: String,

    /// fsync after every write
    #[arg(long)]
    sync: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Show key and segment counts
    Stats,
}

fn main() -> ExitCode {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,caskkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CaskError::KeyNotFound) => {
            eprintln!("(not found)");
            ExitCode::from(2)
        }
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> caskkv::Result<()> {
    let sync_strategy = if args.sync {
        SyncStrategy::EveryWrite
    } else {
        SyncStrategy::OsManaged
    };

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .sync_strategy(sync_strategy)
        .build();

    let store = Store::open(config)?;

    let result = match args.command {
        Commands::Get { key } => store
            .get(key.as_bytes())
            .map(|value| println!("{}", String::from_utf8_lossy(&value))),
        Commands::Set { key, value } => store.set(key.as_bytes(), value.as_bytes()),
        Commands::Stats => {
            let stats = store.stats();
            let recovery = store.recovery_stats();
            println!("keys:              {}", stats.keys);
            println!("archived segments: {}", stats.archived_segments);
            println!("records scanned:   {}", recovery.records_scanned);
            Ok(())
        }
    };

    // Close even when the command failed, but report the command's error first
    let closed = store.close();
    result.and(closed)
}
