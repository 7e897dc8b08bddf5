//! SegLog CLI
//!
//! Command-line tools for working with log directories.
//!
//! # Commands
//!
//! - `inspect` - Display segment layout and offset range
//! - `verify` - Read and decode every record in the log
//! - `dump` - Print records from an offset
//! - `truncate` - Remove segments below an offset

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// SegLog command-line log tools.
#[derive(Parser)]
#[command(name = "seglog")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the log directory
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display segment layout and offset range
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Read and decode every record, reporting any that fail
    Verify,

    /// Print records starting at an offset
    Dump {
        /// Offset to start from (defaults to the lowest offset)
        #[arg(short, long)]
        offset: Option<u64>,

        /// Maximum number of records to print
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Remove every segment whose records are all below an offset
    Truncate {
        /// Records below this offset become removable
        #[arg(short, long)]
        before: u64,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Inspect { format } => {
            let path = cli.path.ok_or("Log directory path required for inspect")?;
            commands::inspect::run(&path, &format)?;
        }
        Commands::Verify => {
            let path = cli.path.ok_or("Log directory path required for verify")?;
            commands::verify::run(&path)?;
        }
        Commands::Dump {
            offset,
            limit,
            format,
        } => {
            let path = cli.path.ok_or("Log directory path required for dump")?;
            commands::dump::run(&path, offset, limit, &format)?;
        }
        Commands::Truncate { before } => {
            let path = cli.path.ok_or("Log directory path required for truncate")?;
            commands::truncate::run(&path, before)?;
        }
        Commands::Version => {
            println!("SegLog CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("SegLog Core v{}", seglog_core::VERSION);
        }
    }

    Ok(())
}
