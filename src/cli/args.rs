//! CLI argument definitions using clap
//!
//! Commands:
//! - datasieve init --config <path>
//! - datasieve run --config <path> --kind <kind> --date <date> --hour <hour>
//! - datasieve run-all --config <path> [--kind <kind>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// datasieve - A strict, deterministic hourly batch validation and routing pipeline
#[derive(Parser, Debug)]
#[command(name = "datasieve")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize the staging areas, state directory, and config file
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./datasieve.json")]
        config: PathBuf,
    },

    /// Process one staged partition
    Run {
        /// Path to configuration file
        #[arg(long, default_value = "./datasieve.json")]
        config: PathBuf,

        /// Dataset kind: customers, transactions, products, erasure-requests
        #[arg(long)]
        kind: String,

        /// Partition date, YYYY-MM-DD
        #[arg(long)]
        date: String,

        /// Partition hour, 0-23
        #[arg(long)]
        hour: u8,
    },

    /// Process every staged partition, oldest first
    RunAll {
        /// Path to configuration file
        #[arg(long, default_value = "./datasieve.json")]
        config: PathBuf,

        /// Restrict to one dataset kind; all kinds in dependency order
        /// when omitted
        #[arg(long)]
        kind: Option<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
