//! CLI command implementations.
//!
//! `init` writes the default config and creates the staging areas; the
//! run commands load the config, open the file-backed gateway, and hand
//! off to the batch runner.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::batch::{BatchRunner, BatchSummary, StagingPaths};
use crate::dataset::{BatchPartition, DatasetKind};
use crate::observability::{log, Severity};
use crate::storage::FileGateway;

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};

/// Configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Staging area for inbound hourly files
    #[serde(default = "default_raw_data_path")]
    pub raw_data_path: String,

    /// Destination for accepted records
    #[serde(default = "default_processed_data_path")]
    pub processed_data_path: String,

    /// Destination for consumed raw files
    #[serde(default = "default_archived_data_path")]
    pub archived_data_path: String,

    /// Gateway state directory (canonical/quarantine/statistics files)
    #[serde(default = "default_state_dir")]
    pub state_dir: String,
}

fn default_raw_data_path() -> String {
    "raw_data".to_string()
}
fn default_processed_data_path() -> String {
    "processed_data".to_string()
}
fn default_archived_data_path() -> String {
    "archived_data".to_string()
}
fn default_state_dir() -> String {
    "state".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            raw_data_path: default_raw_data_path(),
            processed_data_path: default_processed_data_path(),
            archived_data_path: default_archived_data_path(),
            state_dir: default_state_dir(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        if !path.exists() {
            return Err(CliError::NotInitialized(format!(
                "config file '{}' not found",
                path.display()
            )));
        }
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config(format!("failed to read config: {}", e)))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config(format!("invalid config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        let paths = [
            &self.raw_data_path,
            &self.processed_data_path,
            &self.archived_data_path,
            &self.state_dir,
        ];
        if paths.iter().any(|p| p.trim().is_empty()) {
            return Err(CliError::config("all configured paths must be non-empty"));
        }
        if self.raw_data_path == self.processed_data_path
            || self.raw_data_path == self.archived_data_path
            || self.processed_data_path == self.archived_data_path
        {
            return Err(CliError::config(
                "raw, processed, and archived paths must be distinct",
            ));
        }
        Ok(())
    }

    pub fn staging_paths(&self) -> StagingPaths {
        StagingPaths::new(
            PathBuf::from(&self.raw_data_path),
            PathBuf::from(&self.processed_data_path),
            PathBuf::from(&self.archived_data_path),
        )
    }
}

/// Parses arguments and dispatches the chosen command.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    match cli.command {
        Command::Init { config } => cmd_init(&config),
        Command::Run {
            config,
            kind,
            date,
            hour,
        } => cmd_run(&config, &kind, &date, hour),
        Command::RunAll { config, kind } => cmd_run_all(&config, kind.as_deref()),
    }
}

fn cmd_init(config_path: &Path) -> CliResult<()> {
    let config = if config_path.exists() {
        Config::load(config_path)?
    } else {
        let config = Config::default();
        let content = serde_json::to_string_pretty(&config)?;
        fs::write(config_path, content)?;
        config
    };

    for dir in [
        &config.raw_data_path,
        &config.processed_data_path,
        &config.archived_data_path,
        &config.state_dir,
    ] {
        fs::create_dir_all(dir)?;
    }

    log(
        Severity::Info,
        "INITIALIZED",
        &[("config", &config_path.display().to_string())],
    );
    Ok(())
}

fn cmd_run(config_path: &Path, kind: &str, date: &str, hour: u8) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let kind = parse_kind(kind)?;
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|e| CliError::usage(format!("invalid --date '{}': {}", date, e)))?;
    let partition = BatchPartition::new(kind, date, hour)
        .ok_or_else(|| CliError::usage(format!("invalid --hour {} (expected 0-23)", hour)))?;

    let gateway = FileGateway::open(&config.state_dir)?;
    let runner = BatchRunner::new(config.staging_paths(), &gateway);
    let summary = runner.run_partition(partition)?;
    print_summary(&summary);
    Ok(())
}

fn cmd_run_all(config_path: &Path, kind: Option<&str>) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let kinds: Vec<DatasetKind> = match kind {
        Some(raw) => vec![parse_kind(raw)?],
        None => DatasetKind::ALL.to_vec(),
    };

    let gateway = FileGateway::open(&config.state_dir)?;
    let runner = BatchRunner::new(config.staging_paths(), &gateway);
    for kind in kinds {
        for summary in runner.run_all(kind)? {
            print_summary(&summary);
        }
    }
    Ok(())
}

fn parse_kind(raw: &str) -> CliResult<DatasetKind> {
    DatasetKind::parse(raw).ok_or_else(|| {
        CliError::usage(format!(
            "unknown dataset kind '{}' (expected customers, transactions, products, or erasure-requests)",
            raw
        ))
    })
}

fn print_summary(summary: &BatchSummary) {
    log(
        Severity::Info,
        "SUMMARY",
        &[
            ("partition", &summary.partition.to_string()),
            ("extracted", &summary.extracted.to_string()),
            ("accepted", &summary.accepted.to_string()),
            ("quarantined", &summary.quarantined.to_string()),
        ],
    );
}
