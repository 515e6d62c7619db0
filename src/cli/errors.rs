//! CLI-specific error types.
//!
//! Every CLI error is fatal for the invocation; main prints it and exits
//! non-zero.

use thiserror::Error;

use crate::batch::BatchError;
use crate::storage::StorageError;

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid usage: {0}")]
    Usage(String),

    #[error("not initialized: {0}. Run 'datasieve init' first.")]
    NotInitialized(String),

    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl CliError {
    pub fn config(msg: impl Into<String>) -> Self {
        CliError::Config(msg.into())
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        CliError::Usage(msg.into())
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Config(format!("JSON error: {}", e))
    }
}
