//! Batch orchestration errors.

use thiserror::Error;

use crate::storage::StorageError;

/// Result type for batch operations
pub type BatchResult<T> = Result<T, BatchError>;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("staging i/o at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed staged record in {path}: {source}")]
    MalformedStagedData {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Storage failures abort the batch; partial statistics were emitted
    /// before this surfaced.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl BatchError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        BatchError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn malformed(path: impl Into<String>, source: serde_json::Error) -> Self {
        BatchError::MalformedStagedData {
            path: path.into(),
            source,
        }
    }
}
