//! Erasure processing errors.

use thiserror::Error;

/// Result type for erasure operations
pub type ErasureResult<T> = Result<T, ErasureError>;

#[derive(Debug, Error)]
pub enum ErasureError {
    #[error("staged file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("staged file {path}: malformed record: {source}")]
    MalformedRecord {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Storage(#[from] crate::storage::StorageError),
}

impl ErasureError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        ErasureError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn malformed(path: impl Into<String>, source: serde_json::Error) -> Self {
        ErasureError::MalformedRecord {
            path: path.into(),
            source,
        }
    }
}
