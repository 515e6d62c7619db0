//! Storage gateway errors.
//!
//! Any of these aborts the batch: the core never retries storage on its
//! own. The orchestrator retries the whole batch, which is safe because
//! writes are idempotent at the identity key.

use thiserror::Error;

use crate::dataset::DatasetKind;

/// Result type for gateway operations
pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("write failed: {0}")]
    WriteFailed(String),

    /// The reference snapshot could not be obtained; the batch cannot
    /// validate semantics and must fail before routing anything.
    #[error("reference set unavailable for {kind}: {reason}")]
    ReferenceUnavailable { kind: DatasetKind, reason: String },

    #[error("no reference set is defined for {kind}")]
    UnsupportedReference { kind: DatasetKind },

    #[error("record has no usable '{field}' identity for {kind}")]
    MissingIdentity {
        kind: DatasetKind,
        field: &'static str,
    },
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::WriteFailed(e.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::WriteFailed(format!("serialization: {}", e))
    }
}
