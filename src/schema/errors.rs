//! Structural validation errors.
//!
//! A `ShapeError` names the first violated structural rule: the offending
//! field path and what was expected there. Its `Display` rendering is the
//! quarantine reason string, so it must stay human-readable.

use thiserror::Error;

/// Result type for shape validation
pub type ShapeResult<T> = Result<T, ShapeError>;

/// Structural contract violation, fail-fast (first violation only).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("record is not a JSON object (got {actual})")]
    NotAnObject { actual: &'static str },

    #[error("field '{path}': required field is missing")]
    MissingField { path: String },

    #[error("field '{path}': undeclared field is not allowed")]
    UndeclaredField { path: String },

    #[error("field '{path}': expected {expected}, got {actual}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        actual: String,
    },

    #[error("field '{path}': null is not allowed")]
    NullValue { path: String },
}

impl ShapeError {
    pub fn missing(path: impl Into<String>) -> Self {
        ShapeError::MissingField { path: path.into() }
    }

    pub fn undeclared(path: impl Into<String>) -> Self {
        ShapeError::UndeclaredField { path: path.into() }
    }

    pub fn mismatch(
        path: impl Into<String>,
        expected: &'static str,
        actual: impl Into<String>,
    ) -> Self {
        ShapeError::TypeMismatch {
            path: path.into(),
            expected,
            actual: actual.into(),
        }
    }

    pub fn null(path: impl Into<String>) -> Self {
        ShapeError::NullValue { path: path.into() }
    }

    /// The offending field path, if the error is field-scoped.
    pub fn path(&self) -> Option<&str> {
        match self {
            ShapeError::NotAnObject { .. } => None,
            ShapeError::MissingField { path }
            | ShapeError::UndeclaredField { path }
            | ShapeError::TypeMismatch { path, .. }
            | ShapeError::NullValue { path } => Some(path),
        }
    }
}
