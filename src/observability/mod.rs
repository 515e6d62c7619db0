//! Observability: structured logging for batch processing.

mod logger;

pub use logger::{log, log_error, Severity};
