//! Semantic business rules over structurally-valid records.
//!
//! Rules run against a read-only reference snapshot supplied per batch;
//! the checker itself is pure and never touches storage.

mod checker;
mod errors;
mod snapshot;

pub use checker::{validate_semantics, SemanticWarning};
pub use errors::{SemanticError, SemanticResult};
pub use snapshot::ReferenceSnapshot;
