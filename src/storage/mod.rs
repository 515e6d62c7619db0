//! The storage gateway seam.
//!
//! The core routes and accounts; a `StorageGateway` implementation
//! persists. All gateway operations are idempotent at the identity key,
//! so a retried batch re-applies the same writes safely.

mod errors;
mod gateway;
mod jsonl;
mod memory;

pub use errors::{StorageError, StorageResult};
pub use gateway::{CanonicalRow, QuarantineRow, StorageGateway};
pub use jsonl::FileGateway;
pub use memory::MemoryGateway;
