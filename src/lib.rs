//! datasieve - A strict, deterministic hourly batch validation and routing pipeline
//!
//! Hourly batches of customer, transaction, product, and erasure-request
//! records are validated against closed structural contracts and semantic
//! business rules, then routed into canonical or quarantine storage with a
//! stated reason. Every batch attempt leaves exactly one statistics row.

pub mod accountant;
pub mod batch;
pub mod cli;
pub mod dataset;
pub mod erasure;
pub mod observability;
pub mod router;
pub mod schema;
pub mod semantic;
pub mod storage;
