//! Batch accounting: timing, counting, exactly-once statistics emission.

mod accountant;
mod stats;

pub use accountant::BatchAccountant;
pub use stats::ProcessingStatistics;
