//! The batch accountant.
//!
//! One accountant wraps one partition run. The monotonic timer starts at
//! construction, before the first record is routed; `emit` writes exactly
//! one statistics row per run attempt, no matter how often it is called
//! or how the run ended. Aborted runs emit the partial count; a run that
//! never routed anything emits a zero-count row.

use std::time::Instant;

use crate::dataset::BatchPartition;
use crate::storage::{StorageGateway, StorageResult};

use super::stats::ProcessingStatistics;

/// Timing and counting for one batch attempt.
#[derive(Debug)]
pub struct BatchAccountant {
    partition: BatchPartition,
    started: Instant,
    processed: u64,
    emitted: bool,
}

impl BatchAccountant {
    /// Starts the clock for a partition run.
    pub fn start(partition: BatchPartition) -> Self {
        Self {
            partition,
            started: Instant::now(),
            processed: 0,
            emitted: false,
        }
    }

    /// Counts one attempted record, whichever way it routed.
    pub fn record_processed(&mut self) {
        self.processed += 1;
    }

    pub fn processed(&self) -> u64 {
        self.processed
    }

    pub fn partition(&self) -> BatchPartition {
        self.partition
    }

    /// The statistics row this run would emit right now.
    pub fn snapshot(&self) -> ProcessingStatistics {
        ProcessingStatistics::new(self.partition, self.processed, self.started.elapsed())
    }

    /// Writes the statistics row. At most once per accountant: later
    /// calls are no-ops, so abort paths can emit unconditionally without
    /// double-counting a row that already went out.
    pub fn emit(&mut self, gateway: &dyn StorageGateway) -> StorageResult<()> {
        if self.emitted {
            return Ok(());
        }
        gateway.insert_statistics(&self.snapshot())?;
        self.emitted = true;
        Ok(())
    }

    pub fn has_emitted(&self) -> bool {
        self.emitted
    }
}
