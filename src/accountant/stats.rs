//! Processing statistics rows.

use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dataset::{BatchPartition, DatasetKind};

/// One batch attempt's accounting: how many records were attempted and
/// how long the partition took, keyed by (dataset type, date, hour).
///
/// `record_count` counts every attempted record, quarantined ones
/// included; a record that was read is always accounted somewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingStatistics {
    pub dataset_type: DatasetKind,
    pub record_date: NaiveDate,
    pub record_hour: u8,
    pub record_count: u64,
    pub processing_time: Duration,
}

impl ProcessingStatistics {
    pub fn new(partition: BatchPartition, record_count: u64, processing_time: Duration) -> Self {
        Self {
            dataset_type: partition.kind,
            record_date: partition.record_date,
            record_hour: partition.record_hour,
            record_count,
            processing_time,
        }
    }

    /// The partition this row accounts for.
    pub fn partition(&self) -> BatchPartition {
        BatchPartition {
            kind: self.dataset_type,
            record_date: self.record_date,
            record_hour: self.record_hour,
        }
    }
}
