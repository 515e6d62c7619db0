//! The `StorageGateway` trait and its row types.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::accountant::ProcessingStatistics;
use crate::dataset::{BatchPartition, DatasetKind};
use crate::router::{DecisionBatch, Destination};

use super::errors::StorageResult;

/// A canonical row: the accepted record plus write-time bookkeeping.
///
/// `processed_at` is stamped by the gateway at write time; the core never
/// sets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRow {
    pub record_date: NaiveDate,
    pub record_hour: u8,
    pub record: Value,
    pub processed_at: DateTime<Utc>,
}

/// A quarantine row: the rejected record as received, the first violated
/// rule, and a creation timestamp. Quarantine is append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarantineRow {
    pub record_date: NaiveDate,
    pub record_hour: u8,
    pub record: Value,
    pub error_message: String,
    pub created_at: DateTime<Utc>,
}

/// Persistence operations consumed by the router, the accountant, and the
/// erasure processor.
///
/// Implementations must make every operation idempotent at the identity
/// key and are responsible for whatever transactional isolation `flush`
/// needs to make a decision batch atomic.
pub trait StorageGateway {
    /// Upserts an accepted record at its identity key (last write wins).
    fn upsert_canonical(&self, partition: BatchPartition, record: &Value) -> StorageResult<()>;

    /// Appends a rejected record with the first violated rule as reason.
    fn insert_quarantine(
        &self,
        partition: BatchPartition,
        record: &Value,
        reason: &str,
    ) -> StorageResult<()>;

    /// Writes one statistics row for a batch attempt.
    fn insert_statistics(&self, stats: &ProcessingStatistics) -> StorageResult<()>;

    /// Reads the known identities of a reference kind (customer ids,
    /// product SKUs) as of now.
    fn read_reference_set(&self, kind: DatasetKind) -> StorageResult<BTreeSet<i64>>;

    /// The partition a canonical identity was written under, if the
    /// gateway tracks it. The erasure processor uses this to locate a
    /// subject's staged files.
    fn locate_canonical(
        &self,
        kind: DatasetKind,
        identity: &str,
    ) -> StorageResult<Option<(NaiveDate, u8)>> {
        let _ = (kind, identity);
        Ok(None)
    }

    /// Applies a whole decision batch. The default implementation walks
    /// the decisions in order over the primitive operations; transactional
    /// gateways may override to make the group atomic.
    fn flush(&self, batch: &DecisionBatch) -> StorageResult<()> {
        for decision in &batch.decisions {
            match decision.destination {
                Destination::Canonical => {
                    self.upsert_canonical(batch.partition, &decision.record)?;
                }
                Destination::Quarantine => {
                    let reason = decision.reason.as_deref().unwrap_or("unspecified");
                    self.insert_quarantine(batch.partition, &decision.record, reason)?;
                }
            }
        }
        Ok(())
    }
}
