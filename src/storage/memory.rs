//! In-memory gateway.
//!
//! Reference implementation for tests and embedded use: canonical maps
//! with last-write-wins upserts, append-only quarantine, statistics rows.
//! Write failures can be injected to exercise abort paths.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Mutex;

use chrono::Utc;
use serde_json::Value;

use crate::accountant::ProcessingStatistics;
use crate::dataset::{BatchPartition, DatasetKind};

use super::errors::{StorageError, StorageResult};
use super::gateway::{CanonicalRow, QuarantineRow, StorageGateway};

#[derive(Debug, Default)]
struct Inner {
    canonical: HashMap<DatasetKind, BTreeMap<String, CanonicalRow>>,
    quarantine: HashMap<DatasetKind, Vec<QuarantineRow>>,
    statistics: Vec<ProcessingStatistics>,
    fail_writes: bool,
}

/// Gateway backed by process memory.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    inner: Mutex<Inner>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// When set, every write fails with `StorageError::WriteFailed`.
    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Accepted records for a kind, ordered by identity key.
    pub fn canonical_records(&self, kind: DatasetKind) -> Vec<Value> {
        self.lock()
            .canonical
            .get(&kind)
            .map(|rows| rows.values().map(|row| row.record.clone()).collect())
            .unwrap_or_default()
    }

    /// The canonical row at an identity key, if present.
    pub fn canonical_row(&self, kind: DatasetKind, identity: &str) -> Option<CanonicalRow> {
        self.lock()
            .canonical
            .get(&kind)
            .and_then(|rows| rows.get(identity))
            .cloned()
    }

    pub fn canonical_count(&self, kind: DatasetKind) -> usize {
        self.lock()
            .canonical
            .get(&kind)
            .map(BTreeMap::len)
            .unwrap_or(0)
    }

    /// Quarantine rows for a kind, in insertion order.
    pub fn quarantine_rows(&self, kind: DatasetKind) -> Vec<QuarantineRow> {
        self.lock()
            .quarantine
            .get(&kind)
            .cloned()
            .unwrap_or_default()
    }

    pub fn quarantine_count(&self, kind: DatasetKind) -> usize {
        self.lock()
            .quarantine
            .get(&kind)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// All statistics rows, in emission order.
    pub fn statistics(&self) -> Vec<ProcessingStatistics> {
        self.lock().statistics.clone()
    }

    /// Seeds a canonical record directly, bypassing routing. Test setup
    /// for reference data.
    pub fn seed_canonical(&self, partition: BatchPartition, record: Value) {
        let identity = partition
            .kind
            .identity_of(&record)
            .expect("seeded record must carry its identity field");
        self.lock()
            .canonical
            .entry(partition.kind)
            .or_default()
            .insert(
                identity,
                CanonicalRow {
                    record_date: partition.record_date,
                    record_hour: partition.record_hour,
                    record,
                    processed_at: Utc::now(),
                },
            );
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // Lock poisoning only happens if a writer panicked; the data is
        // plain rows, safe to keep serving.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl StorageGateway for MemoryGateway {
    fn upsert_canonical(&self, partition: BatchPartition, record: &Value) -> StorageResult<()> {
        let identity = partition.kind.identity_of(record).ok_or({
            StorageError::MissingIdentity {
                kind: partition.kind,
                field: partition.kind.identity_field(),
            }
        })?;

        let mut inner = self.lock();
        if inner.fail_writes {
            return Err(StorageError::WriteFailed("injected failure".into()));
        }
        inner.canonical.entry(partition.kind).or_default().insert(
            identity,
            CanonicalRow {
                record_date: partition.record_date,
                record_hour: partition.record_hour,
                record: record.clone(),
                processed_at: Utc::now(),
            },
        );
        Ok(())
    }

    fn insert_quarantine(
        &self,
        partition: BatchPartition,
        record: &Value,
        reason: &str,
    ) -> StorageResult<()> {
        let mut inner = self.lock();
        if inner.fail_writes {
            return Err(StorageError::WriteFailed("injected failure".into()));
        }
        inner
            .quarantine
            .entry(partition.kind)
            .or_default()
            .push(QuarantineRow {
                record_date: partition.record_date,
                record_hour: partition.record_hour,
                record: record.clone(),
                error_message: reason.to_string(),
                created_at: Utc::now(),
            });
        Ok(())
    }

    fn insert_statistics(&self, stats: &ProcessingStatistics) -> StorageResult<()> {
        let mut inner = self.lock();
        if inner.fail_writes {
            return Err(StorageError::WriteFailed("injected failure".into()));
        }
        inner.statistics.push(stats.clone());
        Ok(())
    }

    fn read_reference_set(&self, kind: DatasetKind) -> StorageResult<BTreeSet<i64>> {
        match kind {
            DatasetKind::Customers | DatasetKind::Products => {}
            other => return Err(StorageError::UnsupportedReference { kind: other }),
        }

        let inner = self.lock();
        let ids = inner
            .canonical
            .get(&kind)
            .map(|rows| {
                rows.keys()
                    .filter_map(|identity| identity.parse::<i64>().ok())
                    .collect()
            })
            .unwrap_or_default();
        Ok(ids)
    }

    fn locate_canonical(
        &self,
        kind: DatasetKind,
        identity: &str,
    ) -> StorageResult<Option<(chrono::NaiveDate, u8)>> {
        Ok(self
            .lock()
            .canonical
            .get(&kind)
            .and_then(|rows| rows.get(identity))
            .map(|row| (row.record_date, row.record_hour)))
    }
}
