//! File-backed gateway.
//!
//! Persists gateway state under a single directory so the CLI can run
//! without the external relational store:
//!
//! - `canonical_<kind>.json` — identity-keyed map, rewritten on flush
//! - `quarantine_<kind>.ndjson` — append-only, one row per line
//! - `statistics.ndjson` — append-only, one row per line
//!
//! All state is loaded at open; writes go through memory first and are
//! persisted before the call returns.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use serde_json::Value;

use crate::accountant::ProcessingStatistics;
use crate::dataset::{BatchPartition, DatasetKind};
use crate::router::DecisionBatch;

use super::errors::{StorageError, StorageResult};
use super::gateway::{CanonicalRow, QuarantineRow, StorageGateway};

#[derive(Debug, Default)]
struct Inner {
    canonical: HashMap<DatasetKind, BTreeMap<String, CanonicalRow>>,
}

/// Gateway persisting to JSON/NDJSON files under a state directory.
#[derive(Debug)]
pub struct FileGateway {
    state_dir: PathBuf,
    inner: Mutex<Inner>,
}

impl FileGateway {
    /// Opens (or initializes) a state directory and loads the canonical
    /// maps.
    pub fn open(state_dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let state_dir = state_dir.into();
        fs::create_dir_all(&state_dir)?;

        let mut inner = Inner::default();
        for kind in DatasetKind::ALL {
            let path = canonical_path(&state_dir, kind);
            if path.exists() {
                let content = fs::read_to_string(&path)?;
                let rows: BTreeMap<String, CanonicalRow> = serde_json::from_str(&content)?;
                inner.canonical.insert(kind, rows);
            }
        }

        Ok(Self {
            state_dir,
            inner: Mutex::new(inner),
        })
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    pub fn canonical_count(&self, kind: DatasetKind) -> usize {
        self.lock()
            .canonical
            .get(&kind)
            .map(BTreeMap::len)
            .unwrap_or(0)
    }

    /// Quarantine rows for a kind, re-read from disk.
    pub fn quarantine_rows(&self, kind: DatasetKind) -> StorageResult<Vec<QuarantineRow>> {
        read_ndjson(&quarantine_path(&self.state_dir, kind))
    }

    /// Statistics rows, re-read from disk.
    pub fn statistics(&self) -> StorageResult<Vec<ProcessingStatistics>> {
        read_ndjson(&self.state_dir.join("statistics.ndjson"))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn persist_canonical(&self, kind: DatasetKind, inner: &Inner) -> StorageResult<()> {
        let empty = BTreeMap::new();
        let rows = inner.canonical.get(&kind).unwrap_or(&empty);
        let content = serde_json::to_string_pretty(rows)?;
        fs::write(canonical_path(&self.state_dir, kind), content)?;
        Ok(())
    }

    fn apply_upsert(
        &self,
        inner: &mut Inner,
        partition: BatchPartition,
        record: &Value,
    ) -> StorageResult<()> {
        let identity = partition.kind.identity_of(record).ok_or({
            StorageError::MissingIdentity {
                kind: partition.kind,
                field: partition.kind.identity_field(),
            }
        })?;
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
}

impl StorageGateway for FileGateway {
    fn upsert_canonical(&self, partition: BatchPartition, record: &Value) -> StorageResult<()> {
        let mut inner = self.lock();
        self.apply_upsert(&mut inner, partition, record)?;
        self.persist_canonical(partition.kind, &inner)
    }

    fn insert_quarantine(
        &self,
        partition: BatchPartition,
        record: &Value,
        reason: &str,
    ) -> StorageResult<()> {
        let row = QuarantineRow {
            record_date: partition.record_date,
            record_hour: partition.record_hour,
            record: record.clone(),
            error_message: reason.to_string(),
            created_at: Utc::now(),
        };
        append_ndjson(&quarantine_path(&self.state_dir, partition.kind), &row)
    }

    fn insert_statistics(&self, stats: &ProcessingStatistics) -> StorageResult<()> {
        append_ndjson(&self.state_dir.join("statistics.ndjson"), stats)
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

    /// Applies the whole batch in memory, then persists the canonical map
    /// once and appends all quarantine rows in one write.
    fn flush(&self, batch: &DecisionBatch) -> StorageResult<()> {
        let mut inner = self.lock();
        let mut quarantine_lines = String::new();

        for decision in &batch.decisions {
            if decision.is_canonical() {
                self.apply_upsert(&mut inner, batch.partition, &decision.record)?;
            } else {
                let row = QuarantineRow {
                    record_date: batch.partition.record_date,
                    record_hour: batch.partition.record_hour,
                    record: decision.record.clone(),
                    error_message: decision
                        .reason
                        .clone()
                        .unwrap_or_else(|| "unspecified".to_string()),
                    created_at: Utc::now(),
                };
                quarantine_lines.push_str(&serde_json::to_string(&row)?);
                quarantine_lines.push('\n');
            }
        }

        self.persist_canonical(batch.partition.kind, &inner)?;
        if !quarantine_lines.is_empty() {
            let path = quarantine_path(&self.state_dir, batch.partition.kind);
            let mut file = OpenOptions::new().create(true).append(true).open(path)?;
            file.write_all(quarantine_lines.as_bytes())?;
        }
        Ok(())
    }
}

fn canonical_path(state_dir: &Path, kind: DatasetKind) -> PathBuf {
    state_dir.join(format!("canonical_{}.json", kind))
}

fn quarantine_path(state_dir: &Path, kind: DatasetKind) -> PathBuf {
    state_dir.join(format!("quarantine_{}.ndjson", kind))
}

fn append_ndjson<T: serde::Serialize>(path: &Path, row: &T) -> StorageResult<()> {
    let mut line = serde_json::to_string(row)?;
    line.push('\n');
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(line.as_bytes())?;
    Ok(())
}

fn read_ndjson<T: serde::de::DeserializeOwned>(path: &Path) -> StorageResult<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path)?;
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(StorageError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;
    use tempfile::TempDir;

    fn partition(kind: DatasetKind) -> BatchPartition {
        BatchPartition::new(kind, NaiveDate::from_ymd_opt(2023, 11, 1).unwrap(), 5).unwrap()
    }

    #[test]
    fn test_canonical_survives_reopen() {
        let tmp = TempDir::new().unwrap();
        let p = partition(DatasetKind::Customers);

        {
            let gateway = FileGateway::open(tmp.path()).unwrap();
            gateway
                .upsert_canonical(p, &json!({"id": 1, "email": "a@b.com"}))
                .unwrap();
        }

        let reopened = FileGateway::open(tmp.path()).unwrap();
        assert_eq!(reopened.canonical_count(DatasetKind::Customers), 1);
        let refs = reopened.read_reference_set(DatasetKind::Customers).unwrap();
        assert!(refs.contains(&1));
    }

    #[test]
    fn test_upsert_overwrites_across_reopens() {
        let tmp = TempDir::new().unwrap();
        let p = partition(DatasetKind::Products);

        {
            let gateway = FileGateway::open(tmp.path()).unwrap();
            gateway
                .upsert_canonical(p, &json!({"sku": 5, "name": "old"}))
                .unwrap();
        }
        {
            let gateway = FileGateway::open(tmp.path()).unwrap();
            gateway
                .upsert_canonical(p, &json!({"sku": 5, "name": "new"}))
                .unwrap();
            assert_eq!(gateway.canonical_count(DatasetKind::Products), 1);
        }
    }

    #[test]
    fn test_quarantine_and_statistics_append() {
        let tmp = TempDir::new().unwrap();
        let gateway = FileGateway::open(tmp.path()).unwrap();
        let p = partition(DatasetKind::Customers);

        gateway
            .insert_quarantine(p, &json!({"id": 1}), "bad email")
            .unwrap();
        gateway
            .insert_quarantine(p, &json!({"id": 1}), "still bad")
            .unwrap();
        gateway
            .insert_statistics(&ProcessingStatistics::new(
                p,
                2,
                std::time::Duration::from_millis(10),
            ))
            .unwrap();

        let rows = gateway.quarantine_rows(DatasetKind::Customers).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].error_message, "still bad");
        assert_eq!(gateway.statistics().unwrap().len(), 1);
    }
}
