//! The partition runner.
//!
//! One `run_partition` call is one batch attempt: reference snapshot,
//! extraction, routing, one atomic flush, processed-data load, exactly
//! one statistics row, then archive and cleanup of the consumed staging
//! file. Decisions buffer in memory until the flush; a failure before
//! the flush durably writes nothing but the statistics row.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::Value;

use crate::accountant::BatchAccountant;
use crate::dataset::{parse_date_dir, parse_hour_dir, BatchPartition, DatasetKind};
use crate::erasure::ErasureProcessor;
use crate::observability::{log, log_error, Severity};
use crate::router::{DecisionBatch, Router};
use crate::semantic::ReferenceSnapshot;
use crate::storage::{StorageError, StorageGateway};

use super::archive::{archive_file, cleanup_empty_dirs};
use super::errors::BatchResult;
use super::extract::{extract_records, staged_file_for};
use super::load::load_processed;

/// The three staging area roots.
#[derive(Debug, Clone)]
pub struct StagingPaths {
    pub raw_data: PathBuf,
    pub processed_data: PathBuf,
    pub archived_data: PathBuf,
}

impl StagingPaths {
    pub fn new(
        raw_data: impl Into<PathBuf>,
        processed_data: impl Into<PathBuf>,
        archived_data: impl Into<PathBuf>,
    ) -> Self {
        Self {
            raw_data: raw_data.into(),
            processed_data: processed_data.into(),
            archived_data: archived_data.into(),
        }
    }

    /// Conventional layout under one root: `raw_data`, `processed_data`,
    /// `archived_data`.
    pub fn under(root: &Path) -> Self {
        Self::new(
            root.join("raw_data"),
            root.join("processed_data"),
            root.join("archived_data"),
        )
    }
}

/// Outcome of one partition run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub partition: BatchPartition,
    pub extracted: usize,
    pub accepted: usize,
    pub quarantined: usize,
}

/// Orchestrates batches for one gateway and staging layout.
pub struct BatchRunner<'a, G: StorageGateway> {
    paths: StagingPaths,
    gateway: &'a G,
    router: Router,
    erasure: ErasureProcessor,
}

impl<'a, G: StorageGateway> BatchRunner<'a, G> {
    pub fn new(paths: StagingPaths, gateway: &'a G) -> Self {
        Self {
            paths,
            gateway,
            router: Router::new(),
            erasure: ErasureProcessor::new(),
        }
    }

    /// Runs one partition end to end.
    ///
    /// A statistics row is emitted on every path out of this function,
    /// with whatever count was reached: zero if the reference snapshot
    /// was unavailable, partial if the flush failed, full otherwise.
    pub fn run_partition(&self, partition: BatchPartition) -> BatchResult<BatchSummary> {
        let mut accountant = BatchAccountant::start(partition);
        let partition_label = partition.to_string();
        log(
            Severity::Info,
            "BATCH_START",
            &[("partition", &partition_label)],
        );

        let refs = match self.reference_snapshot(partition.kind) {
            Ok(refs) => refs,
            Err(e) => {
                log_error(
                    "REFERENCE_SNAPSHOT_UNAVAILABLE",
                    &[("partition", &partition_label), ("error", &e.to_string())],
                );
                let _ = accountant.emit(self.gateway);
                return Err(e.into());
            }
        };

        let staged = staged_file_for(&self.paths.raw_data, partition);
        let records = match &staged {
            Some(file) => match extract_records(file) {
                Ok(records) => records,
                Err(e) => {
                    let _ = accountant.emit(self.gateway);
                    return Err(e);
                }
            },
            None => {
                log(
                    Severity::Warn,
                    "NO_STAGED_DATA",
                    &[("partition", &partition_label)],
                );
                Vec::new()
            }
        };
        let extracted = records.len();

        let mut batch = DecisionBatch::new(partition);
        for record in records {
            let decision = self.router.route(record, partition.kind, &refs);
            accountant.record_processed();

            for warning in &decision.warnings {
                log(
                    Severity::Warn,
                    "SOFT_RULE_WARNING",
                    &[
                        ("partition", &partition_label),
                        ("warning", &warning.to_string()),
                    ],
                );
            }
            if let Some(reason) = &decision.reason {
                log(
                    Severity::Debug,
                    "RECORD_QUARANTINED",
                    &[("partition", &partition_label), ("reason", reason)],
                );
            }
            batch.decisions.push(decision);
        }

        stamp_last_change(&mut batch);

        if let Err(e) = self.gateway.flush(&batch) {
            log_error(
                "BATCH_FLUSH_FAILED",
                &[("partition", &partition_label), ("error", &e.to_string())],
            );
            let _ = accountant.emit(self.gateway);
            return Err(e.into());
        }

        if partition.kind == DatasetKind::ErasureRequests {
            self.erasure.anonymize_staged(
                &batch,
                self.gateway,
                &self.paths.processed_data,
                &self.paths.archived_data,
            );
        } else {
            let accepted: Vec<Value> = batch.accepted().map(|d| d.record.clone()).collect();
            if let Err(e) = load_processed(&accepted, &self.paths.processed_data, partition) {
                let _ = accountant.emit(self.gateway);
                return Err(e);
            }
        }

        accountant.emit(self.gateway)?;

        if let Some(file) = &staged {
            archive_file(file, &self.paths.archived_data, partition)?;
        }
        cleanup_empty_dirs(&self.paths.raw_data)?;

        let summary = BatchSummary {
            partition,
            extracted,
            accepted: batch.accepted_count(),
            quarantined: batch.quarantined_count(),
        };
        log(
            Severity::Info,
            "BATCH_DONE",
            &[
                ("partition", &partition_label),
                ("extracted", &summary.extracted.to_string()),
                ("accepted", &summary.accepted.to_string()),
                ("quarantined", &summary.quarantined.to_string()),
            ],
        );
        Ok(summary)
    }

    /// Walks the staging area in sorted date/hour order and runs every
    /// partition that stages a file for `kind`. A failed partition is
    /// logged and surfaced for orchestrator retry without stopping the
    /// remaining partitions.
    pub fn run_all(&self, kind: DatasetKind) -> BatchResult<Vec<BatchSummary>> {
        let raw = &self.paths.raw_data;
        if !raw.is_dir() {
            log(
                Severity::Warn,
                "NO_STAGING_AREA",
                &[("path", &raw.display().to_string())],
            );
            return Ok(Vec::new());
        }

        let mut summaries = Vec::new();
        for (date, date_path) in sorted_subdirs(raw, parse_date_dir)? {
            for (hour, _) in sorted_subdirs(&date_path, parse_hour_dir)? {
                let Some(partition) = BatchPartition::new(kind, date, hour) else {
                    continue;
                };
                if staged_file_for(raw, partition).is_none() {
                    continue;
                }
                match self.run_partition(partition) {
                    Ok(summary) => summaries.push(summary),
                    Err(e) => {
                        log_error(
                            "BATCH_FAILED",
                            &[
                                ("partition", &partition.to_string()),
                                ("error", &e.to_string()),
                            ],
                        );
                    }
                }
            }
        }
        Ok(summaries)
    }

    /// Builds the per-batch reference snapshot. Kinds that need no
    /// reference data validate against an empty snapshot without
    /// touching the gateway.
    fn reference_snapshot(&self, kind: DatasetKind) -> Result<ReferenceSnapshot, StorageError> {
        match kind {
            DatasetKind::Customers | DatasetKind::Products => Ok(ReferenceSnapshot::empty()),
            DatasetKind::Transactions => Ok(ReferenceSnapshot::new(
                self.read_refs(DatasetKind::Customers)?,
                self.read_refs(DatasetKind::Products)?,
            )),
            DatasetKind::ErasureRequests => Ok(ReferenceSnapshot::new(
                self.read_refs(DatasetKind::Customers)?,
                BTreeSet::new(),
            )),
        }
    }

    fn read_refs(&self, kind: DatasetKind) -> Result<BTreeSet<i64>, StorageError> {
        self.gateway
            .read_reference_set(kind)
            .map_err(|e| StorageError::ReferenceUnavailable {
                kind,
                reason: e.to_string(),
            })
    }
}

/// Stamps `last_change` on accepted customer and product records before
/// they are flushed and loaded, as write-side bookkeeping.
fn stamp_last_change(batch: &mut DecisionBatch) {
    if !matches!(
        batch.partition.kind,
        DatasetKind::Customers | DatasetKind::Products
    ) {
        return;
    }
    let stamp = Value::String(Utc::now().to_rfc3339());
    for decision in batch.decisions.iter_mut().filter(|d| d.is_canonical()) {
        if let Some(obj) = decision.record.as_object_mut() {
            obj.insert("last_change".to_string(), stamp.clone());
        }
    }
}

fn sorted_subdirs<T: Ord + Copy>(
    root: &Path,
    parse: impl Fn(&str) -> Option<T>,
) -> BatchResult<Vec<(T, PathBuf)>> {
    let display = root.display().to_string();
    let mut found = Vec::new();
    for entry in
        std::fs::read_dir(root).map_err(|e| super::errors::BatchError::io(display.as_str(), e))?
    {
        let entry = entry.map_err(|e| super::errors::BatchError::io(display.as_str(), e))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(key) = parse(name) {
            found.push((key, path));
        }
    }
    found.sort_by_key(|(key, _)| *key);
    Ok(found)
}
