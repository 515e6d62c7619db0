//! The erasure processor: routing plus staged-file anonymization.
//!
//! Routing reuses the standard decision procedure (shape contract, then
//! the known-subject rule). What makes erasure special happens after the
//! flush: every accepted request anonymizes the subject's email in the
//! staged processed customer file for the partition where that customer
//! was written, then archives the rewritten file.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::dataset::{date_dir_name, hour_dir_name, BatchPartition, DatasetKind};
use crate::observability::{log, log_error, Severity};
use crate::router::{DecisionBatch, Router};
use crate::semantic::ReferenceSnapshot;
use crate::storage::StorageGateway;

use super::anonymizer::{anonymize_customer_file, anonymize_email};

/// Router specialization for erasure requests.
#[derive(Debug, Clone, Default)]
pub struct ErasureProcessor {
    router: Router,
}

impl ErasureProcessor {
    pub fn new() -> Self {
        Self {
            router: Router::new(),
        }
    }

    /// Decides a batch of erasure requests against the known customers.
    ///
    /// Accepted requests become canonical rows keyed by the subject's
    /// customer id when flushed, so resubmitting a request is a no-op
    /// overwrite.
    pub fn decide(
        &self,
        records: Vec<Value>,
        partition: BatchPartition,
        refs: &ReferenceSnapshot,
    ) -> DecisionBatch {
        debug_assert_eq!(partition.kind, DatasetKind::ErasureRequests);
        self.router.route_batch(records, partition, refs)
    }

    /// Anonymizes staged processed customer data for every accepted
    /// request in the batch and archives the rewritten files.
    ///
    /// Failures on individual files are logged and skipped; the request
    /// itself is already recorded as processed, and the compaction job
    /// owns the durable cleanup.
    pub fn anonymize_staged(
        &self,
        batch: &DecisionBatch,
        gateway: &dyn StorageGateway,
        processed_root: &Path,
        archived_root: &Path,
    ) -> usize {
        let mut files_touched = 0;

        for decision in batch.accepted() {
            let Some(customer_id) = decision.record.get("customer-id").and_then(Value::as_i64)
            else {
                continue;
            };
            let Some(email) = decision.record.get("email").and_then(Value::as_str) else {
                continue;
            };

            let located =
                gateway.locate_canonical(DatasetKind::Customers, &customer_id.to_string());
            let (date, hour) = match located {
                Ok(Some(found)) => found,
                Ok(None) => continue,
                Err(e) => {
                    log_error(
                        "ERASURE_LOOKUP_FAILED",
                        &[
                            ("customer_id", &customer_id.to_string()),
                            ("error", &e.to_string()),
                        ],
                    );
                    continue;
                }
            };

            let dir = processed_root
                .join(date_dir_name(date))
                .join(hour_dir_name(hour));
            let Some(file) = staged_customer_file(&dir) else {
                continue;
            };

            let hashed = anonymize_email(email);
            match anonymize_customer_file(&file, customer_id, &hashed) {
                Ok(0) => {}
                Ok(_) => {
                    files_touched += 1;
                    log(
                        Severity::Info,
                        "ERASURE_APPLIED",
                        &[
                            ("customer_id", &customer_id.to_string()),
                            ("file", &file.display().to_string()),
                        ],
                    );
                    if let Err(e) = archive_rewritten_file(&file, archived_root, date, hour) {
                        log_error(
                            "ERASURE_ARCHIVE_FAILED",
                            &[
                                ("file", &file.display().to_string()),
                                ("error", &e.to_string()),
                            ],
                        );
                    }
                }
                Err(e) => {
                    log_error(
                        "ERASURE_REWRITE_FAILED",
                        &[
                            ("file", &file.display().to_string()),
                            ("error", &e.to_string()),
                        ],
                    );
                }
            }
        }

        files_touched
    }
}

/// The staged processed customer file in a partition directory, gzipped
/// variant preferred.
fn staged_customer_file(dir: &Path) -> Option<PathBuf> {
    for name in ["customers.json.gz", "customers.json"] {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

fn archive_rewritten_file(
    file: &Path,
    archived_root: &Path,
    date: chrono::NaiveDate,
    hour: u8,
) -> std::io::Result<()> {
    let target_dir = archived_root.join(date_dir_name(date)).join(hour_dir_name(hour));
    fs::create_dir_all(&target_dir)?;
    let file_name = file.file_name().unwrap_or_default();
    fs::rename(file, target_dir.join(file_name))
}
