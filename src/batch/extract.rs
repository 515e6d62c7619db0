//! Staged-file extraction.
//!
//! Two staging formats arrive: `.json.gz` (gzip NDJSON, one record per
//! line) and `.json` (a single record object). Anything else is logged
//! and skipped rather than failing the batch.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use serde_json::Value;

use crate::dataset::BatchPartition;
use crate::observability::{log, Severity};

use super::errors::{BatchError, BatchResult};

/// Locates the staged file for a partition under the raw-data root.
/// The gzipped variant wins when both exist.
pub fn staged_file_for(raw_root: &Path, partition: BatchPartition) -> Option<PathBuf> {
    let dir = raw_root
        .join(partition.date_dir())
        .join(partition.hour_dir());
    for extension in [".json.gz", ".json"] {
        let candidate = dir.join(format!("{}{}", partition.kind.file_stem(), extension));
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

/// Extracts all records from a staged file.
pub fn extract_records(path: &Path) -> BatchResult<Vec<Value>> {
    let display = path.display().to_string();
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");

    if name.ends_with(".json.gz") {
        let file = File::open(path).map_err(|e| BatchError::io(display.as_str(), e))?;
        let reader = BufReader::new(GzDecoder::new(file));
        read_lines(reader, &display)
    } else if name.ends_with(".json") {
        let content =
            std::fs::read_to_string(path).map_err(|e| BatchError::io(display.as_str(), e))?;
        let record = serde_json::from_str(&content).map_err(|e| BatchError::malformed(display.as_str(), e))?;
        Ok(vec![record])
    } else {
        log(
            Severity::Warn,
            "UNSUPPORTED_STAGED_FORMAT",
            &[("file", &display)],
        );
        Ok(Vec::new())
    }
}

fn read_lines<R: BufRead>(reader: R, display: &str) -> BatchResult<Vec<Value>> {
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(|e| BatchError::io(display, e))?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line).map_err(|e| BatchError::malformed(display, e))?);
    }
    Ok(records)
}
