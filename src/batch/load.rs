//! Processed-data loading.
//!
//! Accepted records are written to the processed-data area as gzip
//! NDJSON under the same `date=`/`hour=` layout the staging area uses.
//! Empty batches write nothing.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::Value;

use crate::dataset::BatchPartition;

use super::errors::{BatchError, BatchResult};

/// Writes accepted records for a partition. Returns the written path, or
/// `None` for an empty record set.
pub fn load_processed(
    records: &[Value],
    processed_root: &Path,
    partition: BatchPartition,
) -> BatchResult<Option<PathBuf>> {
    if records.is_empty() {
        return Ok(None);
    }

    let dir = processed_root
        .join(partition.date_dir())
        .join(partition.hour_dir());
    fs::create_dir_all(&dir).map_err(|e| BatchError::io(dir.display().to_string(), e))?;

    let path = dir.join(format!("{}.json.gz", partition.kind.file_stem()));
    let display = path.display().to_string();

    let file = File::create(&path).map_err(|e| BatchError::io(display.as_str(), e))?;
    let mut writer = BufWriter::new(GzEncoder::new(file, Compression::default()));
    for record in records {
        let line = serde_json::to_string(record).map_err(|e| BatchError::malformed(display.as_str(), e))?;
        writer
            .write_all(line.as_bytes())
            .and_then(|_| writer.write_all(b"\n"))
            .map_err(|e| BatchError::io(display.as_str(), e))?;
    }
    writer.flush().map_err(|e| BatchError::io(display.as_str(), e))?;

    Ok(Some(path))
}
