//! Archiving consumed staging files.
//!
//! A consumed raw file moves to the archive area under the same
//! partition layout, and staging directories left empty are pruned
//! bottom-up afterwards.

use std::fs;
use std::path::{Path, PathBuf};

use crate::dataset::BatchPartition;
use crate::observability::{log, Severity};

use super::errors::{BatchError, BatchResult};

/// Moves a consumed staging file into the archive area. Returns the
/// archived path.
pub fn archive_file(
    file: &Path,
    archived_root: &Path,
    partition: BatchPartition,
) -> BatchResult<PathBuf> {
    let target_dir = archived_root
        .join(partition.date_dir())
        .join(partition.hour_dir());
    fs::create_dir_all(&target_dir)
        .map_err(|e| BatchError::io(target_dir.display().to_string(), e))?;

    let file_name = file.file_name().unwrap_or_default();
    let target = target_dir.join(file_name);
    fs::rename(file, &target).map_err(|e| BatchError::io(file.display().to_string(), e))?;

    log(
        Severity::Debug,
        "FILE_ARCHIVED",
        &[("file", &target.display().to_string())],
    );
    Ok(target)
}

/// Removes empty directories under `root`, deepest first. The root
/// itself is kept.
pub fn cleanup_empty_dirs(root: &Path) -> BatchResult<()> {
    if !root.is_dir() {
        return Ok(());
    }
    let display = root.display().to_string();

    let entries = fs::read_dir(root).map_err(|e| BatchError::io(display.as_str(), e))?;
    for entry in entries {
        let entry = entry.map_err(|e| BatchError::io(display.as_str(), e))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        cleanup_empty_dirs(&path)?;
        let is_empty = fs::read_dir(&path)
            .map_err(|e| BatchError::io(path.display().to_string(), e))?
            .next()
            .is_none();
        if is_empty {
            fs::remove_dir(&path).map_err(|e| BatchError::io(path.display().to_string(), e))?;
        }
    }
    Ok(())
}
