//! Email anonymization in staged processed customer files.
//!
//! The subject's email is replaced with its SHA-256 hex digest, so the
//! file keeps its shape (and joinability on the digest) while the
//! address itself is gone. Files are rewritten in place in the same
//! format they were found (gzip or plain NDJSON).

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::errors::{ErasureError, ErasureResult};

/// SHA-256 hex digest of an email address.
pub fn anonymize_email(email: &str) -> String {
    let digest = Sha256::digest(email.as_bytes());
    format!("{:x}", digest)
}

/// Rewrites a processed customer file, anonymizing the email of every
/// record whose `id` matches. Returns how many records were touched.
pub fn anonymize_customer_file(
    path: &Path,
    customer_id: i64,
    anonymized_email: &str,
) -> ErasureResult<usize> {
    let mut records = read_ndjson(path)?;

    let mut touched = 0;
    for record in &mut records {
        if record.get("id").and_then(Value::as_i64) == Some(customer_id) {
            if let Some(obj) = record.as_object_mut() {
                obj.insert("email".to_string(), Value::String(anonymized_email.into()));
                touched += 1;
            }
        }
    }

    if touched > 0 {
        write_ndjson(path, &records)?;
    }
    Ok(touched)
}

fn is_gzipped(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "gz")
}

fn read_ndjson(path: &Path) -> ErasureResult<Vec<Value>> {
    let display = path.display().to_string();
    let file = File::open(path).map_err(|e| ErasureError::io(display.as_str(), e))?;

    let reader: Box<dyn BufRead> = if is_gzipped(path) {
        Box::new(BufReader::new(GzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(|e| ErasureError::io(display.as_str(), e))?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line).map_err(|e| ErasureError::malformed(display.as_str(), e))?);
    }
    Ok(records)
}

fn write_ndjson(path: &Path, records: &[Value]) -> ErasureResult<()> {
    let display = path.display().to_string();
    let file = File::create(path).map_err(|e| ErasureError::io(display.as_str(), e))?;

    let mut writer: Box<dyn Write> = if is_gzipped(path) {
        Box::new(BufWriter::new(GzEncoder::new(file, Compression::default())))
    } else {
        Box::new(BufWriter::new(file))
    };

    for record in records {
        let line = serde_json::to_string(record).map_err(|e| ErasureError::malformed(display.as_str(), e))?;
        writer
            .write_all(line.as_bytes())
            .and_then(|_| writer.write_all(b"\n"))
            .map_err(|e| ErasureError::io(display.as_str(), e))?;
    }
    writer.flush().map_err(|e| ErasureError::io(display.as_str(), e))?;
    Ok(())
}
