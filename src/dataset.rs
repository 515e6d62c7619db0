//! Dataset kinds and batch partition keys.
//!
//! Every batch is identified by (dataset kind, calendar date, hour of day).
//! The staging area names its partition directories `date=YYYY-MM-DD` and
//! `hour=HH`; the parsers here are the only place that naming is known.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The four record kinds the pipeline ingests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    Customers,
    Transactions,
    Products,
    ErasureRequests,
}

impl DatasetKind {
    /// All kinds, in processing order (reference data before its consumers).
    pub const ALL: [DatasetKind; 4] = [
        DatasetKind::Customers,
        DatasetKind::Products,
        DatasetKind::Transactions,
        DatasetKind::ErasureRequests,
    ];

    /// The dataset type string used for statistics rows and table names.
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKind::Customers => "customers",
            DatasetKind::Transactions => "transactions",
            DatasetKind::Products => "products",
            DatasetKind::ErasureRequests => "erasure_requests",
        }
    }

    /// The staging file stem. Erasure request files arrive hyphenated.
    pub fn file_stem(&self) -> &'static str {
        match self {
            DatasetKind::ErasureRequests => "erasure-requests",
            other => other.as_str(),
        }
    }

    /// The field holding a record's canonical identity.
    pub fn identity_field(&self) -> &'static str {
        match self {
            DatasetKind::Customers => "id",
            DatasetKind::Transactions => "transaction_id",
            DatasetKind::Products => "sku",
            DatasetKind::ErasureRequests => "customer-id",
        }
    }

    /// Extracts the canonical storage key from a record, if present.
    ///
    /// Upserts are idempotent at this key: re-applying the same record, or a
    /// later record with the same identity, overwrites in place.
    pub fn identity_of(&self, record: &serde_json::Value) -> Option<String> {
        let value = record.get(self.identity_field())?;
        match value {
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    /// Parses a kind from its dataset type string or file stem.
    pub fn parse(s: &str) -> Option<DatasetKind> {
        match s {
            "customers" => Some(DatasetKind::Customers),
            "transactions" => Some(DatasetKind::Transactions),
            "products" => Some(DatasetKind::Products),
            "erasure_requests" | "erasure-requests" => Some(DatasetKind::ErasureRequests),
            _ => None,
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One batch's partition key: (kind, record_date, record_hour).
///
/// Uniquely identifies a unit of work and its statistics row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchPartition {
    pub kind: DatasetKind,
    pub record_date: NaiveDate,
    pub record_hour: u8,
}

impl BatchPartition {
    /// Creates a partition key. Fails on an out-of-range hour.
    pub fn new(kind: DatasetKind, record_date: NaiveDate, record_hour: u8) -> Option<Self> {
        if record_hour > 23 {
            return None;
        }
        Some(Self {
            kind,
            record_date,
            record_hour,
        })
    }

    /// Directory name for the date level: `date=YYYY-MM-DD`.
    pub fn date_dir(&self) -> String {
        date_dir_name(self.record_date)
    }

    /// Directory name for the hour level: `hour=HH`.
    pub fn hour_dir(&self) -> String {
        hour_dir_name(self.record_hour)
    }
}

/// Formats a date as its staging directory name.
pub fn date_dir_name(date: NaiveDate) -> String {
    format!("date={}", date.format("%Y-%m-%d"))
}

/// Formats an hour as its staging directory name.
pub fn hour_dir_name(hour: u8) -> String {
    format!("hour={:02}", hour)
}

impl fmt::Display for BatchPartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.kind,
            self.date_dir(),
            self.hour_dir()
        )
    }
}

/// Parses the actual date out of a `date=YYYY-MM-DD` directory name.
pub fn parse_date_dir(name: &str) -> Option<NaiveDate> {
    let raw = name.strip_prefix("date=")?;
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Parses the actual hour out of an `hour=HH` directory name.
pub fn parse_hour_dir(name: &str) -> Option<u8> {
    let raw = name.strip_prefix("hour=")?;
    let hour: u8 = raw.parse().ok()?;
    if hour > 23 {
        return None;
    }
    Some(hour)
}
