//! Routing decisions and the batched decision group.

use serde_json::Value;

use crate::dataset::BatchPartition;
use crate::semantic::SemanticWarning;

/// Where a record goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// Accepted: business-valid, upserted at its identity key.
    Canonical,
    /// Rejected: appended with the first violated rule as reason.
    Quarantine,
}

/// One record's routing outcome.
#[derive(Debug, Clone)]
pub struct RoutingDecision {
    pub destination: Destination,
    /// The record as received; quarantined records are never modified.
    pub record: Value,
    /// The first violated rule. `None` exactly when canonical.
    pub reason: Option<String>,
    /// Soft observations that did not affect the destination.
    pub warnings: Vec<SemanticWarning>,
}

impl RoutingDecision {
    pub fn accept(record: Value, warnings: Vec<SemanticWarning>) -> Self {
        Self {
            destination: Destination::Canonical,
            record,
            reason: None,
            warnings,
        }
    }

    pub fn quarantine(record: Value, reason: impl Into<String>) -> Self {
        Self {
            destination: Destination::Quarantine,
            record,
            reason: Some(reason.into()),
            warnings: Vec::new(),
        }
    }

    pub fn is_canonical(&self) -> bool {
        self.destination == Destination::Canonical
    }
}

/// All decisions for one partition, in input order.
///
/// The batch is the unit of durability: it is flushed to storage as one
/// group after every record has been decided.
#[derive(Debug, Clone)]
pub struct DecisionBatch {
    pub partition: BatchPartition,
    pub decisions: Vec<RoutingDecision>,
}

impl DecisionBatch {
    pub fn new(partition: BatchPartition) -> Self {
        Self {
            partition,
            decisions: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    /// Accepted records, in input order.
    pub fn accepted(&self) -> impl Iterator<Item = &RoutingDecision> {
        self.decisions.iter().filter(|d| d.is_canonical())
    }

    /// Quarantined records, in input order.
    pub fn quarantined(&self) -> impl Iterator<Item = &RoutingDecision> {
        self.decisions.iter().filter(|d| !d.is_canonical())
    }

    pub fn accepted_count(&self) -> usize {
        self.accepted().count()
    }

    pub fn quarantined_count(&self) -> usize {
        self.quarantined().count()
    }
}
