//! The routing decision procedure.
//!
//! Shape check first, semantic rules second, fail-fast at each stage.
//! Duplicate identities inside one batch are decided independently; the
//! storage layer's upsert makes the later record win.

use serde_json::Value;

use crate::dataset::{BatchPartition, DatasetKind};
use crate::schema::{validate_shape, ContractCatalog};
use crate::semantic::{validate_semantics, ReferenceSnapshot, SemanticWarning};

use super::decision::{DecisionBatch, RoutingDecision};

/// Stateless decision engine over the built-in contracts.
#[derive(Debug, Clone, Default)]
pub struct Router {
    catalog: ContractCatalog,
}

impl Router {
    pub fn new() -> Self {
        Self {
            catalog: ContractCatalog::new(),
        }
    }

    /// Decides one record: canonical on both passes, quarantine with the
    /// first violated rule otherwise. The record is returned inside the
    /// decision either way; nothing is dropped.
    pub fn route(
        &self,
        record: Value,
        kind: DatasetKind,
        refs: &ReferenceSnapshot,
    ) -> RoutingDecision {
        let outcome: Result<Vec<SemanticWarning>, String> = {
            let contract = self.catalog.contract_for(kind);
            match validate_shape(&record, contract) {
                Err(shape) => Err(shape.to_string()),
                Ok(validated) => validate_semantics(&validated, kind, refs)
                    .map_err(|semantic| semantic.to_string()),
            }
        };

        match outcome {
            Ok(warnings) => RoutingDecision::accept(record, warnings),
            Err(reason) => RoutingDecision::quarantine(record, reason),
        }
    }

    /// Decides a whole batch, preserving input order, one decision per
    /// input record.
    pub fn route_batch(
        &self,
        records: Vec<Value>,
        partition: BatchPartition,
        refs: &ReferenceSnapshot,
    ) -> DecisionBatch {
        let mut batch = DecisionBatch::new(partition);
        for record in records {
            batch.decisions.push(self.route(record, partition.kind, refs));
        }
        batch
    }
}
