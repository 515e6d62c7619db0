//! Per-record routing: the accept/reject decision procedure.
//!
//! The router owns the decision; storage owns persistence. Every input
//! record gets exactly one decision, in input order.

mod decision;
mod router;

pub use decision::{DecisionBatch, Destination, RoutingDecision};
pub use router::Router;
