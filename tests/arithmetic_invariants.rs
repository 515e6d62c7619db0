//! Arithmetic Exactness Tests
//!
//! Line totals are recomputed as price x quantity at two decimal places
//! with zero tolerance; total_cost is the exact sum of line totals.

use datasieve::dataset::DatasetKind;
use datasieve::router::{Destination, Router};
use datasieve::semantic::ReferenceSnapshot;
use serde_json::{json, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn refs() -> ReferenceSnapshot {
    ReferenceSnapshot::from_iters([12], [1001, 1002])
}

fn transaction(lines: Value, total_cost: &str) -> Value {
    json!({
        "transaction_id": "9f5a7f70-4a34-4c1e-9eb1-29f0d3911a93",
        "transaction_time": "2023-11-01T05:12:43+00:00",
        "customer_id": 12,
        "delivery_address": {
            "address": "4 Elm Street",
            "postcode": "LS1 4AB",
            "city": "Leeds",
            "country": "UK"
        },
        "purchases": {
            "products": lines,
            "total_cost": total_cost
        }
    })
}

// =============================================================================
// Exactness
// =============================================================================

/// The canonical example: (10.00 x 2) + (5.50 x 1) = 25.50.
#[test]
fn test_reference_example_accepted() {
    let router = Router::new();
    let record = transaction(
        json!([
            {"sku": 1001, "quantity": 2, "price": "10.00", "total": "20.00"},
            {"sku": 1002, "quantity": 1, "price": "5.50", "total": "5.50"}
        ]),
        "25.50",
    );

    let decision = router.route(record, DatasetKind::Transactions, &refs());
    assert_eq!(decision.destination, Destination::Canonical);
}

/// Any declared total differing from the recomputed value is rejected
/// with a reason identifying the mismatch.
#[test]
fn test_declared_line_total_off_by_a_cent_rejected() {
    let router = Router::new();
    let record = transaction(
        json!([
            {"sku": 1001, "quantity": 2, "price": "10.00", "total": "20.01"}
        ]),
        "20.01",
    );

    let decision = router.route(record, DatasetKind::Transactions, &refs());
    assert_eq!(decision.destination, Destination::Quarantine);
    let reason = decision.reason.unwrap();
    assert!(reason.contains("purchase line 0"), "reason: {}", reason);
    assert!(reason.contains("20.01"));
    assert!(reason.contains("20.00"));
}

#[test]
fn test_total_cost_mismatch_rejected_with_both_values() {
    let router = Router::new();
    let record = transaction(
        json!([
            {"sku": 1001, "quantity": 2, "price": "10.00", "total": "20.00"},
            {"sku": 1002, "quantity": 1, "price": "5.50", "total": "5.50"}
        ]),
        "26.00",
    );

    let decision = router.route(record, DatasetKind::Transactions, &refs());
    assert_eq!(decision.destination, Destination::Quarantine);
    let reason = decision.reason.unwrap();
    assert!(reason.contains("total_cost"));
    assert!(reason.contains("26.00"));
    assert!(reason.contains("25.50"));
}

/// Decimal arithmetic must not inherit binary-float drift: quantities of
/// 0.10-style prices sum exactly.
#[test]
fn test_no_binary_float_drift() {
    let router = Router::new();
    let record = transaction(
        json!([
            {"sku": 1001, "quantity": 3, "price": 0.10, "total": 0.30},
            {"sku": 1002, "quantity": 3, "price": 0.20, "total": 0.60}
        ]),
        "0.90",
    );

    let decision = router.route(record, DatasetKind::Transactions, &refs());
    assert_eq!(decision.destination, Destination::Canonical);
}

/// An empty purchase list is consistent only with a zero total_cost.
#[test]
fn test_empty_purchases_requires_zero_total() {
    let router = Router::new();

    let zero = transaction(json!([]), "0.00");
    assert_eq!(
        router
            .route(zero, DatasetKind::Transactions, &refs())
            .destination,
        Destination::Canonical
    );

    let nonzero = transaction(json!([]), "5.00");
    let decision = router.route(nonzero, DatasetKind::Transactions, &refs());
    assert_eq!(decision.destination, Destination::Quarantine);
    assert!(decision.reason.unwrap().contains("total_cost"));
}

/// Number-typed and string-typed currency fields are interchangeable.
#[test]
fn test_mixed_currency_representations() {
    let router = Router::new();
    let record = transaction(
        json!([
            {"sku": 1001, "quantity": 2, "price": 10.00, "total": "20.00"},
            {"sku": 1002, "quantity": 1, "price": "5.50", "total": 5.50}
        ]),
        "25.50",
    );

    let decision = router.route(record, DatasetKind::Transactions, &refs());
    assert_eq!(decision.destination, Destination::Canonical);
}

// =============================================================================
// Determinism
// =============================================================================

/// The same mismatching record yields the same reason every time.
#[test]
fn test_arithmetic_rejection_is_deterministic() {
    let router = Router::new();
    let record = transaction(
        json!([
            {"sku": 1001, "quantity": 4, "price": "2.50", "total": "10.01"}
        ]),
        "10.01",
    );

    let first = router
        .route(record.clone(), DatasetKind::Transactions, &refs())
        .reason;
    for _ in 0..20 {
        let again = router
            .route(record.clone(), DatasetKind::Transactions, &refs())
            .reason;
        assert_eq!(again, first);
    }
}
