//! Routing Invariant Tests
//!
//! - Every input record gets exactly one destination: canonical or
//!   quarantine with a reason, never both, never neither
//! - Quarantine reasons name the first violated rule
//! - Input order is preserved; duplicates are decided independently
//! - Reference checks reject unknown identities

use chrono::NaiveDate;
use datasieve::dataset::{BatchPartition, DatasetKind};
use datasieve::router::{Destination, Router};
use datasieve::semantic::ReferenceSnapshot;
use serde_json::{json, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn partition(kind: DatasetKind) -> BatchPartition {
    BatchPartition::new(kind, NaiveDate::from_ymd_opt(2023, 11, 1).unwrap(), 5).unwrap()
}

fn valid_customer(id: i64) -> Value {
    json!({
        "id": id,
        "first_name": "Jane",
        "last_name": "Doe",
        "email": format!("jane.{}@example.com", id),
        "address": "4 Elm Street",
        "city": "Leeds",
        "country": "UK",
        "postcode": "LS1 4AB"
    })
}

fn valid_product(sku: i64, popularity: f64) -> Value {
    json!({
        "sku": sku,
        "name": "Wool Scarf",
        "price": "9.99",
        "category": "apparel",
        "popularity": popularity
    })
}

fn valid_transaction(customer_id: i64) -> Value {
    json!({
        "transaction_id": "9f5a7f70-4a34-4c1e-9eb1-29f0d3911a93",
        "transaction_time": "2023-11-01T05:12:43+00:00",
        "customer_id": customer_id,
        "delivery_address": {
            "address": "4 Elm Street",
            "postcode": "LS1 4AB",
            "city": "Leeds",
            "country": "UK"
        },
        "purchases": {
            "products": [
                {"sku": 1001, "quantity": 2, "price": "10.00", "total": "20.00"}
            ],
            "total_cost": "20.00"
        }
    })
}

// =============================================================================
// Exhaustive Routing
// =============================================================================

/// Exactly one of {canonical, quarantined-with-reason} holds per record.
#[test]
fn test_every_decision_is_exclusively_canonical_or_quarantined() {
    let router = Router::new();
    let refs = ReferenceSnapshot::from_iters([1], [1001]);

    let inputs = vec![
        valid_customer(1),
        json!({"id": "wrong-type"}),
        json!({}),
        json!([1, 2]),
        json!({"id": 2, "first_name": "No", "last_name": "Email", "address": "x",
               "city": "y", "country": "z", "postcode": "1", "email": "broken"}),
    ];
    let count = inputs.len();

    let batch = router.route_batch(inputs, partition(DatasetKind::Customers), &refs);
    assert_eq!(batch.len(), count);

    for decision in &batch.decisions {
        match decision.destination {
            Destination::Canonical => assert!(decision.reason.is_none()),
            Destination::Quarantine => {
                let reason = decision.reason.as_ref().expect("quarantine carries reason");
                assert!(!reason.is_empty());
            }
        }
    }
    assert_eq!(batch.accepted_count() + batch.quarantined_count(), count);
}

/// Decisions come back in input order with the original records.
#[test]
fn test_input_order_preserved() {
    let router = Router::new();
    let refs = ReferenceSnapshot::empty();

    let batch = router.route_batch(
        vec![valid_customer(3), valid_customer(1), valid_customer(2)],
        partition(DatasetKind::Customers),
        &refs,
    );

    let ids: Vec<i64> = batch
        .decisions
        .iter()
        .map(|d| d.record["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![3, 1, 2]);
}

/// Duplicate identities in one batch both get decided; storage decides
/// the winner.
#[test]
fn test_batch_internal_duplicates_not_deduplicated() {
    let router = Router::new();
    let refs = ReferenceSnapshot::empty();

    let batch = router.route_batch(
        vec![valid_customer(7), valid_customer(7), valid_customer(7)],
        partition(DatasetKind::Customers),
        &refs,
    );

    assert_eq!(batch.accepted_count(), 3);
}

// =============================================================================
// Referential Rejection
// =============================================================================

/// A transaction referencing an unknown customer is quarantined with a
/// reason naming the customer.
#[test]
fn test_unknown_customer_reference_quarantined() {
    let router = Router::new();
    let refs = ReferenceSnapshot::from_iters([1, 2], [1001]);

    let decision = router.route(
        valid_transaction(999),
        DatasetKind::Transactions,
        &refs,
    );

    assert_eq!(decision.destination, Destination::Quarantine);
    assert_eq!(
        decision.reason.as_deref(),
        Some("unknown customer_id: 999")
    );
}

/// A customer without an email is quarantined with a reason naming the
/// missing field.
#[test]
fn test_missing_email_quarantined() {
    let router = Router::new();
    let mut record = valid_customer(1);
    record.as_object_mut().unwrap().remove("email");

    let decision = router.route(record, DatasetKind::Customers, &ReferenceSnapshot::empty());

    assert_eq!(decision.destination, Destination::Quarantine);
    assert_eq!(
        decision.reason.as_deref(),
        Some("field 'email': required field is missing")
    );
}

/// A known-customer transaction with an unknown SKU still routes
/// canonical; the SKU observation is a soft warning.
#[test]
fn test_unknown_sku_does_not_reject() {
    let router = Router::new();
    let refs = ReferenceSnapshot::from_iters([12], []);

    let decision = router.route(valid_transaction(12), DatasetKind::Transactions, &refs);

    assert_eq!(decision.destination, Destination::Canonical);
    assert_eq!(decision.warnings.len(), 1);
}

// =============================================================================
// Popularity Boundary
// =============================================================================

#[test]
fn test_popularity_zero_rejected() {
    let router = Router::new();
    let decision = router.route(
        valid_product(1001, 0.0),
        DatasetKind::Products,
        &ReferenceSnapshot::empty(),
    );

    assert_eq!(decision.destination, Destination::Quarantine);
    assert!(decision
        .reason
        .unwrap()
        .contains("popularity must be strictly greater than zero"));
}

#[test]
fn test_popularity_just_above_zero_accepted() {
    let router = Router::new();
    let decision = router.route(
        valid_product(1001, 0.0001),
        DatasetKind::Products,
        &ReferenceSnapshot::empty(),
    );

    assert_eq!(decision.destination, Destination::Canonical);
}

// =============================================================================
// Reason Precedence
// =============================================================================

/// Shape violations win over semantic violations: a record that is both
/// structurally broken and semantically broken reports the shape reason.
#[test]
fn test_shape_reason_reported_before_semantic() {
    let router = Router::new();
    let mut record = valid_customer(1);
    let obj = record.as_object_mut().unwrap();
    obj.insert("email".into(), json!("not-an-email")); // semantic violation
    obj.insert("extra".into(), json!(true)); // shape violation

    let decision = router.route(record, DatasetKind::Customers, &ReferenceSnapshot::empty());
    let reason = decision.reason.unwrap();
    assert!(reason.contains("undeclared field"), "reason: {}", reason);
}
