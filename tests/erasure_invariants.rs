//! Erasure Round-Trip Tests
//!
//! - A request for a known customer is recorded as processed exactly
//!   once, no matter how often it is resubmitted
//! - A request for an unknown customer is quarantined with a reason
//!   naming the unknown subject
//! - Applying a request anonymizes the subject's staged email

use chrono::NaiveDate;
use datasieve::dataset::{BatchPartition, DatasetKind};
use datasieve::erasure::{anonymize_email, ErasureProcessor};
use datasieve::semantic::ReferenceSnapshot;
use datasieve::storage::{MemoryGateway, StorageGateway};
use serde_json::{json, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn erasure_partition(day: u32, hour: u8) -> BatchPartition {
    BatchPartition::new(
        DatasetKind::ErasureRequests,
        NaiveDate::from_ymd_opt(2023, 11, day).unwrap(),
        hour,
    )
    .unwrap()
}

fn request(customer_id: i64) -> Value {
    json!({
        "customer-id": customer_id,
        "email": format!("subject.{}@example.com", customer_id)
    })
}

fn gateway_with_customer(id: i64) -> MemoryGateway {
    let gateway = MemoryGateway::new();
    gateway.seed_canonical(
        BatchPartition::new(
            DatasetKind::Customers,
            NaiveDate::from_ymd_opt(2023, 11, 1).unwrap(),
            0,
        )
        .unwrap(),
        json!({"id": id, "email": format!("subject.{}@example.com", id)}),
    );
    gateway
}

// =============================================================================
// At-Most-Once Processing
// =============================================================================

/// The same request twice in one batch still yields one processed row.
#[test]
fn test_duplicate_request_in_one_batch_is_single_row() {
    let gateway = gateway_with_customer(12);
    let refs = ReferenceSnapshot::from_iters([12], []);
    let processor = ErasureProcessor::new();

    let batch = processor.decide(
        vec![request(12), request(12)],
        erasure_partition(2, 3),
        &refs,
    );
    assert_eq!(batch.accepted_count(), 2);

    gateway.flush(&batch).unwrap();
    assert_eq!(gateway.canonical_count(DatasetKind::ErasureRequests), 1);
}

/// Resubmission in a later batch overwrites in place: still one row.
#[test]
fn test_resubmission_across_batches_is_noop_overwrite() {
    let gateway = gateway_with_customer(12);
    let refs = ReferenceSnapshot::from_iters([12], []);
    let processor = ErasureProcessor::new();

    let first = processor.decide(vec![request(12)], erasure_partition(2, 3), &refs);
    gateway.flush(&first).unwrap();

    let second = processor.decide(vec![request(12)], erasure_partition(3, 7), &refs);
    gateway.flush(&second).unwrap();

    assert_eq!(gateway.canonical_count(DatasetKind::ErasureRequests), 1);

    // The surviving row carries the later partition (last write wins).
    let row = gateway
        .canonical_row(DatasetKind::ErasureRequests, "12")
        .unwrap();
    assert_eq!(row.record_date, NaiveDate::from_ymd_opt(2023, 11, 3).unwrap());
    assert_eq!(row.record_hour, 7);
}

/// The processed row is stamped at write time.
#[test]
fn test_processed_request_carries_processed_at() {
    let gateway = gateway_with_customer(12);
    let refs = ReferenceSnapshot::from_iters([12], []);
    let processor = ErasureProcessor::new();

    let batch = processor.decide(vec![request(12)], erasure_partition(2, 3), &refs);
    gateway.flush(&batch).unwrap();

    let row = gateway
        .canonical_row(DatasetKind::ErasureRequests, "12")
        .unwrap();
    assert!(row.processed_at.timestamp() > 0);
}

// =============================================================================
// Unknown Subjects
// =============================================================================

/// Cannot erase what does not exist: unknown subjects are quarantined.
#[test]
fn test_unknown_subject_quarantined_with_reason() {
    let gateway = MemoryGateway::new();
    let refs = ReferenceSnapshot::empty();
    let processor = ErasureProcessor::new();

    let batch = processor.decide(vec![request(404)], erasure_partition(2, 3), &refs);
    assert_eq!(batch.accepted_count(), 0);
    assert_eq!(batch.quarantined_count(), 1);

    gateway.flush(&batch).unwrap();
    let rows = gateway.quarantine_rows(DatasetKind::ErasureRequests);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].error_message, "unknown customer_id: 404");
}

/// A structurally-broken request never reaches the subject check.
#[test]
fn test_malformed_request_quarantined_with_shape_reason() {
    let refs = ReferenceSnapshot::from_iters([12], []);
    let processor = ErasureProcessor::new();

    let batch = processor.decide(
        vec![json!({"customer-id": "twelve", "email": "a@b.c"})],
        erasure_partition(2, 3),
        &refs,
    );

    let reason = batch.quarantined().next().unwrap().reason.clone().unwrap();
    assert!(reason.contains("field 'customer-id'"), "reason: {}", reason);
}

// =============================================================================
// Anonymization
// =============================================================================

/// The digest is deterministic, so repeated erasure passes converge.
#[test]
fn test_anonymized_email_is_deterministic_digest() {
    let once = anonymize_email("subject.12@example.com");
    let twice = anonymize_email("subject.12@example.com");
    assert_eq!(once, twice);
    assert_ne!(once, "subject.12@example.com");
}
