//! Semantic rule checks per dataset kind.
//!
//! Rules:
//! - Customer: email has exactly one '@' with non-empty local and domain
//! - Transaction: customer_id must be known; each line total must equal
//!   price x quantity at 2 decimal places; total_cost must equal the sum
//!   of line totals; an unknown purchase SKU is a soft warning only
//!   (products may land in a later batch of the same hour)
//! - Product: popularity > 0, price >= 0
//! - Erasure request: customer-id must be known
//!
//! The checker reports the first violated rule and never mutates its
//! inputs.

use std::fmt;

use rust_decimal::Decimal;
use serde_json::Value;

use crate::dataset::DatasetKind;
use crate::schema::{parse_decimal, ValidatedRecord};

use super::errors::{SemanticError, SemanticResult};
use super::snapshot::ReferenceSnapshot;

/// A rule observation that does not reject the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemanticWarning {
    /// Purchase line references a SKU absent from the reference snapshot.
    UnknownSku { sku: i64 },
}

impl fmt::Display for SemanticWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticWarning::UnknownSku { sku } => write!(f, "unknown product sku: {}", sku),
        }
    }
}

/// Runs the semantic rules for `kind` against a structurally-valid record.
///
/// Returns the soft warnings gathered along the way, or the first violated
/// rule.
pub fn validate_semantics(
    record: &ValidatedRecord<'_>,
    kind: DatasetKind,
    refs: &ReferenceSnapshot,
) -> SemanticResult<Vec<SemanticWarning>> {
    match kind {
        DatasetKind::Customers => check_customer(record),
        DatasetKind::Transactions => check_transaction(record, refs),
        DatasetKind::Products => check_product(record),
        DatasetKind::ErasureRequests => check_erasure_request(record, refs),
    }
}

fn check_customer(record: &ValidatedRecord<'_>) -> SemanticResult<Vec<SemanticWarning>> {
    let email = record.str_field("email").unwrap_or_default();
    if !email_is_well_formed(email) {
        return Err(SemanticError::InvalidEmail {
            email: email.to_string(),
        });
    }
    Ok(Vec::new())
}

fn check_transaction(
    record: &ValidatedRecord<'_>,
    refs: &ReferenceSnapshot,
) -> SemanticResult<Vec<SemanticWarning>> {
    let customer_id = record.int_field("customer_id").unwrap_or_default();
    if !refs.known_customer(customer_id) {
        return Err(SemanticError::UnknownCustomer { customer_id });
    }

    let purchases = record
        .get("purchases")
        .and_then(Value::as_object)
        .ok_or_else(|| malformed("purchases"))?;
    let lines = purchases
        .get("products")
        .and_then(Value::as_array)
        .ok_or_else(|| malformed("purchases.products"))?;

    let mut warnings = Vec::new();
    let mut computed_total_cost = Decimal::ZERO;

    for (index, line) in lines.iter().enumerate() {
        let sku = line.get("sku").and_then(Value::as_i64).unwrap_or_default();
        if !refs.known_product(sku) {
            warnings.push(SemanticWarning::UnknownSku { sku });
        }

        let price = decimal_field(line, "price")?;
        let quantity = line
            .get("quantity")
            .and_then(Value::as_i64)
            .ok_or_else(|| malformed("quantity"))?;
        let declared = decimal_field(line, "total")?;

        let computed = (price * Decimal::from(quantity)).round_dp(2);
        if computed != declared.round_dp(2) {
            return Err(SemanticError::LineTotalMismatch {
                index,
                price,
                quantity,
                declared,
                computed,
            });
        }
        computed_total_cost += computed;
    }

    let declared_total_cost = decimal_field_of(purchases, "total_cost")?;
    if computed_total_cost.round_dp(2) != declared_total_cost.round_dp(2) {
        return Err(SemanticError::TotalCostMismatch {
            declared: declared_total_cost,
            computed: computed_total_cost,
        });
    }

    Ok(warnings)
}

fn check_product(record: &ValidatedRecord<'_>) -> SemanticResult<Vec<SemanticWarning>> {
    let popularity = record
        .get("popularity")
        .and_then(Value::as_f64)
        .unwrap_or_default();
    if popularity <= 0.0 {
        return Err(SemanticError::NonPositivePopularity { value: popularity });
    }

    let price = record
        .get("price")
        .and_then(parse_decimal)
        .ok_or_else(|| malformed("price"))?;
    if price < Decimal::ZERO {
        return Err(SemanticError::NegativePrice { value: price });
    }

    Ok(Vec::new())
}

fn check_erasure_request(
    record: &ValidatedRecord<'_>,
    refs: &ReferenceSnapshot,
) -> SemanticResult<Vec<SemanticWarning>> {
    let customer_id = record.int_field("customer-id").unwrap_or_default();
    if !refs.known_customer(customer_id) {
        return Err(SemanticError::UnknownCustomer { customer_id });
    }
    Ok(Vec::new())
}

/// Exactly one '@' separating non-empty local and domain parts. A format
/// check only; deliverability is out of scope.
fn email_is_well_formed(email: &str) -> bool {
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => !local.is_empty() && !domain.is_empty(),
        _ => false,
    }
}

fn decimal_field(line: &Value, field: &str) -> SemanticResult<Decimal> {
    line.get(field)
        .and_then(parse_decimal)
        .ok_or_else(|| malformed(field))
}

fn decimal_field_of(obj: &serde_json::Map<String, Value>, field: &str) -> SemanticResult<Decimal> {
    obj.get(field)
        .and_then(parse_decimal)
        .ok_or_else(|| malformed(field))
}

fn malformed(field: &str) -> SemanticError {
    SemanticError::MalformedField {
        field: field.to_string(),
    }
}
