//! Semantic rule violations.
//!
//! Each variant describes the first violated business rule; the `Display`
//! rendering is the quarantine reason string.

use rust_decimal::Decimal;
use thiserror::Error;

/// Result type for semantic checks
pub type SemanticResult<T> = Result<T, SemanticError>;

/// Business-rule violation on a structurally-valid record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SemanticError {
    #[error("email '{email}' is not a valid address (expected exactly one '@' with non-empty local and domain parts)")]
    InvalidEmail { email: String },

    #[error("unknown customer_id: {customer_id}")]
    UnknownCustomer { customer_id: i64 },

    #[error("purchase line {index}: declared total {declared} does not equal price {price} x quantity {quantity} = {computed}")]
    LineTotalMismatch {
        index: usize,
        price: Decimal,
        quantity: i64,
        declared: Decimal,
        computed: Decimal,
    },

    #[error("declared total_cost {declared} does not equal the sum of line totals {computed}")]
    TotalCostMismatch { declared: Decimal, computed: Decimal },

    #[error("popularity must be strictly greater than zero (got {value})")]
    NonPositivePopularity { value: f64 },

    #[error("price must not be negative (got {value})")]
    NegativePrice { value: Decimal },

    #[error("field '{field}' is not usable for semantic checks")]
    MalformedField { field: String },
}
