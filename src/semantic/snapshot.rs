//! Read-only reference identities for one batch window.
//!
//! The snapshot is taken once per batch and handed to the checker by
//! value of reference; concurrent batches and tests supply isolated
//! fixtures instead of sharing ambient state. Staleness within the hour
//! is tolerated by design of the scheduling model.

use std::collections::BTreeSet;

/// Known customer ids and product SKUs as of batch scheduling time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceSnapshot {
    customers: BTreeSet<i64>,
    products: BTreeSet<i64>,
}

impl ReferenceSnapshot {
    pub fn new(customers: BTreeSet<i64>, products: BTreeSet<i64>) -> Self {
        Self {
            customers,
            products,
        }
    }

    /// A snapshot with no known identities. Kinds that need no reference
    /// data (customers, products) validate against this.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_iters(
        customers: impl IntoIterator<Item = i64>,
        products: impl IntoIterator<Item = i64>,
    ) -> Self {
        Self {
            customers: customers.into_iter().collect(),
            products: products.into_iter().collect(),
        }
    }

    pub fn known_customer(&self, id: i64) -> bool {
        self.customers.contains(&id)
    }

    pub fn known_product(&self, sku: i64) -> bool {
        self.products.contains(&sku)
    }

    pub fn customer_count(&self) -> usize {
        self.customers.len()
    }

    pub fn product_count(&self) -> usize {
        self.products.len()
    }
}
