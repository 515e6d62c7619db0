//! Built-in record contracts for the four dataset kinds.
//!
//! Contracts are closed: a field not declared here is a structural error.
//! `last_change` on customers is declared optional because the pipeline
//! stamps it after validation; inbound records normally omit it.

use crate::dataset::DatasetKind;

use super::types::{FieldDef, FieldType, RecordContract};

/// The four contracts, built once and shared for a process lifetime.
#[derive(Debug, Clone)]
pub struct ContractCatalog {
    customers: RecordContract,
    transactions: RecordContract,
    products: RecordContract,
    erasure_requests: RecordContract,
}

impl Default for ContractCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl ContractCatalog {
    pub fn new() -> Self {
        Self {
            customers: customer_contract(),
            transactions: transaction_contract(),
            products: product_contract(),
            erasure_requests: erasure_request_contract(),
        }
    }

    /// The contract for a dataset kind.
    pub fn contract_for(&self, kind: DatasetKind) -> &RecordContract {
        match kind {
            DatasetKind::Customers => &self.customers,
            DatasetKind::Transactions => &self.transactions,
            DatasetKind::Products => &self.products,
            DatasetKind::ErasureRequests => &self.erasure_requests,
        }
    }
}

fn customer_contract() -> RecordContract {
    RecordContract::new(
        "customers",
        vec![
            ("id", FieldDef::required_int()),
            ("first_name", FieldDef::required_string()),
            ("last_name", FieldDef::required_string()),
            ("email", FieldDef::required_string()),
            ("date_of_birth", FieldDef::optional(FieldType::Date)),
            ("phone_number", FieldDef::optional(FieldType::String)),
            ("address", FieldDef::required_string()),
            ("city", FieldDef::required_string()),
            ("country", FieldDef::required_string()),
            ("postcode", FieldDef::required_string()),
            ("segment", FieldDef::optional(FieldType::String)),
            ("last_change", FieldDef::optional(FieldType::DateTime)),
        ],
    )
}

fn transaction_contract() -> RecordContract {
    let line_item = FieldType::Object {
        fields: vec![
            ("sku".to_string(), FieldDef::required_int()),
            ("quantity".to_string(), FieldDef::required_int()),
            ("price".to_string(), FieldDef::required_decimal()),
            ("total".to_string(), FieldDef::required_decimal()),
        ],
    };

    RecordContract::new(
        "transactions",
        vec![
            ("transaction_id", FieldDef::required(FieldType::Uuid)),
            ("transaction_time", FieldDef::required(FieldType::DateTime)),
            ("customer_id", FieldDef::required_int()),
            (
                "delivery_address",
                FieldDef::required_object(vec![
                    ("address", FieldDef::required_string()),
                    ("postcode", FieldDef::required_string()),
                    ("city", FieldDef::required_string()),
                    ("country", FieldDef::required_string()),
                ]),
            ),
            (
                "purchases",
                FieldDef::required_object(vec![
                    ("products", FieldDef::required_array(line_item)),
                    ("total_cost", FieldDef::required_decimal()),
                ]),
            ),
        ],
    )
}

fn product_contract() -> RecordContract {
    RecordContract::new(
        "products",
        vec![
            ("sku", FieldDef::required_int()),
            ("name", FieldDef::required_string()),
            ("price", FieldDef::required_decimal()),
            ("category", FieldDef::required_string()),
            ("popularity", FieldDef::required(FieldType::Float)),
        ],
    )
}

fn erasure_request_contract() -> RecordContract {
    // Wire format keeps the hyphenated key the sources emit.
    RecordContract::new(
        "erasure_requests",
        vec![
            ("customer-id", FieldDef::required_int()),
            ("email", FieldDef::required_string()),
        ],
    )
}
