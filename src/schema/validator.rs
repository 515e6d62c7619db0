//! Generic structural checker.
//!
//! Validation semantics:
//! - All required fields are present
//! - No undeclared fields exist (closed contracts, fail closed)
//! - Field types match exactly, no coercion
//! - Null is legal only where the contract says nullable
//! - Nested objects and array elements are checked recursively
//!
//! The checker is fail-fast: it reports the first violation and stops.
//! It never mutates the record and performs no I/O.

use chrono::{DateTime, NaiveDate};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::errors::{ShapeError, ShapeResult};
use super::types::{parse_decimal, FieldDef, FieldType, RecordContract};

/// A structurally-valid record: proof that `validate_shape` passed.
///
/// Semantic checks take this type, not a raw `Value`, so a record cannot
/// reach business rules without passing the structural contract first.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedRecord<'a> {
    fields: &'a Map<String, Value>,
}

impl<'a> ValidatedRecord<'a> {
    /// The underlying field map.
    pub fn fields(&self) -> &'a Map<String, Value> {
        self.fields
    }

    /// A field's raw value, if present and non-null.
    pub fn get(&self, name: &str) -> Option<&'a Value> {
        self.fields.get(name).filter(|v| !v.is_null())
    }

    pub fn str_field(&self, name: &str) -> Option<&'a str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn int_field(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }
}

/// Validates a record against a contract.
///
/// Returns a `ValidatedRecord` witness on success, or the first violated
/// structural rule.
pub fn validate_shape<'a>(
    record: &'a Value,
    contract: &RecordContract,
) -> ShapeResult<ValidatedRecord<'a>> {
    let fields = record.as_object().ok_or(ShapeError::NotAnObject {
        actual: json_type_name(record),
    })?;

    validate_object(fields, contract.fields(), "")?;

    Ok(ValidatedRecord { fields })
}

/// Checks one object level: closed field set, then each declared field in
/// declaration order.
fn validate_object(
    obj: &Map<String, Value>,
    declared: &[(String, FieldDef)],
    path_prefix: &str,
) -> ShapeResult<()> {
    for key in obj.keys() {
        if !declared.iter().any(|(name, _)| name == key) {
            return Err(ShapeError::undeclared(join_path(path_prefix, key)));
        }
    }

    for (name, def) in declared {
        let path = join_path(path_prefix, name);
        match obj.get(name) {
            None => {
                if def.required {
                    return Err(ShapeError::missing(path));
                }
            }
            Some(Value::Null) => {
                if !def.nullable {
                    return Err(ShapeError::null(path));
                }
            }
            Some(value) => validate_value(value, &def.field_type, &path)?,
        }
    }

    Ok(())
}

fn validate_value(value: &Value, expected: &FieldType, path: &str) -> ShapeResult<()> {
    match expected {
        FieldType::String => {
            if !value.is_string() {
                return Err(type_error(path, expected, value));
            }
        }
        FieldType::Int => {
            if !value.is_i64() && !value.is_u64() {
                return Err(type_error(path, expected, value));
            }
        }
        FieldType::Float => {
            // Integer literals are acceptable floats.
            if !value.is_number() {
                return Err(type_error(path, expected, value));
            }
        }
        FieldType::Bool => {
            if !value.is_boolean() {
                return Err(type_error(path, expected, value));
            }
        }
        FieldType::Date => {
            let parsed = value
                .as_str()
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok());
            if parsed.is_none() {
                return Err(type_error(path, expected, value));
            }
        }
        FieldType::DateTime => {
            let parsed = value
                .as_str()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok());
            if parsed.is_none() {
                return Err(type_error(path, expected, value));
            }
        }
        FieldType::Uuid => {
            let parsed = value.as_str().and_then(|s| Uuid::parse_str(s).ok());
            if parsed.is_none() {
                return Err(type_error(path, expected, value));
            }
        }
        FieldType::Decimal => {
            if parse_decimal(value).is_none() {
                return Err(type_error(path, expected, value));
            }
        }
        FieldType::Object { fields } => {
            let obj = value
                .as_object()
                .ok_or_else(|| type_error(path, expected, value))?;
            validate_object(obj, fields, path)?;
        }
        FieldType::Array { element_type } => {
            let arr = value
                .as_array()
                .ok_or_else(|| type_error(path, expected, value))?;
            for (i, elem) in arr.iter().enumerate() {
                let elem_path = format!("{}[{}]", path, i);
                if elem.is_null() {
                    return Err(ShapeError::null(elem_path));
                }
                validate_value(elem, element_type, &elem_path)?;
            }
        }
    }

    Ok(())
}

/// JSON type name for error messages.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "int"
            } else {
                "float"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn join_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}

fn type_error(path: &str, expected: &FieldType, actual: &Value) -> ShapeError {
    ShapeError::mismatch(path, expected.type_name(), json_type_name(actual))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DatasetKind;
    use crate::schema::ContractCatalog;
    use serde_json::json;

    fn catalog() -> ContractCatalog {
        ContractCatalog::new()
    }

    fn valid_customer() -> Value {
        json!({
            "id": 12,
            "first_name": "Jane",
            "last_name": "Doe",
            "email": "jane.doe@example.com",
            "address": "4 Elm Street",
            "city": "Leeds",
            "country": "UK",
            "postcode": "LS1 4AB"
        })
    }

    #[test]
    fn test_valid_customer_passes() {
        let catalog = catalog();
        let record = valid_customer();
        let contract = catalog.contract_for(DatasetKind::Customers);
        assert!(validate_shape(&record, contract).is_ok());
    }

    #[test]
    fn test_missing_required_field_fails_with_field_name() {
        let catalog = catalog();
        let mut record = valid_customer();
        record.as_object_mut().unwrap().remove("email");

        let err = validate_shape(&record, catalog.contract_for(DatasetKind::Customers))
            .unwrap_err();
        assert_eq!(err, ShapeError::missing("email"));
    }

    #[test]
    fn test_undeclared_field_fails_closed() {
        let catalog = catalog();
        let mut record = valid_customer();
        record
            .as_object_mut()
            .unwrap()
            .insert("loyalty_points".into(), json!(250));

        let err = validate_shape(&record, catalog.contract_for(DatasetKind::Customers))
            .unwrap_err();
        assert_eq!(err, ShapeError::undeclared("loyalty_points"));
    }

    #[test]
    fn test_type_mismatch_reports_expected_and_actual() {
        let catalog = catalog();
        let mut record = valid_customer();
        record.as_object_mut().unwrap().insert("id".into(), json!("12"));

        let err = validate_shape(&record, catalog.contract_for(DatasetKind::Customers))
            .unwrap_err();
        assert_eq!(err, ShapeError::mismatch("id", "int", "string"));
    }

    #[test]
    fn test_nullable_fields_accept_null_and_absence() {
        let catalog = catalog();
        let mut record = valid_customer();
        record
            .as_object_mut()
            .unwrap()
            .insert("phone_number".into(), Value::Null);

        let contract = catalog.contract_for(DatasetKind::Customers);
        assert!(validate_shape(&record, contract).is_ok());
    }

    #[test]
    fn test_null_in_required_field_is_rejected() {
        let catalog = catalog();
        let mut record = valid_customer();
        record
            .as_object_mut()
            .unwrap()
            .insert("email".into(), Value::Null);

        let err = validate_shape(&record, catalog.contract_for(DatasetKind::Customers))
            .unwrap_err();
        assert_eq!(err, ShapeError::null("email"));
    }

    #[test]
    fn test_bad_date_format_is_a_type_error() {
        let catalog = catalog();
        let mut record = valid_customer();
        record
            .as_object_mut()
            .unwrap()
            .insert("date_of_birth".into(), json!("01/02/1990"));

        let err = validate_shape(&record, catalog.contract_for(DatasetKind::Customers))
            .unwrap_err();
        assert!(matches!(err, ShapeError::TypeMismatch { ref path, .. } if path == "date_of_birth"));
    }

    fn valid_transaction() -> Value {
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
                "products": [
                    {"sku": 1001, "quantity": 2, "price": "10.00", "total": "20.00"},
                    {"sku": 1002, "quantity": 1, "price": "5.50", "total": "5.50"}
                ],
                "total_cost": "25.50"
            }
        })
    }

    #[test]
    fn test_valid_transaction_passes() {
        let catalog = catalog();
        let record = valid_transaction();
        let contract = catalog.contract_for(DatasetKind::Transactions);
        assert!(validate_shape(&record, contract).is_ok());
    }

    #[test]
    fn test_nested_missing_field_has_full_path() {
        let catalog = catalog();
        let mut record = valid_transaction();
        record["delivery_address"]
            .as_object_mut()
            .unwrap()
            .remove("postcode");

        let err = validate_shape(&record, catalog.contract_for(DatasetKind::Transactions))
            .unwrap_err();
        assert_eq!(err, ShapeError::missing("delivery_address.postcode"));
    }

    #[test]
    fn test_array_element_error_has_index_path() {
        let catalog = catalog();
        let mut record = valid_transaction();
        record["purchases"]["products"][1]["quantity"] = json!("one");

        let err = validate_shape(&record, catalog.contract_for(DatasetKind::Transactions))
            .unwrap_err();
        assert_eq!(
            err,
            ShapeError::mismatch("purchases.products[1].quantity", "int", "string")
        );
    }

    #[test]
    fn test_malformed_uuid_rejected() {
        let catalog = catalog();
        let mut record = valid_transaction();
        record["transaction_id"] = json!("not-a-uuid");

        let err = validate_shape(&record, catalog.contract_for(DatasetKind::Transactions))
            .unwrap_err();
        assert!(matches!(err, ShapeError::TypeMismatch { ref path, .. } if path == "transaction_id"));
    }

    #[test]
    fn test_decimal_accepts_number_or_string() {
        let catalog = catalog();
        let mut record = valid_transaction();
        record["purchases"]["products"][0]["price"] = json!(10.00);
        record["purchases"]["products"][0]["total"] = json!(20.00);

        let contract = catalog.contract_for(DatasetKind::Transactions);
        assert!(validate_shape(&record, contract).is_ok());
    }

    #[test]
    fn test_non_object_record_rejected() {
        let catalog = catalog();
        let record = json!([1, 2, 3]);
        let err = validate_shape(&record, catalog.contract_for(DatasetKind::Products))
            .unwrap_err();
        assert_eq!(err, ShapeError::NotAnObject { actual: "array" });
    }

    #[test]
    fn test_validation_is_deterministic() {
        let catalog = catalog();
        let mut record = valid_customer();
        let obj = record.as_object_mut().unwrap();
        obj.remove("email");
        obj.remove("city");

        let contract = catalog.contract_for(DatasetKind::Customers);
        let first = validate_shape(&record, contract).unwrap_err();
        for _ in 0..50 {
            assert_eq!(validate_shape(&record, contract).unwrap_err(), first);
        }
    }

    #[test]
    fn test_validated_record_accessors() {
        let catalog = catalog();
        let record = valid_customer();
        let contract = catalog.contract_for(DatasetKind::Customers);
        let validated = validate_shape(&record, contract).unwrap();

        assert_eq!(validated.int_field("id"), Some(12));
        assert_eq!(validated.str_field("email"), Some("jane.doe@example.com"));
        assert_eq!(validated.str_field("phone_number"), None);
    }
}
