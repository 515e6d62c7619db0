//! Declarative contract types.
//!
//! Supported primitives:
//! - string: UTF-8 string
//! - int: 64-bit signed integer
//! - float: 64-bit floating point (accepts integer literals)
//! - bool: Boolean
//! - date: string in `YYYY-MM-DD` form
//! - date-time: string in RFC 3339 form
//! - uuid: string in canonical UUID form
//! - decimal: currency amount, JSON number or numeric string
//! - object: nested object with its own closed field set
//! - array: homogeneous array with a single element type
//!
//! Field declaration order is significant: the validator checks declared
//! fields in order, so the "first violated rule" is deterministic.

use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

/// Field data types interpreted by the shape validator.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    String,
    Int,
    Float,
    Bool,
    Date,
    DateTime,
    Uuid,
    Decimal,
    /// Nested object with its own closed field set
    Object { fields: Vec<(String, FieldDef)> },
    /// Homogeneous array (boxed to allow recursive types)
    Array { element_type: Box<FieldType> },
}

impl FieldType {
    /// Type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Int => "int",
            FieldType::Float => "float",
            FieldType::Bool => "bool",
            FieldType::Date => "date (YYYY-MM-DD)",
            FieldType::DateTime => "date-time (RFC 3339)",
            FieldType::Uuid => "uuid",
            FieldType::Decimal => "decimal",
            FieldType::Object { .. } => "object",
            FieldType::Array { .. } => "array",
        }
    }
}

/// One field's contract: type, presence, nullability.
///
/// `required` governs whether the key may be absent; `nullable` governs
/// whether a present key may hold JSON null.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub field_type: FieldType,
    pub required: bool,
    pub nullable: bool,
}

impl FieldDef {
    pub fn required(field_type: FieldType) -> Self {
        Self {
            field_type,
            required: true,
            nullable: false,
        }
    }

    /// Optional and nullable: the key may be absent, and a present key may
    /// hold null.
    pub fn optional(field_type: FieldType) -> Self {
        Self {
            field_type,
            required: false,
            nullable: true,
        }
    }

    pub fn required_string() -> Self {
        Self::required(FieldType::String)
    }

    pub fn required_int() -> Self {
        Self::required(FieldType::Int)
    }

    pub fn required_decimal() -> Self {
        Self::required(FieldType::Decimal)
    }

    pub fn required_object(fields: Vec<(&str, FieldDef)>) -> Self {
        Self::required(FieldType::Object {
            fields: own_fields(fields),
        })
    }

    pub fn required_array(element_type: FieldType) -> Self {
        Self::required(FieldType::Array {
            element_type: Box::new(element_type),
        })
    }
}

/// A record kind's complete closed contract.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordContract {
    name: &'static str,
    fields: Vec<(String, FieldDef)>,
}

impl RecordContract {
    pub fn new(name: &'static str, fields: Vec<(&str, FieldDef)>) -> Self {
        Self {
            name,
            fields: own_fields(fields),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declared fields in declaration order.
    pub fn fields(&self) -> &[(String, FieldDef)] {
        &self.fields
    }

    /// Looks up a declared field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields
            .iter()
            .find(|(field_name, _)| field_name == name)
            .map(|(_, def)| def)
    }
}

fn own_fields(fields: Vec<(&str, FieldDef)>) -> Vec<(String, FieldDef)> {
    fields
        .into_iter()
        .map(|(name, def)| (name.to_string(), def))
        .collect()
}

/// Parses a currency amount from a JSON number or numeric string.
///
/// The staging files carry prices both ways; exact decimal parsing avoids
/// binary-float drift in the arithmetic checks downstream.
pub fn parse_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}
