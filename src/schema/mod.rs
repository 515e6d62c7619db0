//! Structural contracts and the generic shape validator.
//!
//! Each record kind has a closed, declarative contract (field name ->
//! type / required / nullable). One generic checker interprets all four
//! contracts; there is no per-kind parsing code.

mod contracts;
mod errors;
mod types;
mod validator;

pub use contracts::ContractCatalog;
pub use errors::{ShapeError, ShapeResult};
pub use types::{parse_decimal, FieldDef, FieldType, RecordContract};
pub use validator::{validate_shape, ValidatedRecord};
