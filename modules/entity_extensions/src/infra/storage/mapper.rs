//! Conversions between domain scalars/rows and SeaORM values

use crate::contract::FieldKind;
use crate::domain::casting::Scalar;
use crate::domain::repository::StoredRow;
use sea_orm::{JsonValue, Value};

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Null(FieldKind::Integer) => Value::BigInt(None),
            Scalar::Null(FieldKind::Boolean) => Value::Bool(None),
            Scalar::Null(_) => Value::String(None),
            Scalar::Text(s) => Value::from(s),
            Scalar::Int(i) => Value::from(i),
            Scalar::Bool(b) => Value::from(b),
        }
    }
}

/// A fetched row as a column map; non-object results yield an empty row
pub fn stored_row(json: JsonValue) -> StoredRow {
    match json {
        JsonValue::Object(row) => row,
        _ => StoredRow::new(),
    }
}
