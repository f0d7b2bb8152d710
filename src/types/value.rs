//! SQL runtime values.

use serde::{Deserialize, Serialize};

use super::sql::SqlTypeName;

/// Runtime value container for SQL data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Integral value of any width.
    Int64(i64),
    /// REAL value.
    Float32(f32),
    /// FLOAT/DOUBLE value.
    Float64(f64),
    /// Boolean value.
    Bool(bool),
    /// Character string value.
    String(String),
    /// Byte string value.
    Bytes(Vec<u8>),
    /// Date value (days since Unix epoch).
    Date(i32),
    /// Time value (microseconds since midnight).
    Time(i64),
    /// Timestamp value (microseconds since Unix epoch).
    Timestamp(i64),
    /// Null value.
    Null,
}

impl Value {
    /// Returns true if this value is null.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true if this value can be stored in a column of the given type.
    ///
    /// Null conforms to every type; nullability is checked separately.
    #[must_use]
    pub fn conforms_to(&self, type_name: SqlTypeName) -> bool {
        match (self, type_name) {
            (Value::Null, _)
            | (Value::Bool(_), SqlTypeName::Boolean)
            | (Value::Float32(_), SqlTypeName::Real)
            | (Value::Float64(_), SqlTypeName::Float | SqlTypeName::Double)
            | (Value::String(_), SqlTypeName::Char | SqlTypeName::Varchar)
            | (Value::Bytes(_), SqlTypeName::Binary | SqlTypeName::Varbinary)
            | (Value::Date(_), SqlTypeName::Date)
            | (Value::Time(_), SqlTypeName::Time)
            | (Value::Timestamp(_), SqlTypeName::Timestamp) => true,
            (Value::Int64(v), t) => t
                .integral_range()
                .is_some_and(|(min, max)| (min..=max).contains(v)),
            _ => false,
        }
    }
}
