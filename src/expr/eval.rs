//! Row-at-a-time evaluation of synthesized invocation trees.

use crate::error::{RbindError, Result};
use crate::types::{NativeValue, PrimitiveType, SqlDataType, SqlTypeName, Value};

use super::node::{Expr, NativeCall};

/// Evaluates expressions over a row of SQL input values.
pub struct Evaluator;

impl Evaluator {
    /// Evaluates a SQL-valued expression.
    ///
    /// # Errors
    ///
    /// Returns an error if an input is missing, a NULL reaches a non-nullable
    /// position, a value does not fit its target type, or the native callable
    /// fails.
    pub fn evaluate(expr: &Expr, inputs: &[Value]) -> Result<Value> {
        match expr {
            Expr::Input { index, .. } => inputs.get(*index).cloned().ok_or_else(|| {
                RbindError::Evaluation(format!("Input {index} not provided"))
            }),
            Expr::Literal { value, .. } => Ok(value.clone()),
            Expr::Cast {
                operand,
                source,
                target,
            } => {
                let value = Self::evaluate(operand, inputs)?;
                Self::cast(value, *source, *target)
            }
            Expr::FromNative { call, data_type } => {
                let result = Self::invoke(call, inputs)?;
                native_to_sql(result, *data_type)
            }
            Expr::ToNative { .. } | Expr::NullableData { .. } => Err(RbindError::Evaluation(
                "Native-valued expression used outside a call".into(),
            )),
        }
    }

    /// Evaluates a call argument to its native value.
    fn evaluate_native(expr: &Expr, inputs: &[Value]) -> Result<NativeValue> {
        match expr {
            Expr::ToNative {
                operand,
                target,
                carrier,
            } => {
                let value = Self::evaluate(operand, inputs)?;
                if value.is_null() {
                    return Err(RbindError::NullViolation(format!(
                        "NULL cannot be passed as native {carrier} value"
                    )));
                }
                to_primitive(&value, *target)
            }
            Expr::NullableData {
                operand, carrier, ..
            } => {
                let value = Self::evaluate(operand, inputs)?;
                sql_to_native(&value, *carrier)
            }
            _ => Err(RbindError::Evaluation(
                "Call argument is not a native conversion".into(),
            )),
        }
    }

    fn invoke(call: &NativeCall, inputs: &[Value]) -> Result<NativeValue> {
        let args = call
            .arguments
            .iter()
            .map(|arg| Self::evaluate_native(arg, inputs))
            .collect::<Result<Vec<_>>>()?;
        call.callable.invoke(&args)
    }

    /// Applies a cast/assignment conversion to a value.
    fn cast(value: Value, source: SqlDataType, target: SqlDataType) -> Result<Value> {
        if value.is_null() {
            if target.nullable {
                return Ok(Value::Null);
            }
            return Err(RbindError::NullViolation(format!(
                "Cannot assign NULL of type {source} to {target}"
            )));
        }

        let converted = match (value, target.name) {
            (Value::Float64(f), SqlTypeName::Real) => Value::Float32(narrow_to_real(f)?),
            (Value::Float32(f), SqlTypeName::Float | SqlTypeName::Double) => {
                Value::Float64(f64::from(f))
            }
            (value, _) => value,
        };

        if converted.conforms_to(target.name) {
            Ok(converted)
        } else {
            Err(RbindError::Evaluation(format!(
                "Value {converted:?} cannot be converted from {source} to {target}"
            )))
        }
    }
}

/// Converts a non-null SQL value to a primitive of type `target`.
fn to_primitive(value: &Value, target: PrimitiveType) -> Result<NativeValue> {
    let out_of_range = |v: i64| {
        RbindError::Evaluation(format!("Value {v} out of range for native {target}"))
    };

    let native = match (value, target) {
        (Value::Bool(b), PrimitiveType::Boolean) => NativeValue::Boolean(*b),
        (Value::Int64(v), PrimitiveType::Byte) => {
            NativeValue::Byte(i8::try_from(*v).map_err(|_| out_of_range(*v))?)
        }
        (Value::Int64(v), PrimitiveType::Short) => {
            NativeValue::Short(i16::try_from(*v).map_err(|_| out_of_range(*v))?)
        }
        (Value::Int64(v), PrimitiveType::Int) => {
            NativeValue::Int(i32::try_from(*v).map_err(|_| out_of_range(*v))?)
        }
        (Value::Int64(v), PrimitiveType::Long) => NativeValue::Long(*v),
        (Value::Float32(f), PrimitiveType::Float) => NativeValue::Float(*f),
        (Value::Float64(f), PrimitiveType::Float) => NativeValue::Float(narrow_to_real(*f)?),
        (Value::Float32(f), PrimitiveType::Double) => NativeValue::Double(f64::from(*f)),
        (Value::Float64(f), PrimitiveType::Double) => NativeValue::Double(*f),
        (value, target) => {
            return Err(RbindError::Evaluation(format!(
                "Value {value:?} has no native {target} representation"
            )))
        }
    };
    Ok(native)
}

/// Narrows a double to REAL precision.
///
/// A finite value beyond the REAL range is an error; infinities and NaN
/// carry over.
fn narrow_to_real(f: f64) -> Result<f32> {
    let narrowed = f as f32;
    if f.is_finite() && !narrowed.is_finite() {
        return Err(RbindError::Evaluation(format!(
            "Value {f} out of range for REAL"
        )));
    }
    Ok(narrowed)
}

/// Converts a non-null SQL value to the native representation of `carrier`.
fn sql_to_native(value: &Value, carrier: SqlTypeName) -> Result<NativeValue> {
    let out_of_range = |v: i64| {
        RbindError::Evaluation(format!("Value {v} out of range for native {carrier}"))
    };

    let native = match (value, carrier) {
        (Value::Null, _) => NativeValue::Null,
        (Value::Bool(b), SqlTypeName::Boolean) => NativeValue::Boolean(*b),
        (Value::Int64(v), SqlTypeName::TinyInt) => {
            NativeValue::Byte(i8::try_from(*v).map_err(|_| out_of_range(*v))?)
        }
        (Value::Int64(v), SqlTypeName::SmallInt) => {
            NativeValue::Short(i16::try_from(*v).map_err(|_| out_of_range(*v))?)
        }
        (Value::Int64(v), SqlTypeName::Integer) => {
            NativeValue::Int(i32::try_from(*v).map_err(|_| out_of_range(*v))?)
        }
        (Value::Int64(v), SqlTypeName::BigInt) => NativeValue::Long(*v),
        (Value::Float32(f), SqlTypeName::Real) => NativeValue::Float(*f),
        (Value::Float64(f), SqlTypeName::Real) => NativeValue::Float(narrow_to_real(*f)?),
        (Value::Float32(f), SqlTypeName::Float | SqlTypeName::Double) => {
            NativeValue::Double(f64::from(*f))
        }
        (Value::Float64(f), SqlTypeName::Float | SqlTypeName::Double) => NativeValue::Double(*f),
        (Value::String(s), SqlTypeName::Char | SqlTypeName::Varchar) => {
            NativeValue::String(s.clone())
        }
        (Value::Bytes(b), SqlTypeName::Binary | SqlTypeName::Varbinary) => {
            NativeValue::Bytes(b.clone())
        }
        (Value::Date(d), SqlTypeName::Date) => NativeValue::Date(*d),
        (Value::Time(t), SqlTypeName::Time) => NativeValue::Time(*t),
        (Value::Timestamp(t), SqlTypeName::Timestamp) => NativeValue::Timestamp(*t),
        (value, carrier) => {
            return Err(RbindError::Evaluation(format!(
                "Value {value:?} has no native {carrier} representation"
            )))
        }
    };
    Ok(native)
}

/// Wraps a native result as a SQL value of `data_type`.
fn native_to_sql(value: NativeValue, data_type: SqlDataType) -> Result<Value> {
    let mismatch = |value: &NativeValue| {
        RbindError::Evaluation(format!(
            "Native result {value:?} cannot be read as {data_type}"
        ))
    };

    if value.is_null() {
        if data_type.nullable {
            return Ok(Value::Null);
        }
        return Err(RbindError::NullViolation(format!(
            "Native callable returned NULL for {data_type}"
        )));
    }

    let sql = match data_type.name {
        SqlTypeName::Boolean => match value {
            NativeValue::Boolean(b) => Value::Bool(b),
            other => return Err(mismatch(&other)),
        },
        SqlTypeName::TinyInt
        | SqlTypeName::SmallInt
        | SqlTypeName::Integer
        | SqlTypeName::BigInt => Value::Int64(value.as_i64().ok_or_else(|| mismatch(&value))?),
        SqlTypeName::Real => {
            Value::Float32(narrow_to_real(value.as_f64().ok_or_else(|| mismatch(&value))?)?)
        }
        SqlTypeName::Float | SqlTypeName::Double => {
            Value::Float64(value.as_f64().ok_or_else(|| mismatch(&value))?)
        }
        SqlTypeName::Char | SqlTypeName::Varchar => match value {
            NativeValue::String(s) => Value::String(s),
            other => return Err(mismatch(&other)),
        },
        SqlTypeName::Binary | SqlTypeName::Varbinary => match value {
            NativeValue::Bytes(b) => Value::Bytes(b),
            other => return Err(mismatch(&other)),
        },
        SqlTypeName::Date => match value {
            NativeValue::Date(d) => Value::Date(d),
            other => return Err(mismatch(&other)),
        },
        SqlTypeName::Time => match value {
            NativeValue::Time(t) => Value::Time(t),
            other => return Err(mismatch(&other)),
        },
        SqlTypeName::Timestamp => match value {
            NativeValue::Timestamp(t) => Value::Timestamp(t),
            other => return Err(mismatch(&other)),
        },
    };
    Ok(sql)
}
