//! Type definitions shared by the binder stages.
//!
//! - SQL types with nullability and their families
//! - Native type descriptors and call-boundary values
//! - Conversion rule tables mapping between the two

mod native;
mod rules;
mod sql;
mod value;

pub use native::{NativeTypeDescriptor, NativeValue, PrimitiveType};
pub use rules::{TypeMapping, TypeRules};
pub use sql::{SqlDataType, SqlTypeName, TypeFamily};
pub use value::Value;
