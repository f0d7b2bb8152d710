//! Native-side type descriptors and runtime values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Primitive native types. Instances can never be null.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    /// No value; only valid as a return type.
    Void,
}

impl PrimitiveType {
    /// All primitive types.
    pub const ALL: [PrimitiveType; 8] = [
        PrimitiveType::Boolean,
        PrimitiveType::Byte,
        PrimitiveType::Short,
        PrimitiveType::Int,
        PrimitiveType::Long,
        PrimitiveType::Float,
        PrimitiveType::Double,
        PrimitiveType::Void,
    ];

    /// Returns the native spelling of this type.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Short => "short",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
            PrimitiveType::Void => "void",
        }
    }

    /// Looks up a primitive by its native spelling.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.name() == name)
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Describes one native parameter or return type.
///
/// Conversion strategy is chosen by matching on the variant: value types need
/// a null guard at the call boundary, reference types carry nullability
/// through.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NativeTypeDescriptor {
    /// A primitive, non-nullable type.
    Value(PrimitiveType),
    /// A reference type identified by its qualified name.
    Reference(String),
}

impl NativeTypeDescriptor {
    /// Creates a reference type descriptor.
    #[must_use]
    pub fn reference(name: impl Into<String>) -> Self {
        NativeTypeDescriptor::Reference(name.into())
    }

    /// Returns true for primitive-like, non-nullable types.
    #[must_use]
    pub fn is_value_type(&self) -> bool {
        matches!(self, NativeTypeDescriptor::Value(_))
    }

    /// Returns the qualified name of the type.
    #[must_use]
    pub fn qualified_name(&self) -> &str {
        match self {
            NativeTypeDescriptor::Value(p) => p.name(),
            NativeTypeDescriptor::Reference(name) => name,
        }
    }

    /// Returns true for the `void` primitive.
    #[must_use]
    pub fn is_void(&self) -> bool {
        matches!(self, NativeTypeDescriptor::Value(PrimitiveType::Void))
    }
}

impl From<PrimitiveType> for NativeTypeDescriptor {
    fn from(p: PrimitiveType) -> Self {
        NativeTypeDescriptor::Value(p)
    }
}

impl fmt::Display for NativeTypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.qualified_name())
    }
}

/// Runtime value passed across the native call boundary.
///
/// Boxed reference types reuse the primitive variants; `Null` is only ever
/// produced for reference types.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeValue {
    Null,
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    /// Days since epoch.
    Date(i32),
    /// Microseconds since midnight.
    Time(i64),
    /// Microseconds since epoch.
    Timestamp(i64),
    /// Result of a `void` callable.
    Void,
}

impl NativeValue {
    /// Returns true if this value is null.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, NativeValue::Null)
    }

    /// Widens any integral variant to i64.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            NativeValue::Byte(v) => Some(i64::from(*v)),
            NativeValue::Short(v) => Some(i64::from(*v)),
            NativeValue::Int(v) => Some(i64::from(*v)),
            NativeValue::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// Widens any floating point variant to f64.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            NativeValue::Float(v) => Some(f64::from(*v)),
            NativeValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Attempts to extract a string reference.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            NativeValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }
}
