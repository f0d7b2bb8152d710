//! SQL-side type definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Built-in SQL type names understood by the binder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SqlTypeName {
    /// BOOLEAN.
    Boolean,
    /// 8-bit signed integer.
    TinyInt,
    /// 16-bit signed integer.
    SmallInt,
    /// 32-bit signed integer.
    Integer,
    /// 64-bit signed integer.
    BigInt,
    /// Single precision floating point.
    Real,
    /// FLOAT (double precision).
    Float,
    /// Double precision floating point.
    Double,
    /// Fixed-length character string.
    Char,
    /// Variable-length character string.
    Varchar,
    /// Fixed-length byte string.
    Binary,
    /// Variable-length byte string.
    Varbinary,
    /// Date (days since epoch).
    Date,
    /// Time of day (microseconds since midnight).
    Time,
    /// Timestamp (microseconds since epoch).
    Timestamp,
}

impl SqlTypeName {
    /// All SQL type names, in declaration order.
    pub const ALL: [SqlTypeName; 15] = [
        SqlTypeName::Boolean,
        SqlTypeName::TinyInt,
        SqlTypeName::SmallInt,
        SqlTypeName::Integer,
        SqlTypeName::BigInt,
        SqlTypeName::Real,
        SqlTypeName::Float,
        SqlTypeName::Double,
        SqlTypeName::Char,
        SqlTypeName::Varchar,
        SqlTypeName::Binary,
        SqlTypeName::Varbinary,
        SqlTypeName::Date,
        SqlTypeName::Time,
        SqlTypeName::Timestamp,
    ];

    /// Returns the name of the type as written in SQL.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            SqlTypeName::Boolean => "BOOLEAN",
            SqlTypeName::TinyInt => "TINYINT",
            SqlTypeName::SmallInt => "SMALLINT",
            SqlTypeName::Integer => "INTEGER",
            SqlTypeName::BigInt => "BIGINT",
            SqlTypeName::Real => "REAL",
            SqlTypeName::Float => "FLOAT",
            SqlTypeName::Double => "DOUBLE",
            SqlTypeName::Char => "CHAR",
            SqlTypeName::Varchar => "VARCHAR",
            SqlTypeName::Binary => "BINARY",
            SqlTypeName::Varbinary => "VARBINARY",
            SqlTypeName::Date => "DATE",
            SqlTypeName::Time => "TIME",
            SqlTypeName::Timestamp => "TIMESTAMP",
        }
    }

    /// Looks up a type by its SQL name (case-insensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }

    /// Returns the built-in family of this type.
    ///
    /// This is the classification used when no family table overrides it.
    #[must_use]
    pub fn default_family(&self) -> TypeFamily {
        match self {
            SqlTypeName::Boolean => TypeFamily::Boolean,
            SqlTypeName::TinyInt
            | SqlTypeName::SmallInt
            | SqlTypeName::Integer
            | SqlTypeName::BigInt => TypeFamily::Integral,
            SqlTypeName::Real | SqlTypeName::Float | SqlTypeName::Double => {
                TypeFamily::ApproximateNumeric
            }
            SqlTypeName::Char | SqlTypeName::Varchar => TypeFamily::Character,
            SqlTypeName::Binary | SqlTypeName::Varbinary => TypeFamily::Binary,
            SqlTypeName::Date => TypeFamily::Date,
            SqlTypeName::Time => TypeFamily::Time,
            SqlTypeName::Timestamp => TypeFamily::Timestamp,
        }
    }

    /// Returns the inclusive value range for integral types.
    #[must_use]
    pub fn integral_range(&self) -> Option<(i64, i64)> {
        match self {
            SqlTypeName::TinyInt => Some((i64::from(i8::MIN), i64::from(i8::MAX))),
            SqlTypeName::SmallInt => Some((i64::from(i16::MIN), i64::from(i16::MAX))),
            SqlTypeName::Integer => Some((i64::from(i32::MIN), i64::from(i32::MAX))),
            SqlTypeName::BigInt => Some((i64::MIN, i64::MAX)),
            _ => None,
        }
    }
}

impl fmt::Display for SqlTypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A SQL type together with its nullability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SqlDataType {
    /// The underlying type name.
    pub name: SqlTypeName,
    /// Whether values of this type may be NULL.
    pub nullable: bool,
}

impl SqlDataType {
    /// Creates a nullable type, the default for declared routine types.
    #[must_use]
    pub fn new(name: SqlTypeName) -> Self {
        SqlDataType {
            name,
            nullable: true,
        }
    }

    /// Creates a NOT NULL type.
    #[must_use]
    pub fn not_null(name: SqlTypeName) -> Self {
        SqlDataType {
            name,
            nullable: false,
        }
    }

    /// Returns a copy of this type with the given nullability.
    #[must_use]
    pub fn with_nullability(self, nullable: bool) -> Self {
        SqlDataType { nullable, ..self }
    }
}

impl From<SqlTypeName> for SqlDataType {
    fn from(name: SqlTypeName) -> Self {
        SqlDataType::new(name)
    }
}

impl fmt::Display for SqlDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} NOT NULL", self.name)
        }
    }
}

/// Equivalence class grouping SQL and native types for binding purposes.
///
/// `Unknown` is never equal to any family, itself included, so it does not
/// implement `Eq`; use [`TypeFamily::is_compatible_with`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum TypeFamily {
    Boolean,
    Integral,
    ApproximateNumeric,
    Character,
    Binary,
    Date,
    Time,
    Timestamp,
    /// The type could not be classified.
    Unknown,
}

impl TypeFamily {
    /// Returns true if both families are known and identical.
    #[must_use]
    pub fn is_compatible_with(&self, other: &TypeFamily) -> bool {
        !self.is_unknown()
            && !other.is_unknown()
            && std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// Returns true for the unclassified family.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, TypeFamily::Unknown)
    }
}

impl PartialEq for TypeFamily {
    fn eq(&self, other: &Self) -> bool {
        self.is_compatible_with(other)
    }
}

impl fmt::Display for TypeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeFamily::Boolean => "boolean",
            TypeFamily::Integral => "integral",
            TypeFamily::ApproximateNumeric => "approximate numeric",
            TypeFamily::Character => "character",
            TypeFamily::Binary => "binary",
            TypeFamily::Date => "date",
            TypeFamily::Time => "time",
            TypeFamily::Timestamp => "timestamp",
            TypeFamily::Unknown => "unknown",
        };
        f.write_str(name)
    }
}
