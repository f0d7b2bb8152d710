//! SQL/native type conversion rules and family classification.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::native::{NativeTypeDescriptor, PrimitiveType};
use super::sql::{SqlDataType, SqlTypeName, TypeFamily};

/// Bidirectional SQL/native type mapping used by the binder.
///
/// Implementations must be safe for concurrent reads; the binder never
/// mutates them.
pub trait TypeMapping: Send + Sync {
    /// Classifies a SQL type.
    fn sql_family(&self, sql_type: &SqlDataType) -> TypeFamily;

    /// Classifies a native type.
    fn native_family(&self, native: &NativeTypeDescriptor) -> TypeFamily;

    /// Returns the native parameter type used for a SQL type when the
    /// external reference does not spell out parameter types.
    fn native_for_param(&self, sql_type: &SqlDataType) -> Option<NativeTypeDescriptor>;

    /// Returns the SQL type that values of a native type are exposed as.
    fn sql_for_native(&self, native: &NativeTypeDescriptor) -> Option<SqlTypeName>;
}

/// Table-driven [`TypeMapping`].
///
/// Built once at startup and shared immutably.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeRules {
    /// SQL type -> family.
    families: HashMap<SqlTypeName, TypeFamily>,
    /// Native qualified name -> SQL type.
    native_to_sql: HashMap<String, SqlTypeName>,
    /// SQL type -> native parameter type for implicit resolution.
    param_style: HashMap<SqlTypeName, NativeTypeDescriptor>,
}

impl Default for TypeRules {
    fn default() -> Self {
        let families = SqlTypeName::ALL
            .iter()
            .map(|t| (*t, t.default_family()))
            .collect();

        let native_to_sql = [
            ("boolean", SqlTypeName::Boolean),
            ("Boolean", SqlTypeName::Boolean),
            ("byte", SqlTypeName::TinyInt),
            ("Byte", SqlTypeName::TinyInt),
            ("short", SqlTypeName::SmallInt),
            ("Short", SqlTypeName::SmallInt),
            ("int", SqlTypeName::Integer),
            ("Integer", SqlTypeName::Integer),
            ("long", SqlTypeName::BigInt),
            ("Long", SqlTypeName::BigInt),
            ("float", SqlTypeName::Real),
            ("Float", SqlTypeName::Real),
            ("double", SqlTypeName::Double),
            ("Double", SqlTypeName::Double),
            ("String", SqlTypeName::Varchar),
            ("byte[]", SqlTypeName::Varbinary),
            ("Date", SqlTypeName::Date),
            ("Time", SqlTypeName::Time),
            ("Timestamp", SqlTypeName::Timestamp),
        ]
        .into_iter()
        .map(|(name, t)| (name.to_string(), t))
        .collect();

        let param_style = [
            (SqlTypeName::Boolean, PrimitiveType::Boolean.into()),
            (SqlTypeName::TinyInt, PrimitiveType::Byte.into()),
            (SqlTypeName::SmallInt, PrimitiveType::Short.into()),
            (SqlTypeName::Integer, PrimitiveType::Int.into()),
            (SqlTypeName::BigInt, PrimitiveType::Long.into()),
            (SqlTypeName::Real, PrimitiveType::Float.into()),
            (SqlTypeName::Float, PrimitiveType::Double.into()),
            (SqlTypeName::Double, PrimitiveType::Double.into()),
            (SqlTypeName::Char, NativeTypeDescriptor::reference("String")),
            (SqlTypeName::Varchar, NativeTypeDescriptor::reference("String")),
            (SqlTypeName::Binary, NativeTypeDescriptor::reference("byte[]")),
            (SqlTypeName::Varbinary, NativeTypeDescriptor::reference("byte[]")),
            (SqlTypeName::Date, NativeTypeDescriptor::reference("Date")),
            (SqlTypeName::Time, NativeTypeDescriptor::reference("Time")),
            (SqlTypeName::Timestamp, NativeTypeDescriptor::reference("Timestamp")),
        ]
        .into_iter()
        .collect();

        TypeRules {
            families,
            native_to_sql,
            param_style,
        }
    }
}

impl TypeRules {
    /// Creates the default rule tables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates rule tables with nothing registered; every type is unknown.
    #[must_use]
    pub fn empty() -> Self {
        TypeRules {
            families: HashMap::new(),
            native_to_sql: HashMap::new(),
            param_style: HashMap::new(),
        }
    }

    /// Overrides the family of a SQL type.
    #[must_use]
    pub fn with_family(mut self, sql_type: SqlTypeName, family: TypeFamily) -> Self {
        self.families.insert(sql_type, family);
        self
    }

    /// Declares the SQL type a native type is exposed as.
    #[must_use]
    pub fn with_native_mapping(mut self, native: impl Into<String>, sql_type: SqlTypeName) -> Self {
        self.native_to_sql.insert(native.into(), sql_type);
        self
    }

    /// Declares the native parameter type inferred for a SQL type.
    #[must_use]
    pub fn with_param_style(mut self, sql_type: SqlTypeName, native: NativeTypeDescriptor) -> Self {
        self.param_style.insert(sql_type, native);
        self
    }

    /// Removes the inferred native parameter type for a SQL type.
    #[must_use]
    pub fn without_param_style(mut self, sql_type: SqlTypeName) -> Self {
        self.param_style.remove(&sql_type);
        self
    }

    fn family_of(&self, sql_type: SqlTypeName) -> TypeFamily {
        self.families
            .get(&sql_type)
            .copied()
            .unwrap_or(TypeFamily::Unknown)
    }
}

// Tables compare structurally; `TypeFamily` equality treats Unknown as
// unequal to itself, so families are compared by variant here.
impl PartialEq for TypeRules {
    fn eq(&self, other: &Self) -> bool {
        self.families.len() == other.families.len()
            && self.families.iter().all(|(sql_type, family)| {
                other.families.get(sql_type).is_some_and(|f| {
                    std::mem::discriminant(f) == std::mem::discriminant(family)
                })
            })
            && self.native_to_sql == other.native_to_sql
            && self.param_style == other.param_style
    }
}

impl TypeMapping for TypeRules {
    fn sql_family(&self, sql_type: &SqlDataType) -> TypeFamily {
        self.family_of(sql_type.name)
    }

    fn native_family(&self, native: &NativeTypeDescriptor) -> TypeFamily {
        self.sql_for_native(native)
            .map_or(TypeFamily::Unknown, |t| self.family_of(t))
    }

    fn native_for_param(&self, sql_type: &SqlDataType) -> Option<NativeTypeDescriptor> {
        self.param_style.get(&sql_type.name).cloned()
    }

    fn sql_for_native(&self, native: &NativeTypeDescriptor) -> Option<SqlTypeName> {
        self.native_to_sql.get(native.qualified_name()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_native_families() {
        let rules = TypeRules::default();
        let int = NativeTypeDescriptor::from(PrimitiveType::Int);
        let long = NativeTypeDescriptor::reference("Long");
        assert!(rules
            .native_family(&int)
            .is_compatible_with(&rules.native_family(&long)));
        assert!(rules
            .native_family(&NativeTypeDescriptor::from(PrimitiveType::Void))
            .is_unknown());
    }

    #[test]
    fn test_param_style_prefers_primitives() {
        let rules = TypeRules::default();
        assert_eq!(
            rules.native_for_param(&SqlDataType::new(SqlTypeName::Integer)),
            Some(PrimitiveType::Int.into())
        );
        assert_eq!(
            rules.native_for_param(&SqlDataType::new(SqlTypeName::Varchar)),
            Some(NativeTypeDescriptor::reference("String"))
        );
    }

    #[test]
    fn test_empty_rules_classify_nothing() {
        let rules = TypeRules::empty();
        assert!(rules
            .sql_family(&SqlDataType::new(SqlTypeName::Integer))
            .is_unknown());
        assert_eq!(
            rules.native_for_param(&SqlDataType::new(SqlTypeName::Integer)),
            None
        );
    }

    #[test]
    fn test_family_override() {
        let rules = TypeRules::default().with_family(SqlTypeName::Date, TypeFamily::Timestamp);
        assert!(rules
            .sql_family(&SqlDataType::new(SqlTypeName::Date))
            .is_compatible_with(&TypeFamily::Timestamp));
    }

    #[test]
    fn test_rules_with_unknown_family_equal_themselves() {
        let rules = TypeRules::default().with_family(SqlTypeName::Date, TypeFamily::Unknown);
        assert_eq!(rules, rules.clone());
        assert_ne!(rules, TypeRules::default());
        assert_eq!(TypeRules::empty(), TypeRules::empty());
    }
}
