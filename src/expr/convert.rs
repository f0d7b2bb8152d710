//! Cast and assignment conversions.

use std::fmt;
use std::sync::Arc;

use crate::types::{SqlDataType, TypeMapping, TypeRules};

use super::node::Expr;

/// Builds cast/assignment conversions in the host expression tree.
pub trait ExprConverter: Send + Sync {
    /// Converts `expr` of type `source` to `target`.
    ///
    /// Returns `None` if the conversion cannot be expressed.
    fn convert_cast_or_assignment(
        &self,
        target: SqlDataType,
        source: SqlDataType,
        expr: Expr,
    ) -> Option<Expr>;
}

/// Converter following SQL assignment rules: conversions stay within a
/// type family, as classified by the injected [`TypeMapping`].
///
/// Always emits a [`Expr::Cast`] node, even for identical types, so the
/// null guard of a value-typed argument is visible in the tree.
#[derive(Clone)]
pub struct AssignmentConverter {
    mapping: Arc<dyn TypeMapping>,
}

impl AssignmentConverter {
    /// Creates a converter classifying types with `mapping`.
    #[must_use]
    pub fn new(mapping: Arc<dyn TypeMapping>) -> Self {
        AssignmentConverter { mapping }
    }
}

impl Default for AssignmentConverter {
    fn default() -> Self {
        Self::new(Arc::new(TypeRules::default()))
    }
}

impl fmt::Debug for AssignmentConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssignmentConverter").finish_non_exhaustive()
    }
}

impl ExprConverter for AssignmentConverter {
    fn convert_cast_or_assignment(
        &self,
        target: SqlDataType,
        source: SqlDataType,
        expr: Expr,
    ) -> Option<Expr> {
        let source_family = self.mapping.sql_family(&source);
        if !source_family.is_compatible_with(&self.mapping.sql_family(&target)) {
            return None;
        }
        Some(Expr::Cast {
            operand: Box::new(expr),
            source,
            target,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SqlTypeName, TypeFamily};

    #[test]
    fn test_same_family_converts() {
        let source = SqlDataType::new(SqlTypeName::Integer);
        let target = SqlDataType::not_null(SqlTypeName::BigInt);
        let expr = AssignmentConverter::default()
            .convert_cast_or_assignment(target, source, Expr::input(0, source))
            .unwrap();
        assert_eq!(expr.data_type(), Some(target));
        assert!(expr.is_null_guard());
    }

    #[test]
    fn test_identical_types_still_cast() {
        let t = SqlDataType::not_null(SqlTypeName::Double);
        let expr = AssignmentConverter::default()
            .convert_cast_or_assignment(t, t, Expr::input(0, t))
            .unwrap();
        assert!(matches!(expr, Expr::Cast { .. }));
    }

    #[test]
    fn test_cross_family_rejected() {
        let source = SqlDataType::new(SqlTypeName::Varchar);
        let target = SqlDataType::new(SqlTypeName::Integer);
        assert!(AssignmentConverter::default()
            .convert_cast_or_assignment(target, source, Expr::input(0, source))
            .is_none());
    }

    #[test]
    fn test_families_come_from_mapping() {
        let source = SqlDataType::new(SqlTypeName::Timestamp);
        let target = SqlDataType::new(SqlTypeName::Date);
        assert!(AssignmentConverter::default()
            .convert_cast_or_assignment(target, source, Expr::input(0, source))
            .is_none());

        let rules = TypeRules::default().with_family(SqlTypeName::Date, TypeFamily::Timestamp);
        let converter = AssignmentConverter::new(Arc::new(rules));
        assert!(converter
            .convert_cast_or_assignment(target, source, Expr::input(0, source))
            .is_some());
    }
}
