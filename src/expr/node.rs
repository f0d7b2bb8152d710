//! Expression nodes produced for routine invocations.

use std::sync::Arc;

use crate::binder::ResolvedCallable;
use crate::types::{NativeTypeDescriptor, PrimitiveType, SqlDataType, SqlTypeName, Value};

/// Node of the host expression tree.
///
/// SQL-valued nodes carry a [`SqlDataType`]; `ToNative` and `NullableData`
/// produce values on the native side of a call boundary and only appear as
/// call arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Positional input of the enclosing expression (e.g. a routine operand).
    Input { index: usize, data_type: SqlDataType },

    /// Literal value (constant).
    Literal { value: Value, data_type: SqlDataType },

    /// Cast or assignment conversion.
    ///
    /// A non-nullable target over a nullable source fails at runtime when the
    /// operand is NULL.
    Cast {
        operand: Box<Expr>,
        source: SqlDataType,
        target: SqlDataType,
    },

    /// Extracts the primitive representation of a non-null SQL value.
    ToNative {
        operand: Box<Expr>,
        target: PrimitiveType,
        /// SQL type whose representation the primitive holds.
        carrier: SqlTypeName,
    },

    /// Extracts the nullable-aware representation of a SQL value for a
    /// reference-typed parameter. NULL passes through.
    NullableData {
        operand: Box<Expr>,
        target: NativeTypeDescriptor,
        /// SQL type whose representation the reference holds.
        carrier: SqlTypeName,
    },

    /// Invokes a native callable and wraps its result as a SQL value.
    FromNative {
        call: Box<NativeCall>,
        data_type: SqlDataType,
    },
}

impl Expr {
    /// Creates an input reference.
    #[must_use]
    pub fn input(index: usize, data_type: impl Into<SqlDataType>) -> Self {
        Expr::Input {
            index,
            data_type: data_type.into(),
        }
    }

    /// Creates a literal.
    #[must_use]
    pub fn literal(value: Value, data_type: impl Into<SqlDataType>) -> Self {
        Expr::Literal {
            value,
            data_type: data_type.into(),
        }
    }

    /// Returns the SQL type of this node, or `None` for native-valued nodes.
    #[must_use]
    pub fn data_type(&self) -> Option<SqlDataType> {
        match self {
            Expr::Input { data_type, .. }
            | Expr::Literal { data_type, .. }
            | Expr::FromNative { data_type, .. } => Some(*data_type),
            Expr::Cast { target, .. } => Some(*target),
            Expr::ToNative { .. } | Expr::NullableData { .. } => None,
        }
    }

    /// Returns true if this node is a conversion to a NOT NULL type from a
    /// nullable one.
    #[must_use]
    pub fn is_null_guard(&self) -> bool {
        matches!(self, Expr::Cast { source, target, .. } if source.nullable && !target.nullable)
    }

    /// Returns the first native call node in this subtree, depth first.
    #[must_use]
    pub fn find_call(&self) -> Option<&Expr> {
        match self {
            Expr::FromNative { .. } => Some(self),
            Expr::Cast { operand, .. }
            | Expr::ToNative { operand, .. }
            | Expr::NullableData { operand, .. } => operand.find_call(),
            Expr::Input { .. } | Expr::Literal { .. } => None,
        }
    }
}

/// Call of a resolved native callable with converted arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeCall {
    /// The callable to invoke.
    pub callable: Arc<ResolvedCallable>,
    /// One converted argument per native parameter.
    pub arguments: Vec<Expr>,
}

/// Synthesized invocation of an external routine.
///
/// The root expression converts the native result to the declared SQL
/// return type; it is handed to the caller's expression tree unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationExpression {
    callable: Arc<ResolvedCallable>,
    root: Expr,
    data_type: SqlDataType,
}

impl InvocationExpression {
    /// Creates an invocation expression.
    #[must_use]
    pub fn new(callable: Arc<ResolvedCallable>, root: Expr, data_type: SqlDataType) -> Self {
        InvocationExpression {
            callable,
            root,
            data_type,
        }
    }

    /// Returns the resolved callable.
    #[must_use]
    pub fn callable(&self) -> &Arc<ResolvedCallable> {
        &self.callable
    }

    /// Returns the root expression.
    #[must_use]
    pub fn root(&self) -> &Expr {
        &self.root
    }

    /// Consumes the invocation, returning the root expression.
    #[must_use]
    pub fn into_expr(self) -> Expr {
        self.root
    }

    /// Returns the declared SQL return type.
    #[must_use]
    pub fn data_type(&self) -> SqlDataType {
        self.data_type
    }

    /// Returns the return-value conversion wrapping the native call.
    #[must_use]
    pub fn return_conversion(&self) -> Option<&Expr> {
        self.root.find_call()
    }

    /// Returns the converted arguments of the native call.
    #[must_use]
    pub fn arguments(&self) -> &[Expr] {
        match self.return_conversion() {
            Some(Expr::FromNative { call, .. }) => &call.arguments,
            _ => &[],
        }
    }
}
