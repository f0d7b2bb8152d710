//! Host expression tree for synthesized routine invocations.
//!
//! The binder emits [`Expr`] trees that the embedding compiler splices into
//! its own plans. [`ExprConverter`] is the cast/assignment primitive the
//! binder delegates to, and [`Evaluator`] runs a tree over one row of
//! values.

mod convert;
mod eval;
mod node;

pub use convert::{AssignmentConverter, ExprConverter};
pub use eval::Evaluator;
pub use node::{Expr, InvocationExpression, NativeCall};
