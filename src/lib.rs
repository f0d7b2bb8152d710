//! rbind - external routine binder
//!
//! Binds SQL routine declarations to native callables and synthesizes the
//! invocation expression a query compiler embeds in its plans.
//!
//! ```text
//! external reference ──parse──▶ CalleeLocator
//!                    ──resolve─▶ native parameter types
//!                    ──locate──▶ ResolvedCallable
//!                    ──check───▶ family compatibility
//!                    ──synth───▶ InvocationExpression
//! ```

pub mod binder;
pub mod catalog;
pub mod config;
pub mod error;
pub mod expr;
pub mod parser;
pub mod registry;
pub mod types;

pub use binder::{ResolvedCallable, RoutineBinder};
pub use catalog::{RoutineCatalog, RoutineDeclaration, RoutineParameter};
pub use config::{BinderConfig, DEFAULT_LIBRARY_PREFIX};
pub use error::{BindingError, ConversionDirection, RbindError, Result, Site};
pub use expr::{Evaluator, Expr, InvocationExpression};
pub use parser::CalleeLocator;
pub use registry::{ModuleRegistry, NativeModule, NativeTypeRegistry};
pub use types::{
    NativeTypeDescriptor, NativeValue, PrimitiveType, SqlDataType, SqlTypeName, TypeFamily, Value,
};
