//! Callable registry.
//!
//! Native implementations are discovered through explicitly built modules
//! rather than runtime reflection:
//! - [`NativeModule`] groups callables under a qualified module name
//! - [`ModuleLoader`] and [`NativeTypeLoader`] are the lookup seams the
//!   binder depends on
//! - [`ModuleRegistry`] and [`NativeTypeRegistry`] are the in-process
//!   implementations

mod loader;
mod module;

pub use loader::{ModuleLoader, ModuleRegistry, NativeTypeLoader, NativeTypeRegistry};
pub use module::{format_signature, NativeCallable, NativeFn, NativeModule, Receiver, Visibility};
