//! Lookup services for modules and native types.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::types::{NativeTypeDescriptor, PrimitiveType};

use super::module::NativeModule;

/// Loads native modules by qualified name.
///
/// Implementations must tolerate concurrent calls.
pub trait ModuleLoader: Send + Sync {
    /// Returns the module, or `None` if it is not available.
    fn load_module(&self, name: &str) -> Option<Arc<NativeModule>>;
}

/// Resolves native type names to descriptors.
///
/// Implementations must tolerate concurrent calls.
pub trait NativeTypeLoader: Send + Sync {
    /// Returns the descriptor, or `None` if the name is unknown.
    fn load_type(&self, name: &str) -> Option<NativeTypeDescriptor>;
}

/// Module registry that can be extended while binders read from it.
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    modules: RwLock<HashMap<String, Arc<NativeModule>>>,
}

impl ModuleRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a module, replacing any module with the same name.
    ///
    /// Returns the replaced module, if any.
    pub fn install(&self, module: NativeModule) -> Option<Arc<NativeModule>> {
        let name = module.name().to_string();
        debug!(module = %name, "installing native module");
        self.modules.write().insert(name, Arc::new(module))
    }

    /// Removes a module.
    pub fn uninstall(&self, name: &str) -> Option<Arc<NativeModule>> {
        self.modules.write().remove(name)
    }

    /// Returns the names of all installed modules.
    #[must_use]
    pub fn module_names(&self) -> Vec<String> {
        self.modules.read().keys().cloned().collect()
    }
}

impl ModuleLoader for ModuleRegistry {
    fn load_module(&self, name: &str) -> Option<Arc<NativeModule>> {
        self.modules.read().get(name).cloned()
    }
}

/// Native type names known to the host runtime.
#[derive(Debug, Clone)]
pub struct NativeTypeRegistry {
    types: HashMap<String, NativeTypeDescriptor>,
}

impl Default for NativeTypeRegistry {
    fn default() -> Self {
        let mut types: HashMap<String, NativeTypeDescriptor> = PrimitiveType::ALL
            .iter()
            .map(|p| (p.name().to_string(), NativeTypeDescriptor::Value(*p)))
            .collect();
        for name in [
            "Boolean",
            "Byte",
            "Short",
            "Integer",
            "Long",
            "Float",
            "Double",
            "String",
            "byte[]",
            "Date",
            "Time",
            "Timestamp",
        ] {
            types.insert(name.to_string(), NativeTypeDescriptor::reference(name));
        }
        NativeTypeRegistry { types }
    }
}

impl NativeTypeRegistry {
    /// Creates a registry with the built-in primitive and boxed types.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a type under a name, e.g. an alias or a user type.
    #[must_use]
    pub fn with_type(mut self, name: impl Into<String>, descriptor: NativeTypeDescriptor) -> Self {
        self.types.insert(name.into(), descriptor);
        self
    }
}

impl NativeTypeLoader for NativeTypeRegistry {
    fn load_type(&self, name: &str) -> Option<NativeTypeDescriptor> {
        self.types.get(name).cloned()
    }
}
