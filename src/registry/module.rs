//! Native modules and the callables they export.

use std::fmt;
use std::sync::Arc;

use crate::types::{NativeTypeDescriptor, NativeValue};

/// Body of a native callable.
pub type NativeFn =
    Arc<dyn Fn(&[NativeValue]) -> std::result::Result<NativeValue, String> + Send + Sync>;

/// Whether a callable needs an instance to be invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Receiver {
    /// Invocable without an instance.
    Static,
    /// Requires an instance receiver.
    Instance,
}

/// Visibility of a callable outside its module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Private,
}

/// A callable exported by a [`NativeModule`].
#[derive(Clone)]
pub struct NativeCallable {
    /// Callable name.
    pub name: String,
    /// Ordered parameter types.
    pub params: Vec<NativeTypeDescriptor>,
    /// Return type.
    pub returns: NativeTypeDescriptor,
    /// Static or instance-level.
    pub receiver: Receiver,
    /// Visibility outside the module.
    pub visibility: Visibility,
    /// The implementation.
    pub function: NativeFn,
}

impl NativeCallable {
    /// Returns true if the name and parameter types match exactly.
    #[must_use]
    pub fn matches(&self, name: &str, params: &[NativeTypeDescriptor]) -> bool {
        self.name == name && self.params == params
    }

    /// Formats `name(t1,t2)` for diagnostics.
    #[must_use]
    pub fn signature(&self) -> String {
        format_signature(&self.name, &self.params)
    }
}

impl fmt::Debug for NativeCallable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeCallable")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("returns", &self.returns)
            .field("receiver", &self.receiver)
            .field("visibility", &self.visibility)
            .finish_non_exhaustive()
    }
}

/// Formats `name(t1,t2)`.
#[must_use]
pub fn format_signature(name: &str, params: &[NativeTypeDescriptor]) -> String {
    let params: Vec<&str> = params
        .iter()
        .map(NativeTypeDescriptor::qualified_name)
        .collect();
    format!("{name}({})", params.join(","))
}

/// An explicitly built set of native callables.
///
/// Modules are immutable once built; replace a module in the registry to
/// change what it exports.
#[derive(Debug, Clone)]
pub struct NativeModule {
    name: String,
    callables: Vec<NativeCallable>,
}

impl NativeModule {
    /// Creates an empty module.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        NativeModule {
            name: name.into(),
            callables: Vec::new(),
        }
    }

    /// Returns the qualified module name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a callable.
    #[must_use]
    pub fn with_callable(mut self, callable: NativeCallable) -> Self {
        self.callables.push(callable);
        self
    }

    /// Adds a public static function.
    #[must_use]
    pub fn function<F>(
        self,
        name: &str,
        params: Vec<NativeTypeDescriptor>,
        returns: NativeTypeDescriptor,
        function: F,
    ) -> Self
    where
        F: Fn(&[NativeValue]) -> std::result::Result<NativeValue, String> + Send + Sync + 'static,
    {
        self.with_callable(NativeCallable {
            name: name.to_string(),
            params,
            returns,
            receiver: Receiver::Static,
            visibility: Visibility::Public,
            function: Arc::new(function),
        })
    }

    /// Adds a public instance-level method.
    #[must_use]
    pub fn method<F>(
        self,
        name: &str,
        params: Vec<NativeTypeDescriptor>,
        returns: NativeTypeDescriptor,
        function: F,
    ) -> Self
    where
        F: Fn(&[NativeValue]) -> std::result::Result<NativeValue, String> + Send + Sync + 'static,
    {
        self.with_callable(NativeCallable {
            name: name.to_string(),
            params,
            returns,
            receiver: Receiver::Instance,
            visibility: Visibility::Public,
            function: Arc::new(function),
        })
    }

    /// Returns all callables with the given name and exact parameter types.
    ///
    /// Matches borrow only the module, not the lookup key.
    pub fn find_callables<'m, 'k>(
        &'m self,
        name: &'k str,
        params: &'k [NativeTypeDescriptor],
    ) -> impl Iterator<Item = &'m NativeCallable> + 'k
    where
        'm: 'k,
    {
        self.callables.iter().filter(move |c| c.matches(name, params))
    }

    /// Returns all callables in the module.
    pub fn callables(&self) -> impl Iterator<Item = &NativeCallable> {
        self.callables.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PrimitiveType;

    fn int() -> NativeTypeDescriptor {
        PrimitiveType::Int.into()
    }

    #[test]
    fn test_exact_match_only() {
        let module = NativeModule::new("math.Ops")
            .function("square", vec![int()], int(), |_| Ok(NativeValue::Int(0)))
            .function(
                "square",
                vec![PrimitiveType::Long.into()],
                PrimitiveType::Long.into(),
                |_| Ok(NativeValue::Long(0)),
            );

        assert_eq!(module.find_callables("square", &[int()]).count(), 1);
        assert_eq!(
            module
                .find_callables("square", &[NativeTypeDescriptor::reference("Integer")])
                .count(),
            0
        );
        assert_eq!(module.find_callables("cube", &[int()]).count(), 0);
    }

    #[test]
    fn test_matches_outlive_lookup_key() {
        let module =
            NativeModule::new("m").function("f", vec![int()], int(), |_| Ok(NativeValue::Int(0)));
        let found: Vec<&NativeCallable> = {
            let params = vec![int()];
            module.find_callables("f", &params).collect()
        };
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].signature(), "f(int)");
    }

    #[test]
    fn test_signature_format() {
        let module = NativeModule::new("m").method(
            "f",
            vec![int(), NativeTypeDescriptor::reference("String")],
            int(),
            |_| Ok(NativeValue::Int(0)),
        );
        let callable = module.callables().next().unwrap();
        assert_eq!(callable.signature(), "f(int,String)");
        assert_eq!(callable.receiver, Receiver::Instance);
    }
}
