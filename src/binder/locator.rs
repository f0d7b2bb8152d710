//! Callable lookup and invocability checks.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{BindingError, RbindError, Result};
use crate::parser::CalleeLocator;
use crate::registry::{format_signature, ModuleLoader, NativeFn, Receiver, Visibility};
use crate::types::{NativeTypeDescriptor, NativeValue};

/// The unique native callable bound to a routine.
#[derive(Clone)]
pub struct ResolvedCallable {
    /// Module declaring the callable.
    pub declaring_module: String,
    /// Callable name.
    pub name: String,
    /// Ordered parameter types; one per declared SQL parameter.
    pub param_descriptors: Vec<NativeTypeDescriptor>,
    /// Return type.
    pub return_descriptor: NativeTypeDescriptor,
    /// True if no receiver is needed.
    pub is_globally_invocable: bool,
    /// True if visible outside its module.
    pub is_externally_visible: bool,
    function: NativeFn,
}

impl ResolvedCallable {
    /// Returns `module.name`.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.declaring_module, self.name)
    }

    /// Returns `module.name(t1,t2)`.
    #[must_use]
    pub fn signature(&self) -> String {
        format!(
            "{}.{}",
            self.declaring_module,
            format_signature(&self.name, &self.param_descriptors)
        )
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.param_descriptors.len()
    }

    /// Calls the native implementation.
    ///
    /// # Errors
    ///
    /// Returns an error if the argument count is wrong or the callable fails.
    pub fn invoke(&self, args: &[NativeValue]) -> Result<NativeValue> {
        if args.len() != self.arity() {
            return Err(RbindError::NativeCall {
                callable: self.signature(),
                message: format!("expected {} arguments, got {}", self.arity(), args.len()),
            });
        }
        (self.function)(args).map_err(|message| RbindError::NativeCall {
            callable: self.signature(),
            message,
        })
    }
}

impl PartialEq for ResolvedCallable {
    fn eq(&self, other: &Self) -> bool {
        self.declaring_module == other.declaring_module
            && self.name == other.name
            && self.param_descriptors == other.param_descriptors
            && self.return_descriptor == other.return_descriptor
            && self.is_globally_invocable == other.is_globally_invocable
            && self.is_externally_visible == other.is_externally_visible
            && Arc::ptr_eq(&self.function, &other.function)
    }
}

impl fmt::Debug for ResolvedCallable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedCallable")
            .field("declaring_module", &self.declaring_module)
            .field("name", &self.name)
            .field("param_descriptors", &self.param_descriptors)
            .field("return_descriptor", &self.return_descriptor)
            .field("is_globally_invocable", &self.is_globally_invocable)
            .field("is_externally_visible", &self.is_externally_visible)
            .finish_non_exhaustive()
    }
}

/// Finds the unique callable matching the locator and parameter types.
pub(crate) fn locate_callable(
    routine: &str,
    locator: &CalleeLocator,
    params: Vec<NativeTypeDescriptor>,
    modules: &dyn ModuleLoader,
) -> std::result::Result<ResolvedCallable, BindingError> {
    let module =
        modules
            .load_module(&locator.module_name)
            .ok_or_else(|| BindingError::ModuleLoadFailure {
                routine: routine.to_string(),
                module: locator.module_name.clone(),
            })?;

    let signature = || {
        format!(
            "{}.{}",
            locator.module_name,
            format_signature(&locator.callable_name, &params)
        )
    };

    let matches: Vec<_> = module
        .find_callables(&locator.callable_name, &params)
        .take(2)
        .collect();
    let callable = match matches.as_slice() {
        [callable] => *callable,
        _ => {
            return Err(BindingError::CallableNotFound {
                routine: routine.to_string(),
                signature: signature(),
                ambiguous: !matches.is_empty(),
            })
        }
    };

    if callable.receiver != Receiver::Static {
        return Err(BindingError::CallableNotInvocable {
            routine: routine.to_string(),
            signature: signature(),
            requirement: "invocable without an instance",
        });
    }
    if callable.visibility != Visibility::Public {
        return Err(BindingError::CallableNotInvocable {
            routine: routine.to_string(),
            signature: signature(),
            requirement: "externally visible",
        });
    }

    debug!(
        routine,
        module = %locator.module_name,
        callable = %locator.callable_name,
        arity = params.len(),
        "located native callable"
    );

    Ok(ResolvedCallable {
        declaring_module: module.name().to_string(),
        name: callable.name.clone(),
        return_descriptor: callable.returns.clone(),
        is_globally_invocable: true,
        is_externally_visible: true,
        function: Arc::clone(&callable.function),
        param_descriptors: params,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ModuleRegistry, NativeCallable, NativeModule};
    use crate::types::PrimitiveType;

    fn int() -> NativeTypeDescriptor {
        PrimitiveType::Int.into()
    }

    fn registry() -> ModuleRegistry {
        let registry = ModuleRegistry::new();
        registry.install(
            NativeModule::new("math.Ops")
                .function("square", vec![int()], int(), |args| match args {
                    [NativeValue::Int(x)] => Ok(NativeValue::Int(x * x)),
                    _ => Err("bad args".into()),
                })
                .method("scale", vec![int()], int(), |_| Ok(NativeValue::Int(0)))
                .with_callable(NativeCallable {
                    name: "hidden".into(),
                    params: vec![int()],
                    returns: int(),
                    receiver: Receiver::Static,
                    visibility: Visibility::Private,
                    function: Arc::new(|_| Ok(NativeValue::Int(0))),
                })
                .function("twice", vec![int()], int(), |_| Ok(NativeValue::Int(1)))
                .function("twice", vec![int()], int(), |_| Ok(NativeValue::Int(2))),
        );
        registry
    }

    #[test]
    fn test_locate_static_public() {
        let callable = locate_callable(
            "SQUARE",
            &CalleeLocator::new("math.Ops", "square"),
            vec![int()],
            &registry(),
        )
        .unwrap();
        assert_eq!(callable.signature(), "math.Ops.square(int)");
        assert!(callable.is_globally_invocable);
        assert!(callable.is_externally_visible);
        assert_eq!(callable.invoke(&[NativeValue::Int(5)]).unwrap(), NativeValue::Int(25));
    }

    #[test]
    fn test_missing_module() {
        let err = locate_callable(
            "F",
            &CalleeLocator::new("math.Nope", "square"),
            vec![int()],
            &registry(),
        )
        .unwrap_err();
        assert!(matches!(err, BindingError::ModuleLoadFailure { module, .. } if module == "math.Nope"));
    }

    #[test]
    fn test_signature_mismatch_not_found() {
        let err = locate_callable(
            "F",
            &CalleeLocator::new("math.Ops", "square"),
            vec![PrimitiveType::Long.into()],
            &registry(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            BindingError::CallableNotFound {
                routine: "F".into(),
                signature: "math.Ops.square(long)".into(),
                ambiguous: false,
            }
        );
    }

    #[test]
    fn test_ambiguous_is_not_found() {
        let err = locate_callable(
            "F",
            &CalleeLocator::new("math.Ops", "twice"),
            vec![int()],
            &registry(),
        )
        .unwrap_err();
        assert!(matches!(err, BindingError::CallableNotFound { ambiguous: true, .. }));
    }

    #[test]
    fn test_instance_method_rejected() {
        let err = locate_callable(
            "F",
            &CalleeLocator::new("math.Ops", "scale"),
            vec![int()],
            &registry(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            BindingError::CallableNotInvocable { requirement: "invocable without an instance", .. }
        ));
    }

    #[test]
    fn test_private_rejected() {
        let err = locate_callable(
            "F",
            &CalleeLocator::new("math.Ops", "hidden"),
            vec![int()],
            &registry(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            BindingError::CallableNotInvocable { requirement: "externally visible", .. }
        ));
    }

    #[test]
    fn test_invoke_checks_arity() {
        let callable = locate_callable(
            "SQUARE",
            &CalleeLocator::new("math.Ops", "square"),
            vec![int()],
            &registry(),
        )
        .unwrap();
        assert!(matches!(
            callable.invoke(&[]),
            Err(RbindError::NativeCall { .. })
        ));
    }
}
