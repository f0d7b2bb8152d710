//! Native parameter type resolution.

use tracing::trace;

use crate::catalog::RoutineDeclaration;
use crate::error::{BindingError, Site};
use crate::parser::CalleeLocator;
use crate::registry::NativeTypeLoader;
use crate::types::{NativeTypeDescriptor, TypeMapping};

/// Resolves the native parameter types a callable must have.
///
/// Explicit type names from the locator are loaded by name; otherwise one
/// type is inferred per declared SQL parameter. The result always has one
/// descriptor per declared parameter.
pub(crate) fn resolve_param_types(
    routine: &RoutineDeclaration,
    locator: &CalleeLocator,
    types: &dyn NativeTypeLoader,
    mapping: &dyn TypeMapping,
) -> Result<Vec<NativeTypeDescriptor>, BindingError> {
    match &locator.explicit_param_type_names {
        Some(names) => resolve_explicit(routine, names, types),
        None => resolve_implicit(routine, mapping),
    }
}

fn resolve_explicit(
    routine: &RoutineDeclaration,
    names: &[String],
    types: &dyn NativeTypeLoader,
) -> Result<Vec<NativeTypeDescriptor>, BindingError> {
    // Arity is checked before any name is loaded
    if names.len() != routine.arity() {
        return Err(BindingError::ArityMismatch {
            routine: routine.name.clone(),
            declared: routine.arity(),
            actual: names.len(),
        });
    }

    names
        .iter()
        .map(|name| {
            let descriptor =
                types
                    .load_type(name)
                    .ok_or_else(|| BindingError::NativeTypeLoadFailure {
                        routine: routine.name.clone(),
                        type_name: name.clone(),
                    })?;
            trace!(type_name = %name, descriptor = %descriptor, "loaded explicit parameter type");
            Ok(descriptor)
        })
        .collect()
}

fn resolve_implicit(
    routine: &RoutineDeclaration,
    mapping: &dyn TypeMapping,
) -> Result<Vec<NativeTypeDescriptor>, BindingError> {
    routine
        .params
        .iter()
        .enumerate()
        .map(|(i, param)| {
            let descriptor = mapping.native_for_param(&param.data_type).ok_or_else(|| {
                BindingError::UnsupportedParamType {
                    routine: routine.name.clone(),
                    site: Site::Argument(i),
                    sql_type: param.data_type.to_string(),
                }
            })?;
            trace!(position = i, sql_type = %param.data_type, descriptor = %descriptor, "inferred parameter type");
            Ok(descriptor)
        })
        .collect()
}
