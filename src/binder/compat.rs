//! Family-level compatibility between declared SQL types and native types.

use tracing::trace;

use crate::catalog::RoutineDeclaration;
use crate::error::BindingError;
use crate::types::{NativeTypeDescriptor, SqlDataType, TypeMapping};

use super::locator::ResolvedCallable;

/// Returns true if both types belong to the same known family.
pub(crate) fn is_compatible(
    mapping: &dyn TypeMapping,
    sql_type: &SqlDataType,
    native: &NativeTypeDescriptor,
) -> bool {
    let sql_family = mapping.sql_family(sql_type);
    let native_family = mapping.native_family(native);
    trace!(%sql_type, %native, %sql_family, %native_family, "comparing type families");
    sql_family.is_compatible_with(&native_family)
}

/// Checks the return type, then every parameter in order.
///
/// Exact type identity is not required: an INTEGER parameter may bind to a
/// `long`.
pub(crate) fn check_compatibility(
    mapping: &dyn TypeMapping,
    routine: &RoutineDeclaration,
    callable: &ResolvedCallable,
) -> Result<(), BindingError> {
    if !is_compatible(mapping, &routine.return_type, &callable.return_descriptor) {
        return Err(BindingError::ReturnTypeMismatch {
            routine: routine.name.clone(),
            declared: routine.return_type.to_string(),
            signature: callable.signature(),
            actual: callable.return_descriptor.to_string(),
        });
    }

    for (i, (param, native)) in routine
        .params
        .iter()
        .zip(&callable.param_descriptors)
        .enumerate()
    {
        if !is_compatible(mapping, &param.data_type, native) {
            return Err(BindingError::ParamTypeMismatch {
                routine: routine.name.clone(),
                position: i,
                parameter: param.name.clone(),
                declared: param.data_type.to_string(),
                signature: callable.signature(),
                actual: native.to_string(),
            });
        }
    }

    Ok(())
}
