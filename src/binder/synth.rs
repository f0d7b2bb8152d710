//! Invocation synthesis: argument and return conversions around a native call.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::{BindingError, ConversionDirection, Site};
use crate::expr::{Expr, ExprConverter, InvocationExpression, NativeCall};
use crate::types::{NativeTypeDescriptor, PrimitiveType, SqlDataType, TypeMapping};

use super::compat::is_compatible;
use super::locator::ResolvedCallable;

/// Collaborators used while synthesizing.
pub(crate) struct Synthesizer<'a> {
    pub(crate) routine: &'a str,
    pub(crate) mapping: &'a dyn TypeMapping,
    pub(crate) converter: &'a dyn ExprConverter,
}

impl Synthesizer<'_> {
    /// Builds the invocation of `callable` over `args`.
    ///
    /// `declared_params` and `args` must both have one entry per native
    /// parameter.
    pub(crate) fn synthesize(
        &self,
        callable: Arc<ResolvedCallable>,
        declared_return: SqlDataType,
        declared_params: &[SqlDataType],
        args: Vec<Expr>,
    ) -> Result<InvocationExpression, BindingError> {
        let arity = callable.arity();
        if declared_params.len() != arity || args.len() != arity {
            return Err(BindingError::ArityMismatch {
                routine: self.routine.to_string(),
                declared: declared_params.len(),
                actual: if declared_params.len() == arity {
                    args.len()
                } else {
                    arity
                },
            });
        }

        let arguments = args
            .into_iter()
            .zip(declared_params)
            .zip(&callable.param_descriptors)
            .enumerate()
            .map(|(i, ((arg, param), native))| self.convert_argument(i, arg, *param, native))
            .collect::<Result<Vec<_>, _>>()?;

        let actual_return = self.actual_return_type(declared_return, &callable.return_descriptor)?;
        let call = Expr::FromNative {
            call: Box::new(NativeCall {
                callable: Arc::clone(&callable),
                arguments,
            }),
            data_type: actual_return,
        };

        let root = self
            .converter
            .convert_cast_or_assignment(declared_return, actual_return, call)
            .ok_or_else(|| {
                self.unsupported(ConversionDirection::NativeToSql, Site::Return, actual_return)
            })?;

        debug!(
            routine = self.routine,
            callable = %callable.signature(),
            %declared_return,
            %actual_return,
            "synthesized native invocation"
        );
        Ok(InvocationExpression::new(callable, root, declared_return))
    }

    /// Converts one SQL argument to its native parameter type.
    fn convert_argument(
        &self,
        position: usize,
        arg: Expr,
        param: SqlDataType,
        native: &NativeTypeDescriptor,
    ) -> Result<Expr, BindingError> {
        let site = Site::Argument(position);
        let unsupported = || self.unsupported(ConversionDirection::SqlToNative, site, param);

        if native.is_void() || !is_compatible(self.mapping, &param, native) {
            return Err(unsupported());
        }
        let carrier = self.mapping.sql_for_native(native).ok_or_else(unsupported)?;

        match native {
            NativeTypeDescriptor::Value(primitive) => {
                // Null must be rejected before the call; primitives cannot hold it
                let coerced = self
                    .converter
                    .convert_cast_or_assignment(param.with_nullability(false), param, arg)
                    .ok_or_else(unsupported)?;
                trace!(position, %param, %primitive, "value-type argument with null guard");
                Ok(Expr::ToNative {
                    operand: Box::new(coerced),
                    target: *primitive,
                    carrier,
                })
            }
            NativeTypeDescriptor::Reference(name) => {
                trace!(position, %param, native = %name, "reference-type argument");
                Ok(Expr::NullableData {
                    operand: Box::new(arg),
                    target: native.clone(),
                    carrier,
                })
            }
        }
    }

    /// Returns the SQL type of the raw native result.
    fn actual_return_type(
        &self,
        declared_return: SqlDataType,
        native: &NativeTypeDescriptor,
    ) -> Result<SqlDataType, BindingError> {
        let unsupported =
            || self.unsupported(ConversionDirection::NativeToSql, Site::Return, declared_return);

        match native {
            NativeTypeDescriptor::Value(PrimitiveType::Void) => Err(unsupported()),
            NativeTypeDescriptor::Value(_) => Ok(declared_return.with_nullability(false)),
            NativeTypeDescriptor::Reference(_) => self
                .mapping
                .sql_for_native(native)
                .map(SqlDataType::new)
                .ok_or_else(unsupported),
        }
    }

    fn unsupported(
        &self,
        direction: ConversionDirection,
        site: Site,
        data_type: SqlDataType,
    ) -> BindingError {
        BindingError::UnsupportedConversion {
            routine: self.routine.to_string(),
            direction,
            site,
            data_type: data_type.to_string(),
        }
    }
}
