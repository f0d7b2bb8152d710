//! Binder for external routines.
//!
//! Binding runs a fixed pipeline over a [`RoutineDeclaration`]:
//! - Parse the external reference into a [`CalleeLocator`]
//! - Resolve native parameter types, explicitly or from the SQL signature
//! - Locate the unique static, public callable in the named module
//! - Check return and parameter types for family compatibility
//! - Synthesize the invocation expression with its conversions
//!
//! Every stage is a pure function of its inputs and the injected
//! collaborators. Results are recomputed on each request.

mod compat;
mod locator;
mod resolver;
mod synth;

use std::sync::Arc;

use tracing::{debug, instrument};

pub use locator::ResolvedCallable;

use crate::catalog::RoutineDeclaration;
use crate::config::BinderConfig;
use crate::error::{BindingError, Result};
use crate::expr::{AssignmentConverter, Expr, ExprConverter, InvocationExpression};
use crate::parser::{parse_external_reference, CalleeLocator};
use crate::registry::{ModuleLoader, NativeTypeLoader};
use crate::types::{SqlDataType, TypeMapping};

use synth::Synthesizer;

/// Binds routine declarations to native callables.
///
/// Holds only shared, immutable collaborators and can be used from many
/// threads at once.
#[derive(Clone)]
pub struct RoutineBinder {
    config: Arc<BinderConfig>,
    modules: Arc<dyn ModuleLoader>,
    types: Arc<dyn NativeTypeLoader>,
    mapping: Arc<dyn TypeMapping>,
    converter: Arc<dyn ExprConverter>,
}

impl RoutineBinder {
    /// Creates a binder using the configuration's type rules and SQL
    /// assignment conversions.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(
        config: BinderConfig,
        modules: Arc<dyn ModuleLoader>,
        types: Arc<dyn NativeTypeLoader>,
    ) -> Result<Self> {
        config.validate()?;
        let mapping: Arc<dyn TypeMapping> = Arc::new(config.type_rules.clone());
        Ok(Self {
            config: Arc::new(config),
            modules,
            types,
            converter: Arc::new(AssignmentConverter::new(Arc::clone(&mapping))),
            mapping,
        })
    }

    /// Replaces the SQL/native type mapping.
    ///
    /// Also resets the converter to an [`AssignmentConverter`] over the new
    /// mapping; set a custom converter afterwards.
    #[must_use]
    pub fn with_type_mapping(mut self, mapping: Arc<dyn TypeMapping>) -> Self {
        self.converter = Arc::new(AssignmentConverter::new(Arc::clone(&mapping)));
        self.mapping = mapping;
        self
    }

    /// Replaces the cast/assignment converter.
    #[must_use]
    pub fn with_converter(mut self, converter: Arc<dyn ExprConverter>) -> Self {
        self.converter = converter;
        self
    }

    /// Returns the binder configuration.
    #[must_use]
    pub fn config(&self) -> &BinderConfig {
        &self.config
    }

    /// Decodes the external reference of a routine.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::MalformedReference`] if the reference does not
    /// parse.
    pub fn parse_reference(
        &self,
        routine: &RoutineDeclaration,
    ) -> std::result::Result<CalleeLocator, BindingError> {
        parse_external_reference(&routine.external_reference, &self.config.library_prefix)
            .map_err(|e| BindingError::MalformedReference {
                routine: routine.name.clone(),
                reference: routine.external_reference.clone(),
                reason: e.to_string(),
            })
    }

    /// Resolves the native callable implementing a routine.
    ///
    /// The callable is type-checked against the declared SQL signature
    /// before it is returned.
    ///
    /// # Errors
    ///
    /// Returns the first [`BindingError`] raised by any stage.
    #[instrument(level = "debug", skip_all, fields(routine = %routine.name))]
    pub fn resolve_callable(
        &self,
        routine: &RoutineDeclaration,
    ) -> std::result::Result<ResolvedCallable, BindingError> {
        let locator = self.parse_reference(routine)?;
        let params =
            resolver::resolve_param_types(routine, &locator, &*self.types, &*self.mapping)?;
        let callable =
            locator::locate_callable(&routine.name, &locator, params, &*self.modules)?;
        compat::check_compatibility(&*self.mapping, routine, &callable)?;

        debug!(callable = %callable.signature(), "resolved routine");
        Ok(callable)
    }

    /// Builds the invocation of a resolved callable.
    ///
    /// `declared_params` and `args` must have one entry per native
    /// parameter; the result evaluates to `declared_return`.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::ArityMismatch`] on a count mismatch and
    /// [`BindingError::UnsupportedConversion`] if an argument or the result
    /// cannot be converted.
    #[instrument(level = "debug", skip_all, fields(callable = %callable.qualified_name()))]
    pub fn synthesize_invocation(
        &self,
        callable: Arc<ResolvedCallable>,
        declared_return: SqlDataType,
        declared_params: &[SqlDataType],
        args: Vec<Expr>,
    ) -> std::result::Result<InvocationExpression, BindingError> {
        let routine = callable.qualified_name();
        self.synthesizer(&routine)
            .synthesize(callable, declared_return, declared_params, args)
    }

    /// Resolves a routine and synthesizes its invocation over `args`.
    ///
    /// # Errors
    ///
    /// Returns the first [`BindingError`] raised by resolution or
    /// synthesis.
    #[instrument(level = "debug", skip_all, fields(routine = %routine.name))]
    pub fn bind(
        &self,
        routine: &RoutineDeclaration,
        args: Vec<Expr>,
    ) -> std::result::Result<InvocationExpression, BindingError> {
        let callable = Arc::new(self.resolve_callable(routine)?);
        self.synthesizer(&routine.name).synthesize(
            callable,
            routine.return_type,
            &routine.param_types(),
            args,
        )
    }

    fn synthesizer<'a>(&'a self, routine: &'a str) -> Synthesizer<'a> {
        Synthesizer {
            routine,
            mapping: &*self.mapping,
            converter: &*self.converter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RoutineParameter;
    use crate::error::{ConversionDirection, Site};
    use crate::registry::{ModuleRegistry, NativeModule, NativeTypeRegistry};
    use crate::types::{NativeTypeDescriptor, NativeValue, PrimitiveType, SqlTypeName};

    fn int() -> NativeTypeDescriptor {
        PrimitiveType::Int.into()
    }

    fn binder() -> RoutineBinder {
        let modules = ModuleRegistry::new();
        modules.install(
            NativeModule::new("text.Fns")
                .function(
                    "shout",
                    vec![NativeTypeDescriptor::reference("String")],
                    NativeTypeDescriptor::reference("String"),
                    |args| match args {
                        [NativeValue::String(s)] => Ok(NativeValue::String(s.to_uppercase())),
                        [NativeValue::Null] => Ok(NativeValue::Null),
                        _ => Err("bad args".into()),
                    },
                )
                .function("len", vec![NativeTypeDescriptor::reference("String")], int(), |args| {
                    match args {
                        [NativeValue::String(s)] => Ok(NativeValue::Int(s.len() as i32)),
                        _ => Err("bad args".into()),
                    }
                })
                .function("reset", vec![int()], PrimitiveType::Void.into(), |_| {
                    Ok(NativeValue::Void)
                }),
        );
        RoutineBinder::new(
            BinderConfig::default(),
            Arc::new(modules),
            Arc::new(NativeTypeRegistry::new()),
        )
        .unwrap()
    }

    fn routine(reference: &str, ret: SqlTypeName, params: &[SqlTypeName]) -> RoutineDeclaration {
        RoutineDeclaration::new(
            "R",
            reference,
            SqlDataType::new(ret),
            params
                .iter()
                .enumerate()
                .map(|(i, t)| RoutineParameter::new(format!("P{i}"), *t))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = RoutineBinder::new(
            BinderConfig::new().with_library_prefix(""),
            Arc::new(ModuleRegistry::new()),
            Arc::new(NativeTypeRegistry::new()),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_reference_argument_has_no_guard() {
        let r = routine("LIB:text.Fns.shout", SqlTypeName::Varchar, &[SqlTypeName::Varchar]);
        let invocation = binder()
            .bind(&r, vec![Expr::input(0, SqlTypeName::Varchar)])
            .unwrap();
        assert!(matches!(
            invocation.arguments(),
            [Expr::NullableData { operand, .. }] if matches!(**operand, Expr::Input { .. })
        ));
        assert_eq!(invocation.data_type(), SqlDataType::new(SqlTypeName::Varchar));
    }

    #[test]
    fn test_value_return_is_not_null() {
        let r = routine("LIB:text.Fns.len", SqlTypeName::Integer, &[SqlTypeName::Varchar]);
        let invocation = binder()
            .bind(&r, vec![Expr::input(0, SqlTypeName::Varchar)])
            .unwrap();
        assert!(matches!(
            invocation.return_conversion(),
            Some(Expr::FromNative { data_type, .. }) if !data_type.nullable
        ));
    }

    #[test]
    fn test_void_return_unsupported() {
        let r = routine("LIB:text.Fns.reset", SqlTypeName::Integer, &[SqlTypeName::Integer]);
        let b = binder();
        // Void is in no family, so resolution already rejects it
        assert!(matches!(
            b.resolve_callable(&r),
            Err(BindingError::ReturnTypeMismatch { .. })
        ));

        let callable = Arc::new(
            locator::locate_callable(
                "R",
                &CalleeLocator::new("text.Fns", "reset"),
                vec![int()],
                &*b.modules,
            )
            .unwrap(),
        );
        let err = b
            .synthesize_invocation(
                callable,
                SqlDataType::new(SqlTypeName::Integer),
                &[SqlDataType::new(SqlTypeName::Integer)],
                vec![Expr::input(0, SqlTypeName::Integer)],
            )
            .unwrap_err();
        assert!(matches!(
            err,
            BindingError::UnsupportedConversion {
                direction: ConversionDirection::NativeToSql,
                site: Site::Return,
                ..
            }
        ));
        assert_eq!(err.routine(), "text.Fns.reset");
    }

    #[test]
    fn test_synthesize_arity_mismatch() {
        let b = binder();
        let r = routine("LIB:text.Fns.len", SqlTypeName::Integer, &[SqlTypeName::Varchar]);
        let callable = Arc::new(b.resolve_callable(&r).unwrap());
        let err = b
            .synthesize_invocation(
                callable,
                r.return_type,
                &r.param_types(),
                vec![],
            )
            .unwrap_err();
        assert!(matches!(
            err,
            BindingError::ArityMismatch { declared: 1, actual: 0, .. }
        ));
    }

    #[test]
    fn test_synthesize_cross_family_argument() {
        let b = binder();
        let r = routine("LIB:text.Fns.len", SqlTypeName::Integer, &[SqlTypeName::Varchar]);
        let callable = Arc::new(b.resolve_callable(&r).unwrap());
        let err = b
            .synthesize_invocation(
                callable,
                r.return_type,
                &[SqlDataType::new(SqlTypeName::Date)],
                vec![Expr::input(0, SqlTypeName::Date)],
            )
            .unwrap_err();
        assert_eq!(err.site(), Some(Site::Argument(0)));
    }

    /// Records the names of spans opened while it is the default subscriber.
    #[derive(Default)]
    struct SpanNames {
        names: parking_lot::Mutex<Vec<&'static str>>,
    }

    impl tracing::Subscriber for SpanNames {
        fn enabled(&self, _: &tracing::Metadata<'_>) -> bool {
            true
        }

        fn new_span(&self, span: &tracing::span::Attributes<'_>) -> tracing::span::Id {
            let mut names = self.names.lock();
            names.push(span.metadata().name());
            tracing::span::Id::from_u64(names.len() as u64)
        }

        fn record(&self, _: &tracing::span::Id, _: &tracing::span::Record<'_>) {}

        fn record_follows_from(&self, _: &tracing::span::Id, _: &tracing::span::Id) {}

        fn event(&self, _: &tracing::Event<'_>) {}

        fn enter(&self, _: &tracing::span::Id) {}

        fn exit(&self, _: &tracing::span::Id) {}
    }

    #[test]
    fn test_entry_points_open_spans() {
        let subscriber = Arc::new(SpanNames::default());
        let b = binder();
        let r = routine("LIB:text.Fns.len", SqlTypeName::Integer, &[SqlTypeName::Varchar]);

        tracing::subscriber::with_default(Arc::clone(&subscriber), || {
            let callable = Arc::new(b.resolve_callable(&r).unwrap());
            b.synthesize_invocation(
                callable,
                r.return_type,
                &r.param_types(),
                vec![Expr::input(0, SqlTypeName::Varchar)],
            )
            .unwrap();
            b.bind(&r, vec![Expr::input(0, SqlTypeName::Varchar)])
                .unwrap();
        });

        let names = subscriber.names.lock();
        for entry_point in ["resolve_callable", "synthesize_invocation", "bind"] {
            assert!(names.contains(&entry_point), "no span for {entry_point}: {names:?}");
        }
    }
}
