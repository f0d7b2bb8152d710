//! Error types for routine binding and invocation.

use std::fmt;

use thiserror::Error;

/// Result type alias using [`RbindError`].
pub type Result<T> = std::result::Result<T, RbindError>;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum RbindError {
    /// A routine could not be bound to its native implementation.
    #[error("Bind error: {0}")]
    Bind(#[from] BindingError),

    /// Routine catalog errors (duplicate routine, persistence failure, etc.).
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Invalid binder configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// NULL reached a position that cannot hold it.
    #[error("Null value error: {0}")]
    NullViolation(String),

    /// The native callable reported a failure.
    #[error("Native call to {callable} failed: {message}")]
    NativeCall { callable: String, message: String },

    /// General expression evaluation errors.
    #[error("Evaluation error: {0}")]
    Evaluation(String),
}

/// Position inside a routine signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Site {
    /// Zero-based parameter position.
    Argument(usize),
    /// The return value.
    Return,
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Site::Argument(i) => write!(f, "parameter {i}"),
            Site::Return => f.write_str("return value"),
        }
    }
}

/// Direction of a value conversion across the call boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversionDirection {
    /// SQL argument to native parameter.
    SqlToNative,
    /// Native result to SQL value.
    NativeToSql,
}

impl fmt::Display for ConversionDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionDirection::SqlToNative => f.write_str("SQL to native"),
            ConversionDirection::NativeToSql => f.write_str("native to SQL"),
        }
    }
}

/// Errors raised while binding a routine to a native callable.
///
/// All of them are compile-time and non-retryable: they describe a
/// misconfigured routine definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    /// The external reference does not follow the reference grammar.
    #[error("Routine {routine}: invalid external reference '{reference}': {reason}")]
    MalformedReference {
        routine: String,
        reference: String,
        reason: String,
    },

    /// Explicit native parameter count differs from the SQL parameter count.
    #[error("Routine {routine}: declares {declared} parameters but native signature lists {actual}")]
    ArityMismatch {
        routine: String,
        declared: usize,
        actual: usize,
    },

    /// No native type is known for a declared SQL parameter type.
    #[error("Routine {routine}: no native type for {sql_type} at {site}")]
    UnsupportedParamType {
        routine: String,
        site: Site,
        sql_type: String,
    },

    /// An explicitly named native type could not be loaded.
    #[error("Routine {routine}: cannot load native type '{type_name}'")]
    NativeTypeLoadFailure { routine: String, type_name: String },

    /// The named module could not be loaded.
    #[error("Routine {routine}: cannot load module '{module}'")]
    ModuleLoadFailure { routine: String, module: String },

    /// No unique callable matches the requested name and signature.
    #[error("Routine {routine}: native callable {signature} not found{}", ambiguity_suffix(.ambiguous))]
    CallableNotFound {
        routine: String,
        signature: String,
        ambiguous: bool,
    },

    /// The callable needs a receiver or is not externally visible.
    #[error("Routine {routine}: native callable {signature} is not {requirement}")]
    CallableNotInvocable {
        routine: String,
        signature: String,
        requirement: &'static str,
    },

    /// Declared return type and native return type are in different families.
    #[error("Routine {routine}: declared return type {declared} is incompatible with {actual} returned by {signature}")]
    ReturnTypeMismatch {
        routine: String,
        declared: String,
        signature: String,
        actual: String,
    },

    /// A declared parameter type and its native type are in different families.
    #[error("Routine {routine}: parameter {position} ({parameter}) declared as {declared} is incompatible with {actual} in {signature}")]
    ParamTypeMismatch {
        routine: String,
        position: usize,
        parameter: String,
        declared: String,
        signature: String,
        actual: String,
    },

    /// A conversion required at the call boundary cannot be expressed.
    #[error("Routine {routine}: unsupported {direction} conversion for {data_type} at {site}")]
    UnsupportedConversion {
        routine: String,
        direction: ConversionDirection,
        site: Site,
        data_type: String,
    },
}

impl BindingError {
    /// Returns the name of the routine the error refers to.
    #[must_use]
    pub fn routine(&self) -> &str {
        match self {
            BindingError::MalformedReference { routine, .. }
            | BindingError::ArityMismatch { routine, .. }
            | BindingError::UnsupportedParamType { routine, .. }
            | BindingError::NativeTypeLoadFailure { routine, .. }
            | BindingError::ModuleLoadFailure { routine, .. }
            | BindingError::CallableNotFound { routine, .. }
            | BindingError::CallableNotInvocable { routine, .. }
            | BindingError::ReturnTypeMismatch { routine, .. }
            | BindingError::ParamTypeMismatch { routine, .. }
            | BindingError::UnsupportedConversion { routine, .. } => routine,
        }
    }

    /// Returns the signature position the error refers to, if any.
    #[must_use]
    pub fn site(&self) -> Option<Site> {
        match self {
            BindingError::UnsupportedParamType { site, .. }
            | BindingError::UnsupportedConversion { site, .. } => Some(*site),
            BindingError::ReturnTypeMismatch { .. } => Some(Site::Return),
            BindingError::ParamTypeMismatch { position, .. } => Some(Site::Argument(*position)),
            _ => None,
        }
    }

    /// Renders the error with object names formatted by `namer`.
    ///
    /// The error itself stays unformatted; this is only for diagnostics.
    #[must_use]
    pub fn render(&self, namer: &dyn ObjectNamer) -> String {
        let routine = self.routine();
        let message = self.to_string();
        let rest = message
            .strip_prefix(&format!("Routine {routine}"))
            .unwrap_or(&message);
        format!("Routine {}{rest}", namer.routine_name(routine))
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn ambiguity_suffix(ambiguous: &bool) -> &'static str {
    if *ambiguous {
        " (ambiguous)"
    } else {
        ""
    }
}

/// Formats catalog object names for user-facing diagnostics.
pub trait ObjectNamer {
    /// Formats a routine name.
    fn routine_name(&self, name: &str) -> String;
}

/// Quotes names as SQL delimited identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuotedNamer;

impl ObjectNamer for QuotedNamer {
    fn routine_name(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_error_display() {
        let err = BindingError::ParamTypeMismatch {
            routine: "SQUARE".into(),
            position: 0,
            parameter: "X".into(),
            declared: "INTEGER".into(),
            signature: "math.Ops.bad(varchar)".into(),
            actual: "varchar".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("parameter 0"));
        assert!(msg.contains("INTEGER"));
        assert!(msg.contains("varchar"));
        assert_eq!(err.site(), Some(Site::Argument(0)));
    }

    #[test]
    fn test_ambiguous_callable_display() {
        let err = BindingError::CallableNotFound {
            routine: "F".into(),
            signature: "m.C.f(int)".into(),
            ambiguous: true,
        };
        assert!(err.to_string().ends_with("not found (ambiguous)"));
    }

    #[test]
    fn test_render_with_namer() {
        let err = BindingError::ModuleLoadFailure {
            routine: "my\"fn".into(),
            module: "nope".into(),
        };
        let rendered = err.render(&QuotedNamer);
        assert!(rendered.starts_with("Routine \"my\"\"fn\": cannot load module"));
    }

    #[test]
    fn test_into_top_level_error() {
        let err: RbindError = BindingError::ArityMismatch {
            routine: "F".into(),
            declared: 1,
            actual: 2,
        }
        .into();
        assert!(err.to_string().starts_with("Bind error:"));
    }
}
