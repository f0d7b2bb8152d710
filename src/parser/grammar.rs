//! Pest parser integration for external references.

use pest::Parser;
use pest_derive::Parser;
use thiserror::Error;

use super::locator::CalleeLocator;

#[derive(Parser)]
#[grammar = "parser/reference.pest"]
struct ReferenceParser;

/// Reasons an external reference cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    /// The reference does not start with the library prefix.
    #[error("expected prefix '{0}'")]
    MissingPrefix(String),

    /// Nothing follows the prefix.
    #[error("nothing follows the library prefix")]
    Empty,

    /// The path has no `.` separating module from callable.
    #[error("cannot separate module name from callable name in '{0}'")]
    MissingCallableName(String),

    /// A module or callable segment is empty.
    #[error("empty module or callable name in '{0}'")]
    EmptySegment(String),

    /// A parameter type name is blank.
    #[error("empty parameter type name at position {0}")]
    EmptyTypeName(usize),

    /// Syntax error reported by the grammar.
    #[error("syntax error at column {col}: {message}")]
    Syntax { col: usize, message: String },
}

/// Parses an external reference into a [`CalleeLocator`].
///
/// The reference must start with `prefix`, followed by
/// `<module>.<callable>` and an optional parenthesized, comma-separated list
/// of native type names. Type names are trimmed.
///
/// # Errors
///
/// Returns a [`ReferenceError`] describing why the reference is malformed.
pub fn parse_external_reference(
    reference: &str,
    prefix: &str,
) -> std::result::Result<CalleeLocator, ReferenceError> {
    let body = reference
        .strip_prefix(prefix)
        .ok_or_else(|| ReferenceError::MissingPrefix(prefix.to_string()))?;
    if body.is_empty() {
        return Err(ReferenceError::Empty);
    }

    let pairs = ReferenceParser::parse(Rule::reference, body).map_err(|e| {
        let col = match e.line_col {
            pest::error::LineColLocation::Pos((_, c))
            | pest::error::LineColLocation::Span((_, c), _) => c,
        };
        ReferenceError::Syntax {
            col: col + prefix.len(),
            message: e.variant.message().to_string(),
        }
    })?;

    let mut path = "";
    let mut param_types = None;
    for pair in pairs.flatten() {
        match pair.as_rule() {
            Rule::callable_path => path = pair.as_str(),
            Rule::param_list => {
                let names = pair
                    .into_inner()
                    .enumerate()
                    .map(|(i, name)| {
                        let name = name.as_str().trim();
                        if name.is_empty() {
                            Err(ReferenceError::EmptyTypeName(i))
                        } else {
                            Ok(name.to_string())
                        }
                    })
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                param_types = Some(names);
            }
            _ => {}
        }
    }

    let (module_name, callable_name) = path
        .rsplit_once('.')
        .ok_or_else(|| ReferenceError::MissingCallableName(path.to_string()))?;
    if module_name.is_empty() || callable_name.is_empty() {
        return Err(ReferenceError::EmptySegment(path.to_string()));
    }

    Ok(CalleeLocator {
        module_name: module_name.to_string(),
        callable_name: callable_name.to_string(),
        explicit_param_type_names: param_types,
    })
}
