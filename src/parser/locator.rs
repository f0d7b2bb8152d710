//! Parsed external reference.

use std::fmt;

/// Where to find the native implementation of a routine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CalleeLocator {
    /// Qualified module name, e.g. `math.Ops`.
    pub module_name: String,
    /// Callable name inside the module.
    pub callable_name: String,
    /// Native parameter type names; `None` means infer from the SQL signature.
    pub explicit_param_type_names: Option<Vec<String>>,
}

impl CalleeLocator {
    /// Creates a locator whose parameter types are inferred.
    #[must_use]
    pub fn new(module_name: impl Into<String>, callable_name: impl Into<String>) -> Self {
        CalleeLocator {
            module_name: module_name.into(),
            callable_name: callable_name.into(),
            explicit_param_type_names: None,
        }
    }

    /// Sets explicit parameter type names.
    #[must_use]
    pub fn with_param_types<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.explicit_param_type_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Returns the fully qualified callable name.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.module_name, self.callable_name)
    }
}

impl fmt::Display for CalleeLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module_name, self.callable_name)?;
        if let Some(names) = &self.explicit_param_type_names {
            write!(f, "({})", names.join(","))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_round_trips_reference_body() {
        let locator = CalleeLocator::new("math.Ops", "pow").with_param_types(["double", "int"]);
        assert_eq!(locator.to_string(), "math.Ops.pow(double,int)");
        assert_eq!(CalleeLocator::new("m", "f").to_string(), "m.f");
    }
}
