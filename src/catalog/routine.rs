//! Routine declarations and the routine catalog.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{RbindError, Result};
use crate::types::SqlDataType;

/// Central registry of routine declarations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutineCatalog {
    /// Routine declarations by name.
    routines: HashMap<String, Arc<RoutineDeclaration>>,
    /// Next routine ID for auto-increment.
    #[serde(default)]
    next_routine_id: u32,
}

impl RoutineCatalog {
    /// Creates a new empty catalog.
    #[must_use]
    pub fn new() -> Self {
        RoutineCatalog {
            routines: HashMap::new(),
            next_routine_id: 0,
        }
    }

    /// Registers a routine declaration.
    ///
    /// # Errors
    ///
    /// Returns an error if a routine with the same name already exists.
    pub fn create_routine(&mut self, mut routine: RoutineDeclaration) -> Result<u32> {
        if self.routines.contains_key(&routine.name) {
            return Err(RbindError::Catalog(format!(
                "Routine '{}' already exists",
                routine.name
            )));
        }
        let routine_id = self.next_routine_id;
        self.next_routine_id += 1;
        routine.routine_id = routine_id;
        self.routines
            .insert(routine.name.clone(), Arc::new(routine));
        Ok(routine_id)
    }

    /// Removes a routine declaration.
    ///
    /// # Errors
    ///
    /// Returns an error if the routine does not exist.
    pub fn drop_routine(&mut self, name: &str) -> Result<Arc<RoutineDeclaration>> {
        self.routines
            .remove(name)
            .ok_or_else(|| RbindError::Catalog(format!("Routine '{name}' does not exist")))
    }

    /// Retrieves a routine declaration by name.
    #[must_use]
    pub fn get_routine(&self, name: &str) -> Option<Arc<RoutineDeclaration>> {
        self.routines.get(name).cloned()
    }

    /// Checks if a routine exists in the catalog.
    #[must_use]
    pub fn routine_exists(&self, name: &str) -> bool {
        self.routines.contains_key(name)
    }

    /// Returns all routine names.
    #[must_use]
    pub fn routine_names(&self) -> Vec<&str> {
        self.routines.keys().map(String::as_str).collect()
    }

    /// Serializes the catalog to bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| RbindError::Catalog(format!("Failed to serialize catalog: {e}")))
    }

    /// Deserializes a catalog from bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data)
            .map_err(|e| RbindError::Catalog(format!("Failed to deserialize catalog: {e}")))
    }
}

/// SQL-level declaration of a routine implemented outside SQL.
///
/// Immutable once created; the binder only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineDeclaration {
    /// Internal routine ID.
    pub routine_id: u32,
    /// Routine name.
    pub name: String,
    /// Raw external reference naming the native implementation.
    pub external_reference: String,
    /// Declared return type.
    pub return_type: SqlDataType,
    /// Ordered parameter declarations.
    pub params: Vec<RoutineParameter>,
}

impl RoutineDeclaration {
    /// Creates a new routine declaration with validation.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or parameter names repeat.
    pub fn new(
        name: impl Into<String>,
        external_reference: impl Into<String>,
        return_type: SqlDataType,
        params: Vec<RoutineParameter>,
    ) -> Result<Self> {
        let routine = RoutineDeclaration {
            routine_id: 0, // Will be set by catalog
            name: name.into(),
            external_reference: external_reference.into(),
            return_type,
            params,
        };
        routine.validate()?;
        Ok(routine)
    }

    fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(RbindError::Catalog("Routine name cannot be empty".into()));
        }

        let mut seen = HashSet::new();
        for param in &self.params {
            if !seen.insert(&param.name) {
                return Err(RbindError::Catalog(format!(
                    "Duplicate parameter name '{}' in routine '{}'",
                    param.name, self.name
                )));
            }
        }

        Ok(())
    }

    /// Returns the number of declared parameters.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Returns the declared parameter types in order.
    #[must_use]
    pub fn param_types(&self) -> Vec<SqlDataType> {
        self.params.iter().map(|p| p.data_type).collect()
    }

    /// Finds a parameter declaration by position.
    #[must_use]
    pub fn param(&self, position: usize) -> Option<&RoutineParameter> {
        self.params.get(position)
    }
}

/// Declaration of a single routine parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineParameter {
    /// Parameter name.
    pub name: String,
    /// Declared SQL type.
    pub data_type: SqlDataType,
}

impl RoutineParameter {
    /// Creates a new parameter declaration.
    #[must_use]
    pub fn new(name: impl Into<String>, data_type: impl Into<SqlDataType>) -> Self {
        RoutineParameter {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SqlTypeName;

    fn square() -> RoutineDeclaration {
        RoutineDeclaration::new(
            "SQUARE",
            "LIB:math.Ops.square(int)",
            SqlDataType::new(SqlTypeName::Integer),
            vec![RoutineParameter::new("X", SqlTypeName::Integer)],
        )
        .unwrap()
    }

    #[test]
    fn test_create_and_get_routine() {
        let mut catalog = RoutineCatalog::new();
        assert_eq!(catalog.create_routine(square()).unwrap(), 0);
        let routine = catalog.get_routine("SQUARE").unwrap();
        assert_eq!(routine.arity(), 1);
        assert_eq!(routine.param_types(), vec![SqlDataType::new(SqlTypeName::Integer)]);
        assert!(catalog.routine_exists("SQUARE"));
    }

    #[test]
    fn test_duplicate_routine_rejected() {
        let mut catalog = RoutineCatalog::new();
        catalog.create_routine(square()).unwrap();
        let err = catalog.create_routine(square()).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_drop_routine() {
        let mut catalog = RoutineCatalog::new();
        catalog.create_routine(square()).unwrap();
        assert!(catalog.drop_routine("SQUARE").is_ok());
        assert!(catalog.drop_routine("SQUARE").is_err());
        assert!(catalog.routine_names().is_empty());
    }

    #[test]
    fn test_duplicate_parameter_rejected() {
        let result = RoutineDeclaration::new(
            "ADD",
            "LIB:math.Ops.add",
            SqlDataType::new(SqlTypeName::Integer),
            vec![
                RoutineParameter::new("X", SqlTypeName::Integer),
                RoutineParameter::new("X", SqlTypeName::Integer),
            ],
        );
        assert!(matches!(result, Err(RbindError::Catalog(_))));
    }

    #[test]
    fn test_catalog_persistence() {
        let mut catalog = RoutineCatalog::new();
        catalog.create_routine(square()).unwrap();
        let bytes = catalog.serialize().unwrap();
        let restored = RoutineCatalog::deserialize(&bytes).unwrap();
        assert_eq!(
            restored.get_routine("SQUARE").unwrap().external_reference,
            "LIB:math.Ops.square(int)"
        );
    }
}
