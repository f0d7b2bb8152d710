//! Binder configuration.

use serde::{Deserialize, Serialize};

use crate::error::{RbindError, Result};
use crate::types::TypeRules;

/// Marker prefix identifying references to library callables.
pub const DEFAULT_LIBRARY_PREFIX: &str = "LIB:";

/// Configuration shared by every binding attempt.
///
/// Built once and handed to the binder; it is never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinderConfig {
    /// Prefix every external reference must start with.
    pub library_prefix: String,
    /// SQL/native type mapping and family tables.
    pub type_rules: TypeRules,
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self {
            library_prefix: DEFAULT_LIBRARY_PREFIX.to_string(),
            type_rules: TypeRules::default(),
        }
    }
}

impl BinderConfig {
    /// Creates a new binder configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the library marker prefix.
    #[must_use]
    pub fn with_library_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.library_prefix = prefix.into();
        self
    }

    /// Sets the type rule tables.
    #[must_use]
    pub fn with_type_rules(mut self, type_rules: TypeRules) -> Self {
        self.type_rules = type_rules;
        self
    }

    /// Checks that the configuration can be used for binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the library prefix is empty or contains a
    /// character reserved by the reference grammar.
    pub fn validate(&self) -> Result<()> {
        if self.library_prefix.is_empty() {
            return Err(RbindError::Config("Library prefix cannot be empty".into()));
        }
        if let Some(c) = self
            .library_prefix
            .chars()
            .find(|c| matches!(c, '(' | ')' | ','))
        {
            return Err(RbindError::Config(format!(
                "Library prefix '{}' contains reserved character '{c}'",
                self.library_prefix
            )));
        }
        Ok(())
    }

    /// Serializes the configuration to bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| RbindError::Config(format!("Failed to serialize config: {e}")))
    }

    /// Deserializes and validates a configuration from bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization or validation fails.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        let config: Self = bincode::deserialize(data)
            .map_err(|e| RbindError::Config(format!("Failed to deserialize config: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SqlTypeName, TypeFamily};

    #[test]
    fn test_default_config_is_valid() {
        let config = BinderConfig::default();
        assert_eq!(config.library_prefix, "LIB:");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_prefix_rejected() {
        let config = BinderConfig::new().with_library_prefix("");
        assert!(matches!(config.validate(), Err(RbindError::Config(_))));
    }

    #[test]
    fn test_reserved_prefix_character_rejected() {
        let config = BinderConfig::new().with_library_prefix("lib(");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("reserved character '('"));
    }

    #[test]
    fn test_deserialize_validates() {
        let bytes = BinderConfig::new()
            .with_library_prefix("")
            .serialize()
            .unwrap();
        assert!(BinderConfig::deserialize(&bytes).is_err());

        let bytes = BinderConfig::new()
            .with_library_prefix("class ")
            .serialize()
            .unwrap();
        let config = BinderConfig::deserialize(&bytes).unwrap();
        assert_eq!(config.library_prefix, "class ");
    }

    #[test]
    fn test_persisted_config_equals_original() {
        let config = BinderConfig::new()
            .with_type_rules(TypeRules::default().with_family(SqlTypeName::Time, TypeFamily::Unknown));
        let restored = BinderConfig::deserialize(&config.serialize().unwrap()).unwrap();
        assert_eq!(restored, config);
    }
}
