//! Configuration validation.

use super::defaults::SUPPORTED_SPEC_VERSIONS;
use super::types::{ExportConfig, ImportConfig, ReconcileConfig, ToolConfig};

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for ReconcileConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.import.validate());
        errors.extend(self.export.validate());
        errors.extend(self.tool.validate());
        errors
    }
}

impl Validatable for ImportConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.non_package_managed_property.trim().is_empty() {
            errors.push(ConfigError::new(
                "import.non_package_managed_property",
                "Property name must not be empty",
            ));
        }
        if self.non_package_managed_value.trim().is_empty() {
            errors.push(ConfigError::new(
                "import.non_package_managed_value",
                "Property value must not be empty",
            ));
        }
        errors
    }
}

impl Validatable for ExportConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if !SUPPORTED_SPEC_VERSIONS.contains(&self.spec_version.as_str()) {
            errors.push(ConfigError::new(
                "export.spec_version",
                format!(
                    "Unsupported spec version '{}'. Valid options: {}",
                    self.spec_version,
                    SUPPORTED_SPEC_VERSIONS.join(", ")
                ),
            ));
        }
        errors
    }
}

impl Validatable for ToolConfig {
    fn validate(&self) -> Vec<ConfigError> {
        if self.name.trim().is_empty() {
            vec![ConfigError::new("tool.name", "Tool name must not be empty")]
        } else {
            Vec::new()
        }
    }
}
