//! Configuration types for import and export operations.

use crate::matching::NonPackageManagedFlag;
use crate::model::UserRole;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ============================================================================
// Unified Application Configuration
// ============================================================================

/// Top-level configuration, loaded from a config file and overridden by CLI
/// flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Import behavior
    pub import: ImportConfig,
    /// Export behavior
    pub export: ExportConfig,
    /// Access control
    pub access: AccessConfig,
    /// Tool identity written into exported documents
    pub tool: ToolConfig,
}

impl ReconcileConfig {
    /// Create a new `ReconcileConfig` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a `ReconcileConfig` builder.
    pub fn builder() -> ReconcileConfigBuilder {
        ReconcileConfigBuilder::default()
    }
}

// ============================================================================
// Builder for ReconcileConfig
// ============================================================================

/// Builder for constructing `ReconcileConfig` with fluent API.
#[derive(Debug, Default)]
#[must_use]
pub struct ReconcileConfigBuilder {
    config: ReconcileConfig,
}

impl ReconcileConfigBuilder {
    /// Enable or disable package mode.
    pub const fn package_mode(mut self, enabled: bool) -> Self {
        self.config.import.package_mode = enabled;
        self
    }

    /// Keep existing project links instead of replacing them.
    pub const fn do_not_replace_package_and_release(mut self, keep: bool) -> Self {
        self.config.import.do_not_replace_package_and_release = keep;
        self
    }

    /// Attach the SBOM and import report to the project.
    pub const fn attachments(mut self, enabled: bool) -> Self {
        self.config.import.attach_sbom = enabled;
        self.config.import.attach_import_report = enabled;
        self
    }

    /// Set the non-package-managed marker property.
    pub fn non_package_managed(
        mut self,
        property: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.config.import.non_package_managed_property = property.into();
        self.config.import.non_package_managed_value = value.into();
        self
    }

    /// Include linked sub-projects in exports.
    pub const fn include_sub_projects(mut self, include: bool) -> Self {
        self.config.export.include_sub_projects = include;
        self
    }

    /// Drop license ids that are not SPDX identifiers on export.
    pub const fn strict_spdx_licenses(mut self, strict: bool) -> Self {
        self.config.export.strict_spdx_licenses = strict;
        self
    }

    /// Attach exported documents to the project.
    pub const fn attach_export(mut self, attach: bool) -> Self {
        self.config.export.attach_to_project = attach;
        self
    }

    /// Set the minimum role for import and export.
    pub const fn required_role(mut self, role: UserRole) -> Self {
        self.config.access.required_role = role;
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> ReconcileConfig {
        self.config
    }
}

// ============================================================================
// Import Configuration
// ============================================================================

/// Import behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ImportConfig {
    /// Group components by VCS and create packages
    pub package_mode: bool,
    /// Property name marking a component as not package managed
    pub non_package_managed_property: String,
    /// Property value marking a component as not package managed
    pub non_package_managed_value: String,
    /// Merge into existing project links instead of replacing them
    pub do_not_replace_package_and_release: bool,
    /// Store the imported SBOM as a project attachment
    pub attach_sbom: bool,
    /// Store the import report as a project attachment
    pub attach_import_report: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        let flag = NonPackageManagedFlag::default();
        Self {
            package_mode: true,
            non_package_managed_property: flag.property,
            non_package_managed_value: flag.value,
            do_not_replace_package_and_release: false,
            attach_sbom: true,
            attach_import_report: true,
        }
    }
}

impl ImportConfig {
    /// The configured non-package-managed marker.
    #[must_use]
    pub fn non_package_managed_flag(&self) -> NonPackageManagedFlag {
        NonPackageManagedFlag::new(
            self.non_package_managed_property.clone(),
            self.non_package_managed_value.clone(),
        )
    }
}

// ============================================================================
// Export Configuration
// ============================================================================

/// Export behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ExportConfig {
    /// Also export releases and packages of linked sub-projects
    pub include_sub_projects: bool,
    /// Drop license ids that are not SPDX identifiers (otherwise emit them as names)
    pub strict_spdx_licenses: bool,
    /// Store the exported document as a project attachment
    pub attach_to_project: bool,
    /// CycloneDX spec version of exported documents
    pub spec_version: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            include_sub_projects: false,
            strict_spdx_licenses: true,
            attach_to_project: false,
            spec_version: super::defaults::DEFAULT_SPEC_VERSION.to_string(),
        }
    }
}

// ============================================================================
// Access and Tool Configuration
// ============================================================================

/// Access control.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AccessConfig {
    /// Minimum role required to import or export
    pub required_role: UserRole,
}

/// Tool identity written into exported document metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ToolConfig {
    pub name: String,
    pub vendor: String,
    pub version: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            name: super::defaults::DEFAULT_TOOL_NAME.to_string(),
            vendor: super::defaults::DEFAULT_TOOL_VENDOR.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
