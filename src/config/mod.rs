//! Configuration module for sbom-reconcile.
//!
//! This module provides:
//! - Type-safe configuration structures
//! - Validation for all configuration values
//! - Named presets for common use cases
//! - YAML config file loading and discovery
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sbom_reconcile::config::{ConfigPreset, ReconcileConfig};
//!
//! // Use defaults
//! let config = ReconcileConfig::default();
//!
//! // Use a preset
//! let config = ReconcileConfig::from_preset(ConfigPreset::Merge);
//!
//! // Use builder
//! let config = ReconcileConfig::builder()
//!     .package_mode(false)
//!     .include_sub_projects(true)
//!     .build();
//!
//! // Load from file
//! use sbom_reconcile::config::file::load_or_default;
//! let (config, loaded_from) = load_or_default(None);
//! ```
//!
//! # Configuration File
//!
//! Place a `.sbom-reconcile.yaml` file in your project root or
//! `~/.config/sbom-reconcile/`:
//!
//! ```yaml
//! import:
//!   package_mode: true
//!   do_not_replace_package_and_release: false
//! export:
//!   include_sub_projects: true
//! access:
//!   required_role: user
//! ```

mod defaults;
pub mod file;
mod types;
mod validation;

pub use defaults::{
    ConfigPreset, DEFAULT_SPEC_VERSION, DEFAULT_TOOL_NAME, DEFAULT_TOOL_VENDOR,
    SUPPORTED_SPEC_VERSIONS,
};
pub use file::{
    discover_config_file, generate_example_config, load_config_file, load_or_default,
    ConfigFileError,
};
pub use types::{
    AccessConfig, ExportConfig, ImportConfig, ReconcileConfig, ReconcileConfigBuilder, ToolConfig,
};
pub use validation::{ConfigError, Validatable};

/// Generate a JSON Schema for the `ReconcileConfig` configuration format.
///
/// This schema documents all configuration options that can be set in
/// `.sbom-reconcile.yaml` config files. It can be used by editors for
/// validation and autocompletion.
#[must_use]
pub fn generate_json_schema() -> String {
    let schema = schemars::schema_for!(ReconcileConfig);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}
