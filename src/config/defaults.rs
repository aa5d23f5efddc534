//! Default values and presets.

use super::types::{ImportConfig, ReconcileConfig};

/// CycloneDX spec version of exported documents
pub const DEFAULT_SPEC_VERSION: &str = "1.6";

/// Tool name written into exported metadata
pub const DEFAULT_TOOL_NAME: &str = "SW360";

/// Tool vendor written into exported metadata
pub const DEFAULT_TOOL_VENDOR: &str = "Eclipse Foundation";

/// Spec versions the writer can emit.
pub const SUPPORTED_SPEC_VERSIONS: &[&str] = &["1.4", "1.5", "1.6"];

// ============================================================================
// Configuration Presets
// ============================================================================

/// Named configuration presets for common use cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigPreset {
    /// Package mode, links replaced on every import
    Default,
    /// Every component imported as a release, no packages
    ReleaseOnly,
    /// Package mode, existing project links kept
    Merge,
}

impl ConfigPreset {
    /// Get the preset name as a string.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::ReleaseOnly => "release-only",
            Self::Merge => "merge",
        }
    }

    /// Parse a preset from a string name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "default" | "package" => Some(Self::Default),
            "release-only" | "releases" | "legacy" => Some(Self::ReleaseOnly),
            "merge" | "keep-links" => Some(Self::Merge),
            _ => None,
        }
    }

    /// Get a description of this preset.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Default => "Group by VCS, create packages, replace project links",
            Self::ReleaseOnly => "Import every component as a release without packages",
            Self::Merge => "Group by VCS, create packages, keep existing project links",
        }
    }

    /// Get all available presets.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Default, Self::ReleaseOnly, Self::Merge]
    }
}

impl std::fmt::Display for ConfigPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Preset Implementations
// ============================================================================

impl ReconcileConfig {
    /// Create a `ReconcileConfig` from a named preset.
    #[must_use]
    pub fn from_preset(preset: ConfigPreset) -> Self {
        match preset {
            ConfigPreset::Default => Self::default(),
            ConfigPreset::ReleaseOnly => Self {
                import: ImportConfig {
                    package_mode: false,
                    ..ImportConfig::default()
                },
                ..Self::default()
            },
            ConfigPreset::Merge => Self {
                import: ImportConfig {
                    do_not_replace_package_and_release: true,
                    ..ImportConfig::default()
                },
                ..Self::default()
            },
        }
    }
}
