//! Wire format selection.

use crate::error::{ReconcileError, Result};
use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// CycloneDX serialization format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum BomFormat {
    /// CycloneDX JSON
    #[default]
    Json,
    /// CycloneDX XML
    Xml,
}

impl BomFormat {
    /// Format for a file extension, compared case-insensitively.
    pub fn from_extension(extension: &str) -> Result<Self> {
        match extension.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "xml" => Ok(Self::Xml),
            other => Err(ReconcileError::unsupported_format(other)),
        }
    }

    /// Format for a file name such as `bom.cdx.json`.
    pub fn from_file_name(file_name: &str) -> Result<Self> {
        let extension = Path::new(file_name.trim())
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        Self::from_extension(extension)
    }

    /// Guess the format from the first non-whitespace character.
    #[must_use]
    pub fn sniff(content: &str) -> Option<Self> {
        match content.trim_start().chars().next() {
            Some('{') => Some(Self::Json),
            Some('<') => Some(Self::Xml),
            _ => None,
        }
    }

    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Xml => "xml",
        }
    }

    #[must_use]
    pub const fn content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/vnd.cyclonedx+json",
            Self::Xml => "application/vnd.cyclonedx+xml",
        }
    }
}

impl std::fmt::Display for BomFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BomFormat::Json => write!(f, "json"),
            BomFormat::Xml => write!(f, "xml"),
        }
    }
}
