//! Unified error types for sbom-reconcile.
//!
//! The taxonomy separates request-level failures, which abort an import or
//! export before anything is written, from item-level failures, which skip a
//! single component/release/package and are folded into the batch report.

use std::path::PathBuf;
use thiserror::Error;

/// Kind of catalog entity an item-level error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Component,
    Release,
    Package,
    Project,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Component => write!(f, "component"),
            Self::Release => write!(f, "release"),
            Self::Package => write!(f, "package"),
            Self::Project => write!(f, "project"),
        }
    }
}

/// Main error type for reconciliation operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ReconcileError {
    /// Caller lacks the configured minimum role
    #[error("Access denied: role {required} or higher is required")]
    AccessDenied { required: String },

    /// Input file extension is neither XML nor JSON
    #[error("Invalid file format {extension}. Only XML & JSON SBOM are supported by CycloneDX!")]
    UnsupportedFormat { extension: String },

    /// The codec could not decode the document
    #[error("Failed to parse SBOM: {context}")]
    Parse {
        context: String,
        #[source]
        source: ParseErrorKind,
    },

    /// The component list contradicts itself
    #[error("SBOM import aborted with error: {0}")]
    MalformedBom(String),

    /// BOM metadata does not match the target project
    #[error("Sanity check failed: SBOM describes {found}, project is {expected}")]
    SanityCheck { expected: String, found: String },

    /// More than one catalog entry matches an upsert query
    #[error("Multiple {kind}s found for {name}")]
    AmbiguousDuplicate { kind: EntityKind, name: String },

    /// Candidate entity is missing required data or carries a malformed identifier
    #[error("Invalid {kind} {name}: {reason}")]
    InvalidItem {
        kind: EntityKind,
        name: String,
        reason: String,
    },

    /// A storage error while writing a single catalog entity
    #[error("Failed to persist {kind} {name}: {message}")]
    ItemPersistence {
        kind: EntityKind,
        name: String,
        message: String,
    },

    /// The final project update failed
    #[error("Failed to update project {project_id}: {message}")]
    BatchPersistence { project_id: String, message: String },

    /// Raw error reported by a storage collaborator
    #[error("Storage error: {context}")]
    Storage { context: String },

    /// Serialization of an exported document or report failed
    #[error("Serialization failed: {context}")]
    Serialize { context: String },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Specific parse error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ParseErrorKind {
    #[error("Invalid JSON structure: {0}")]
    InvalidJson(String),

    #[error("Invalid XML structure: {0}")]
    InvalidXml(String),

    #[error("Missing required field: {field} in {context}")]
    MissingField { field: String, context: String },

    #[error("Expected JSON or XML CycloneDX content")]
    UnknownFormat,
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for reconciliation operations
pub type Result<T> = std::result::Result<T, ReconcileError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl ReconcileError {
    /// Create a parse error with context
    pub fn parse(context: impl Into<String>, source: ParseErrorKind) -> Self {
        Self::Parse {
            context: context.into(),
            source,
        }
    }

    /// Create a parse error for a missing field
    pub fn missing_field(field: impl Into<String>, context: impl Into<String>) -> Self {
        Self::parse(
            "missing required field",
            ParseErrorKind::MissingField {
                field: field.into(),
                context: context.into(),
            },
        )
    }

    pub fn access_denied(required: impl Into<String>) -> Self {
        Self::AccessDenied {
            required: required.into(),
        }
    }

    pub fn unsupported_format(extension: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            extension: extension.into(),
        }
    }

    /// Create an ambiguous-duplicate error for one catalog entity
    pub fn ambiguous(kind: EntityKind, name: impl Into<String>) -> Self {
        Self::AmbiguousDuplicate {
            kind,
            name: name.into(),
        }
    }

    /// Create an invalid-item error for one catalog entity
    pub fn invalid_item(
        kind: EntityKind,
        name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidItem {
            kind,
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a storage error
    pub fn storage(context: impl Into<String>) -> Self {
        Self::Storage {
            context: context.into(),
        }
    }

    /// Create a serialization error
    pub fn serialize(context: impl Into<String>) -> Self {
        Self::Serialize {
            context: context.into(),
        }
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let message = format!("{source}");
        Self::Io {
            path: Some(path),
            message,
            source,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Reclassify a storage failure as an item-level persistence failure.
    ///
    /// Item-level errors that are already classified pass through unchanged.
    #[must_use]
    pub fn into_item_failure(self, kind: EntityKind, name: &str) -> Self {
        match self {
            err @ (Self::AmbiguousDuplicate { .. }
            | Self::InvalidItem { .. }
            | Self::ItemPersistence { .. }) => err,
            other => Self::ItemPersistence {
                kind,
                name: name.to_string(),
                message: other.to_string(),
            },
        }
    }

    /// Whether this error is recovered locally by the batch loop.
    #[must_use]
    pub const fn is_item_level(&self) -> bool {
        matches!(
            self,
            Self::AmbiguousDuplicate { .. } | Self::InvalidItem { .. } | Self::ItemPersistence { .. }
        )
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for ReconcileError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for ReconcileError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse(
            "JSON deserialization",
            ParseErrorKind::InvalidJson(err.to_string()),
        )
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// # Example
///
/// ```ignore
/// use sbom_reconcile::error::ErrorContext;
///
/// let bom = read_bom(&content, format).context("decoding uploaded SBOM")?;
/// ```
pub trait ErrorContext<T> {
    /// Add context to an error, prepended to any existing context.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure, only evaluated on error.
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<ReconcileError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

/// Add context to an error, chaining with any existing context.
///
/// Variants that carry structured fields rather than a context string are
/// returned unchanged.
fn add_context_to_error(err: ReconcileError, new_ctx: &str) -> ReconcileError {
    match err {
        ReconcileError::Parse {
            context: existing,
            source,
        } => ReconcileError::Parse {
            context: chain_context(new_ctx, &existing),
            source,
        },
        ReconcileError::Storage { context: existing } => ReconcileError::Storage {
            context: chain_context(new_ctx, &existing),
        },
        ReconcileError::Serialize { context: existing } => ReconcileError::Serialize {
            context: chain_context(new_ctx, &existing),
        },
        ReconcileError::Io {
            path,
            message,
            source,
        } => ReconcileError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
        ReconcileError::Config(msg) => ReconcileError::Config(chain_context(new_ctx, &msg)),
        ReconcileError::Validation(msg) => {
            ReconcileError::Validation(chain_context(new_ctx, &msg))
        }
        other => other,
    }
}

/// Chain two context strings together as "`new`: `existing`".
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}

/// Extension trait for Option types to convert to errors with context.
pub trait OptionContext<T> {
    /// Convert None to an error with the given context.
    fn context_none(self, context: impl Into<String>) -> Result<T>;

    /// Convert None to an error with context from a closure.
    fn with_context_none<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T> OptionContext<T> for Option<T> {
    fn context_none(self, context: impl Into<String>) -> Result<T> {
        self.ok_or_else(|| ReconcileError::Validation(context.into()))
    }

    fn with_context_none<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.ok_or_else(|| ReconcileError::Validation(f().into()))
    }
}
