//! BOM import: reconciliation of a CycloneDX component list with the catalog.
//!
//! The import runs in one synchronous pass:
//!
//! 1. permission, format and decoding checks (request level, nothing written)
//! 2. grouping of the component list by VCS identity
//! 3. project creation or validation
//! 4. catalog upserts group by group, member by member ([`CatalogUpserter`])
//! 5. a single project update carrying the links and attachments
//!
//! Item-level failures never abort the batch; they are folded into a
//! [`BatchResult`] and surface in the [`ImportReport`].

mod batch;
mod importer;
mod linkage;
mod report;
mod upsert;

pub use batch::{BatchResult, EntityTally, Upserted};
pub use importer::{import_attachment_name, BomImporter, ImportRequest};
pub use linkage::{default_relation, link_batch, LinkMode, PriorLinks};
pub use report::{join_names, keys, ImportReport, JOINER};
pub use upsert::{license_ids, observe, CatalogUpserter};

use crate::error::ReconcileError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Caller-visible status of an import or export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Success,
    Failure,
    AccessDenied,
    Duplicate,
    FailedSanityCheck,
    InvalidInput,
}

impl RequestStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
            Self::AccessDenied => "ACCESS_DENIED",
            Self::Duplicate => "DUPLICATE",
            Self::FailedSanityCheck => "FAILED_SANITY_CHECK",
            Self::InvalidInput => "INVALID_INPUT",
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&ReconcileError> for RequestStatus {
    fn from(err: &ReconcileError) -> Self {
        match err {
            ReconcileError::AccessDenied { .. } => Self::AccessDenied,
            ReconcileError::SanityCheck { .. } => Self::FailedSanityCheck,
            ReconcileError::Validation(_) => Self::InvalidInput,
            _ => Self::Failure,
        }
    }
}

/// Outcome of an import: a status, a short message and, once the project is
/// known, the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub status: RequestStatus,
    pub message: String,
    pub report: Option<ImportReport>,
}

impl ImportSummary {
    /// Summary of a request-level failure.
    #[must_use]
    pub fn from_error(err: &ReconcileError) -> Self {
        let message = match err {
            ReconcileError::AccessDenied { required } => required.clone(),
            other => other.to_string(),
        };
        Self {
            status: RequestStatus::from(err),
            message,
            report: None,
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status.is_success()
    }
}
