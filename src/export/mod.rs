//! BOM export: a project and its linked catalog entries as a CycloneDX document.
//!
//! [`BomExporter`] collects the project's release and package links
//! (optionally through linked sub-projects), maps them with
//! [`ComponentMapper`], wraps them with [`BomAssembler`] and hands the
//! document to the codec.

mod assembler;
mod exporter;
mod license;
mod mapper;

pub use assembler::BomAssembler;
pub use exporter::{collect_linked_ids, export_attachment_name, BomExporter, ExportRequest, LinkedIds};
pub use license::LicenseNormalizer;
pub use mapper::{decode_purls, release_purl, ComponentMapper};

use crate::codec::BomFormat;
use crate::error::ReconcileError;
use crate::reconcile::RequestStatus;

/// Outcome of an export: a status, a message and, on success, the
/// serialized document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub status: RequestStatus,
    pub message: String,
    pub format: BomFormat,
    pub content: Option<String>,
}

impl ExportSummary {
    /// Summary of a failed export.
    #[must_use]
    pub fn from_error(err: &ReconcileError, format: BomFormat) -> Self {
        let message = match err {
            ReconcileError::AccessDenied { required } => required.clone(),
            other => other.to_string(),
        };
        Self {
            status: RequestStatus::from(err),
            message,
            format,
            content: None,
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status.is_success()
    }
}
