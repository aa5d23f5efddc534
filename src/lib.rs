//! **A reconciliation engine between CycloneDX SBOMs and a component catalog.**
//!
//! `sbom-reconcile` imports CycloneDX documents into a catalog of
//! *components* (upstream projects), *releases* (versions of a component)
//! and *packages* (package-manager scoped units identified by a purl), links
//! the results to a *project*, and exports a project back into a CycloneDX
//! document.
//!
//! Imports are idempotent: the same real-world entity is never created twice,
//! metadata on existing entities is only filled where it is missing, and a
//! re-import reports reuse instead of creation.
//!
//! ## Core Concepts & Modules
//!
//! - **[`matching`]**: canonical VCS identities ([`normalize_vcs_url`]) and
//!   the grouping of a component list by repository ([`ComponentGrouping`]).
//! - **[`reconcile`]**: the import side. [`BomImporter`] runs permission,
//!   format and project checks, drives the [`CatalogUpserter`] group by
//!   group, applies the project links and builds the [`ImportReport`].
//! - **[`export`]**: the export side. [`BomExporter`] maps linked packages
//!   and releases to BOM components and assembles the document.
//! - **[`catalog`]**: the collaborator traits the engine talks to, with
//!   in-memory and file-backed adapters.
//! - **[`codec`]**: CycloneDX JSON and XML reading and writing.
//! - **[`model`]**: the BOM document model and the catalog entities.
//!
//! ## Importing a BOM
//!
//! ```no_run
//! use sbom_reconcile::catalog::{InMemoryAttachments, InMemoryCatalog, InMemoryProjects};
//! use sbom_reconcile::model::{User, UserRole};
//! use sbom_reconcile::{BomImporter, ImportRequest, ReconcileConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let content = std::fs::read("bom.cdx.json")?;
//!     let user = User::new("alice@example.org", UserRole::ClearingAdmin);
//!
//!     let mut catalog = InMemoryCatalog::new();
//!     let mut projects = InMemoryProjects::new();
//!     let mut attachments = InMemoryAttachments::new();
//!     let config = ReconcileConfig::default();
//!     let mut importer =
//!         BomImporter::new(&mut catalog, &mut projects, &mut attachments, &config)?;
//!
//!     let summary = importer.import(&ImportRequest {
//!         file_name: "bom.cdx.json",
//!         content: &content,
//!         project_id: None,
//!         user: &user,
//!     });
//!     println!("{}: {}", summary.status, summary.message);
//!     Ok(())
//! }
//! ```
//!
//! ## Exporting a Project
//!
//! ```no_run
//! use sbom_reconcile::catalog::{InMemoryAttachments, InMemoryCatalog, InMemoryProjects};
//! use sbom_reconcile::codec::BomFormat;
//! use sbom_reconcile::model::{User, UserRole};
//! use sbom_reconcile::{BomExporter, ExportRequest, ReconcileConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let catalog = InMemoryCatalog::new();
//!     let mut projects = InMemoryProjects::new();
//!     let mut attachments = InMemoryAttachments::new();
//!     let user = User::new("alice@example.org", UserRole::User);
//!     let config = ReconcileConfig::default();
//!
//!     let mut exporter = BomExporter::new(&catalog, &mut projects, &mut attachments, &config)?;
//!     let summary = exporter.export(&ExportRequest {
//!         project_id: "0f3c…",
//!         format: BomFormat::Json,
//!         user: &user,
//!     });
//!     if let Some(document) = summary.content {
//!         println!("{document}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Command-Line Interface (CLI)
//!
//! The `sbom-reconcile` binary runs the same operations against a JSON
//! catalog snapshot (`import`, `export`, `normalize`, `group`).

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(
    // Doc completeness: # Errors / # Panics sections are aspirational
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    // Variable names like `created`/`current` are clear in context
    clippy::similar_names
)]

pub mod catalog;
pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod export;
pub mod matching;
pub mod model;
pub mod pipeline;
pub mod reconcile;

// Re-export main types for convenience
pub use config::{ConfigError, ConfigPreset, ReconcileConfig, ReconcileConfigBuilder, Validatable};
pub use error::{ErrorContext, OptionContext, ReconcileError, Result};
pub use export::{BomExporter, ExportRequest, ExportSummary};
pub use matching::{normalize_vcs_url, ComponentGrouping, VcsIdentity};
pub use model::{BomComponent, BomDocument, Component, Package, Project, Release};
pub use reconcile::{
    BomImporter, CatalogUpserter, ImportReport, ImportRequest, ImportSummary, RequestStatus,
};
