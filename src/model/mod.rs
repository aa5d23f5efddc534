//! Data model for BOM documents and the catalog they reconcile against.
//!
//! - [`bom`]: the typed CycloneDX document the codec produces and consumes
//! - [`catalog`]: components, releases, packages, projects and users
//! - [`component_type`]: the catalog/wire component type table

mod bom;
mod catalog;
mod component_type;
mod identifiers;

pub use bom::{
    versioned_name, BomComponent, BomComponentType, BomDocument, BomLicense, BomMetadata, BomTool,
    ExternalRefType, ExternalReference, Property,
};
pub use catalog::{
    Attachment, AttachmentType, Component, ComponentKind, ComponentObservation, MainlineState,
    Package, Project, ProjectRelationship, Release, ReleaseRelationship, Repository,
    RepositoryType, User, UserRole,
};
pub use component_type::{verify_type_table, CdxComponentType};
pub use identifiers::{PackageManager, NO_ASSERTION, NULL_MARKER, PACKAGE_URL_KEY, PURL_ID_KEY};
