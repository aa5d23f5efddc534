//! Catalog, project, attachment and permission collaborators.
//!
//! The engine depends only on the traits in this module. In-memory adapters
//! back the tests; the CLI persists them through a [`CatalogSnapshot`] and
//! stores attachments with [`FsAttachmentStore`].

mod fs;
mod memory;
mod snapshot;
mod traits;

pub use fs::FsAttachmentStore;
pub use memory::{InMemoryAttachments, InMemoryCatalog, InMemoryProjects};
pub use snapshot::CatalogSnapshot;
pub use traits::{
    sha256_hex, AttachmentContent, AttachmentStore, CatalogStore, PermissionChecker,
    ProjectStore, RolePermissionChecker, UpsertOutcome,
};
