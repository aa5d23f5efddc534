//! Collaborator ports of the reconciliation engine.
//!
//! The engine talks to catalog, project, attachment and permission services
//! only through these traits. Adapters live next to this module.

use crate::error::Result;
use crate::model::{Component, Package, Project, Release, User, UserRole};
use sha2::{Digest, Sha256};

/// Outcome of a find-or-create call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// A new entity was stored under this id
    Created(String),
    /// Exactly one matching entity already existed
    Existing(String),
    /// More than one entity matched
    Ambiguous,
    /// The candidate was rejected
    Invalid(String),
}

impl UpsertOutcome {
    /// Id of the created or existing entity.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Created(id) | Self::Existing(id) => Some(id),
            Self::Ambiguous | Self::Invalid(_) => None,
        }
    }
}

/// Component, release and package storage.
///
/// Name and purl comparisons are case-insensitive. Fetching an unknown id is
/// a storage error.
pub trait CatalogStore {
    /// Components whose name matches case-insensitively.
    fn components_by_name(&self, name: &str) -> Result<Vec<Component>>;

    fn component(&self, id: &str) -> Result<Component>;

    /// Store a component unless one with the same name exists.
    fn add_component(&mut self, component: &Component, user: &User) -> Result<UpsertOutcome>;

    fn update_component(&mut self, component: &Component, user: &User) -> Result<()>;

    fn release(&self, id: &str) -> Result<Release>;

    /// Store a release unless the component already has one with the same
    /// name and version.
    fn add_release(&mut self, release: &Release, user: &User) -> Result<UpsertOutcome>;

    fn update_release(&mut self, release: &Release, user: &User) -> Result<()>;

    fn package(&self, id: &str) -> Result<Package>;

    /// Packages with this name and version.
    fn packages_by_name_and_version(&self, name: &str, version: &str) -> Result<Vec<Package>>;

    /// Store a package unless one with the same purl, or failing that the
    /// same name and version, exists.
    fn add_package(&mut self, package: &Package, user: &User) -> Result<UpsertOutcome>;

    fn update_package(&mut self, package: &Package, user: &User) -> Result<()>;
}

/// Project storage.
pub trait ProjectStore {
    fn project(&self, id: &str) -> Result<Project>;

    /// Store a project unless one with the same name and version exists.
    fn add_project(&mut self, project: &Project, user: &User) -> Result<UpsertOutcome>;

    fn update_project(&mut self, project: &Project, user: &User) -> Result<()>;
}

/// Stored attachment bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentContent {
    pub content_id: String,
    pub filename: String,
    /// Hex-encoded SHA-256 of the bytes
    pub sha256: String,
}

/// Binary attachment storage.
pub trait AttachmentStore {
    fn store(&mut self, filename: &str, content_type: &str, bytes: &[u8])
        -> Result<AttachmentContent>;

    fn read(&self, content_id: &str) -> Result<Vec<u8>>;
}

/// Role check for the caller of an import or export.
pub trait PermissionChecker {
    fn has_role(&self, user: &User, required: UserRole) -> bool;
}

/// Grants access when the user's role is at least the required one.
#[derive(Debug, Clone, Copy, Default)]
pub struct RolePermissionChecker;

impl PermissionChecker for RolePermissionChecker {
    fn has_role(&self, user: &User, required: UserRole) -> bool {
        user.role >= required
    }
}

/// Hex-encoded SHA-256 digest.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
