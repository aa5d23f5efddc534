//! In-memory adapters for the collaborator ports.
//!
//! Entities are kept in insertion order so that iteration, snapshots and
//! test assertions are deterministic.

use super::traits::{
    sha256_hex, AttachmentContent, AttachmentStore, CatalogStore, ProjectStore, UpsertOutcome,
};
use crate::error::{ReconcileError, Result};
use crate::matching::ParsedPurl;
use crate::model::{Component, Package, Project, Release, User};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

fn same(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Outcome for a list of matching ids.
fn match_outcome(matches: &[&String]) -> Option<UpsertOutcome> {
    match matches {
        [] => None,
        [id] => Some(UpsertOutcome::Existing((*id).clone())),
        _ => Some(UpsertOutcome::Ambiguous),
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Catalog held in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InMemoryCatalog {
    components: IndexMap<String, Component>,
    releases: IndexMap<String, Release>,
    packages: IndexMap<String, Package>,
}

impl InMemoryCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a component as-is, bypassing duplicate detection. A missing id
    /// is assigned. Returns the id.
    pub fn insert_component(&mut self, mut component: Component) -> String {
        if component.id.is_empty() {
            component.id = new_id();
        }
        let id = component.id.clone();
        self.components.insert(id.clone(), component);
        id
    }

    /// Store a release as-is, bypassing duplicate detection. Returns the id.
    pub fn insert_release(&mut self, mut release: Release) -> String {
        if release.id.is_empty() {
            release.id = new_id();
        }
        let id = release.id.clone();
        self.releases.insert(id.clone(), release);
        id
    }

    /// Store a package as-is, bypassing duplicate detection. Returns the id.
    pub fn insert_package(&mut self, mut package: Package) -> String {
        if package.id.is_empty() {
            package.id = new_id();
        }
        let id = package.id.clone();
        self.packages.insert(id.clone(), package);
        id
    }

    pub fn components(&self) -> impl Iterator<Item = &Component> + '_ {
        self.components.values()
    }

    pub fn releases(&self) -> impl Iterator<Item = &Release> + '_ {
        self.releases.values()
    }

    pub fn packages(&self) -> impl Iterator<Item = &Package> + '_ {
        self.packages.values()
    }
}

impl CatalogStore for InMemoryCatalog {
    fn components_by_name(&self, name: &str) -> Result<Vec<Component>> {
        Ok(self
            .components
            .values()
            .filter(|c| same(&c.name, name))
            .cloned()
            .collect())
    }

    fn component(&self, id: &str) -> Result<Component> {
        self.components
            .get(id)
            .cloned()
            .ok_or_else(|| ReconcileError::storage(format!("component {id} not found")))
    }

    fn add_component(&mut self, component: &Component, user: &User) -> Result<UpsertOutcome> {
        if component.name.trim().is_empty() {
            return Ok(UpsertOutcome::Invalid("component name is empty".to_string()));
        }
        let matches: Vec<&String> = self
            .components
            .values()
            .filter(|c| same(&c.name, &component.name))
            .map(|c| &c.id)
            .collect();
        if let Some(outcome) = match_outcome(&matches) {
            return Ok(outcome);
        }

        let id = self.insert_component(Component {
            id: String::new(),
            name: component.name.trim().to_string(),
            created_by: Some(user.email.clone()),
            ..component.clone()
        });
        Ok(UpsertOutcome::Created(id))
    }

    fn update_component(&mut self, component: &Component, _user: &User) -> Result<()> {
        let slot = self.components.get_mut(&component.id).ok_or_else(|| {
            ReconcileError::storage(format!("component {} not found", component.id))
        })?;
        *slot = component.clone();
        Ok(())
    }

    fn release(&self, id: &str) -> Result<Release> {
        self.releases
            .get(id)
            .cloned()
            .ok_or_else(|| ReconcileError::storage(format!("release {id} not found")))
    }

    fn add_release(&mut self, release: &Release, _user: &User) -> Result<UpsertOutcome> {
        if release.name.trim().is_empty() || release.version.trim().is_empty() {
            return Ok(UpsertOutcome::Invalid(
                "release name and version are required".to_string(),
            ));
        }
        if !self.components.contains_key(&release.component_id) {
            return Ok(UpsertOutcome::Invalid(format!(
                "unknown component {}",
                release.component_id
            )));
        }
        let matches: Vec<&String> = self
            .releases
            .values()
            .filter(|r| {
                r.component_id == release.component_id
                    && same(&r.name, &release.name)
                    && same(&r.version, &release.version)
            })
            .map(|r| &r.id)
            .collect();
        if let Some(outcome) = match_outcome(&matches) {
            return Ok(outcome);
        }

        let id = self.insert_release(Release {
            id: String::new(),
            ..release.clone()
        });
        Ok(UpsertOutcome::Created(id))
    }

    fn update_release(&mut self, release: &Release, _user: &User) -> Result<()> {
        let slot = self
            .releases
            .get_mut(&release.id)
            .ok_or_else(|| ReconcileError::storage(format!("release {} not found", release.id)))?;
        *slot = release.clone();
        Ok(())
    }

    fn package(&self, id: &str) -> Result<Package> {
        self.packages
            .get(id)
            .cloned()
            .ok_or_else(|| ReconcileError::storage(format!("package {id} not found")))
    }

    fn packages_by_name_and_version(&self, name: &str, version: &str) -> Result<Vec<Package>> {
        Ok(self
            .packages
            .values()
            .filter(|p| same(&p.name, name) && same(&p.version, version))
            .cloned()
            .collect())
    }

    fn add_package(&mut self, package: &Package, _user: &User) -> Result<UpsertOutcome> {
        if package.name.trim().is_empty() || package.version.trim().is_empty() {
            return Ok(UpsertOutcome::Invalid(
                "package name and version are required".to_string(),
            ));
        }
        let Some(purl) = ParsedPurl::parse(&package.purl) else {
            return Ok(UpsertOutcome::Invalid(format!(
                "invalid purl '{}'",
                package.purl
            )));
        };
        if purl.package_manager().is_none() {
            return Ok(UpsertOutcome::Invalid(format!(
                "unknown package manager '{}'",
                purl.purl_type
            )));
        }

        let by_purl: Vec<&String> = self
            .packages
            .values()
            .filter(|p| same(&p.purl, &purl.purl))
            .map(|p| &p.id)
            .collect();
        if let Some(outcome) = match_outcome(&by_purl) {
            return Ok(outcome);
        }
        let by_name: Vec<&String> = self
            .packages
            .values()
            .filter(|p| same(&p.name, &package.name) && same(&p.version, &package.version))
            .map(|p| &p.id)
            .collect();
        if let Some(outcome) = match_outcome(&by_name) {
            return Ok(outcome);
        }

        let id = self.insert_package(Package {
            id: String::new(),
            purl: purl.purl,
            ..package.clone()
        });
        Ok(UpsertOutcome::Created(id))
    }

    fn update_package(&mut self, package: &Package, _user: &User) -> Result<()> {
        let slot = self
            .packages
            .get_mut(&package.id)
            .ok_or_else(|| ReconcileError::storage(format!("package {} not found", package.id)))?;
        *slot = package.clone();
        Ok(())
    }
}

// ============================================================================
// Projects
// ============================================================================

/// Projects held in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InMemoryProjects {
    projects: IndexMap<String, Project>,
}

impl InMemoryProjects {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a project as-is. A missing id is assigned. Returns the id.
    pub fn insert_project(&mut self, mut project: Project) -> String {
        if project.id.is_empty() {
            project.id = new_id();
        }
        let id = project.id.clone();
        self.projects.insert(id.clone(), project);
        id
    }

    pub fn projects(&self) -> impl Iterator<Item = &Project> + '_ {
        self.projects.values()
    }
}

impl ProjectStore for InMemoryProjects {
    fn project(&self, id: &str) -> Result<Project> {
        self.projects
            .get(id)
            .cloned()
            .ok_or_else(|| ReconcileError::storage(format!("project {id} not found")))
    }

    fn add_project(&mut self, project: &Project, _user: &User) -> Result<UpsertOutcome> {
        if project.name.trim().is_empty() {
            return Ok(UpsertOutcome::Invalid("project name is empty".to_string()));
        }
        let matches: Vec<&String> = self
            .projects
            .values()
            .filter(|p| p.matches(&project.name, &project.version))
            .map(|p| &p.id)
            .collect();
        if let Some(outcome) = match_outcome(&matches) {
            return Ok(outcome);
        }

        let id = self.insert_project(Project {
            id: String::new(),
            ..project.clone()
        });
        Ok(UpsertOutcome::Created(id))
    }

    fn update_project(&mut self, project: &Project, _user: &User) -> Result<()> {
        let slot = self
            .projects
            .get_mut(&project.id)
            .ok_or_else(|| ReconcileError::storage(format!("project {} not found", project.id)))?;
        *slot = project.clone();
        Ok(())
    }
}

// ============================================================================
// Attachments
// ============================================================================

/// Attachment bytes held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAttachments {
    contents: HashMap<String, Vec<u8>>,
}

impl InMemoryAttachments {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.contents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }
}

impl AttachmentStore for InMemoryAttachments {
    fn store(
        &mut self,
        filename: &str,
        _content_type: &str,
        bytes: &[u8],
    ) -> Result<AttachmentContent> {
        let content_id = new_id();
        self.contents.insert(content_id.clone(), bytes.to_vec());
        Ok(AttachmentContent {
            content_id,
            filename: filename.to_string(),
            sha256: sha256_hex(bytes),
        })
    }

    fn read(&self, content_id: &str) -> Result<Vec<u8>> {
        self.contents
            .get(content_id)
            .cloned()
            .ok_or_else(|| ReconcileError::storage(format!("attachment {content_id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UserRole;

    fn user() -> User {
        User::new("dev@example.org", UserRole::User)
    }

    #[test]
    fn test_component_upsert() {
        let mut catalog = InMemoryCatalog::new();
        let first = catalog.add_component(&Component::new("Foo"), &user()).unwrap();
        let UpsertOutcome::Created(id) = first else {
            panic!("expected creation, got {first:?}");
        };
        assert_eq!(catalog.component(&id).unwrap().created_by.as_deref(), Some("dev@example.org"));

        let again = catalog.add_component(&Component::new("foo"), &user()).unwrap();
        assert_eq!(again, UpsertOutcome::Existing(id));

        catalog.insert_component(Component::new("FOO"));
        let ambiguous = catalog.add_component(&Component::new("foo"), &user()).unwrap();
        assert_eq!(ambiguous, UpsertOutcome::Ambiguous);

        let invalid = catalog.add_component(&Component::new("  "), &user()).unwrap();
        assert!(matches!(invalid, UpsertOutcome::Invalid(_)));
    }

    #[test]
    fn test_release_requires_known_component_and_version() {
        let mut catalog = InMemoryCatalog::new();
        let component_id = catalog.insert_component(Component::new("foo"));
        let component = catalog.component(&component_id).unwrap();

        let release = Release::new(&component, "1.0");
        let created = catalog.add_release(&release, &user()).unwrap();
        assert!(matches!(created, UpsertOutcome::Created(_)));
        assert_eq!(
            catalog.add_release(&release, &user()).unwrap().id(),
            created.id()
        );

        let no_version = Release::new(&component, "");
        assert!(matches!(
            catalog.add_release(&no_version, &user()).unwrap(),
            UpsertOutcome::Invalid(_)
        ));

        let orphan = Release {
            component_id: "missing".to_string(),
            ..release
        };
        assert!(matches!(
            catalog.add_release(&orphan, &user()).unwrap(),
            UpsertOutcome::Invalid(_)
        ));
    }

    #[test]
    fn test_package_matches_purl_case_insensitively() {
        let mut catalog = InMemoryCatalog::new();
        let package = Package {
            name: "foo".to_string(),
            version: "1.0.0".to_string(),
            purl: "pkg:npm/foo@1.0.0".to_string(),
            ..Package::default()
        };
        let created = catalog.add_package(&package, &user()).unwrap();

        let shouting = Package {
            purl: "PKG:NPM/FOO@1.0.0".to_string(),
            ..package.clone()
        };
        let existing = catalog.add_package(&shouting, &user()).unwrap();
        assert_eq!(existing, UpsertOutcome::Existing(created.id().unwrap().to_string()));

        let bad_purl = Package {
            purl: "npm:foo".to_string(),
            ..package.clone()
        };
        assert!(matches!(
            catalog.add_package(&bad_purl, &user()).unwrap(),
            UpsertOutcome::Invalid(_)
        ));

        let unknown_type = Package {
            purl: "pkg:nosuchtype/foo@1.0.0".to_string(),
            ..package
        };
        assert!(matches!(
            catalog.add_package(&unknown_type, &user()).unwrap(),
            UpsertOutcome::Invalid(_)
        ));
    }

    #[test]
    fn test_update_unknown_entity_is_storage_error() {
        let mut catalog = InMemoryCatalog::new();
        let ghost = Component {
            id: "ghost".to_string(),
            ..Component::new("ghost")
        };
        assert!(matches!(
            catalog.update_component(&ghost, &user()),
            Err(ReconcileError::Storage { .. })
        ));
    }

    #[test]
    fn test_project_duplicates() {
        let mut projects = InMemoryProjects::new();
        let project = Project {
            name: "Demo".to_string(),
            version: "1.0".to_string(),
            ..Project::default()
        };
        let created = projects.add_project(&project, &user()).unwrap();
        let dup = projects
            .add_project(
                &Project {
                    name: "demo".to_string(),
                    ..project
                },
                &user(),
            )
            .unwrap();
        assert_eq!(dup, UpsertOutcome::Existing(created.id().unwrap().to_string()));
    }

    #[test]
    fn test_attachment_round_trip() {
        let mut store = InMemoryAttachments::new();
        let content = store.store("bom.json", "application/json", b"{}").unwrap();
        assert_eq!(store.read(&content.content_id).unwrap(), b"{}");
        assert_eq!(content.sha256, sha256_hex(b"{}"));
        assert!(store.read("missing").is_err());
    }
}
