//! Catalog entities: components, releases, packages, projects.
//!
//! Ids are assigned by the store on creation; a draft entity carries an
//! empty id until then.

use super::component_type::CdxComponentType;
use super::identifiers::PackageManager;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Licensing/sourcing classification of a component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComponentKind {
    #[default]
    Oss,
    Cots,
    FreeSoftware,
}

/// An upstream project aggregate owning releases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Component {
    pub id: String,
    pub name: String,
    pub kind: ComponentKind,
    /// Canonical VCS url
    pub vcs: Option<String>,
    pub homepage: Option<String>,
    pub mailing_list: Option<String>,
    pub wiki: Option<String>,
    pub description: Option<String>,
    pub cdx_component_type: Option<CdxComponentType>,
    pub main_license_ids: BTreeSet<String>,
    pub external_ids: BTreeMap<String, String>,
    pub created_by: Option<String>,
}

impl Component {
    /// Create a draft OSS component.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Produce the next state of this component with newly observed metadata.
    ///
    /// License ids are unioned. Every descriptive field is only filled when it
    /// is currently empty; populated fields are never overwritten.
    #[must_use]
    pub fn merged_with(&self, observed: &ComponentObservation) -> Self {
        let mut main_license_ids = self.main_license_ids.clone();
        main_license_ids.extend(observed.license_ids.iter().cloned());

        Self {
            vcs: fill(&self.vcs, &observed.vcs),
            homepage: fill(&self.homepage, &observed.homepage),
            mailing_list: fill(&self.mailing_list, &observed.mailing_list),
            wiki: fill(&self.wiki, &observed.wiki),
            description: fill(&self.description, &observed.description),
            cdx_component_type: self.cdx_component_type.or(observed.cdx_component_type),
            main_license_ids,
            ..self.clone()
        }
    }
}

fn fill(current: &Option<String>, observed: &Option<String>) -> Option<String> {
    match current {
        Some(value) if !value.trim().is_empty() => Some(value.clone()),
        _ => observed.clone().filter(|v| !v.trim().is_empty()),
    }
}

/// Descriptive metadata gathered from BOM entries for one component.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentObservation {
    pub vcs: Option<String>,
    pub homepage: Option<String>,
    pub mailing_list: Option<String>,
    pub wiki: Option<String>,
    pub description: Option<String>,
    pub cdx_component_type: Option<CdxComponentType>,
    pub license_ids: BTreeSet<String>,
}

impl ComponentObservation {
    /// Combine two observations; values already held by `self` win.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        let mut license_ids = self.license_ids;
        license_ids.extend(other.license_ids);
        Self {
            vcs: fill(&self.vcs, &other.vcs),
            homepage: fill(&self.homepage, &other.homepage),
            mailing_list: fill(&self.mailing_list, &other.mailing_list),
            wiki: fill(&self.wiki, &other.wiki),
            description: fill(&self.description, &other.description),
            cdx_component_type: self.cdx_component_type.or(other.cdx_component_type),
            license_ids,
        }
    }
}

/// Source repository of a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub url: String,
    pub repository_type: Option<RepositoryType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RepositoryType {
    Git,
    Svn,
}

impl Repository {
    /// Build a repository from a raw VCS reference url.
    ///
    /// A trailing `.git` is removed; the type is derived from the host name.
    #[must_use]
    pub fn from_vcs_url(raw: &str) -> Self {
        let url = raw.trim();
        let url = url.strip_suffix(".git").unwrap_or(url).to_string();
        let lower = url.to_lowercase();
        let repository_type = if lower.contains("github") {
            Some(RepositoryType::Git)
        } else if lower.contains("svn") {
            Some(RepositoryType::Svn)
        } else {
            None
        };
        Self {
            url,
            repository_type,
        }
    }
}

/// One version of a component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Release {
    pub id: String,
    pub name: String,
    pub version: String,
    pub component_id: String,
    pub cpe: Option<String>,
    pub external_ids: BTreeMap<String, String>,
    pub repository: Option<Repository>,
    pub main_license_ids: BTreeSet<String>,
    pub other_license_ids: BTreeSet<String>,
    pub creator_department: Option<String>,
}

impl Release {
    /// Create a draft release of a stored component.
    #[must_use]
    pub fn new(component: &Component, version: &str) -> Self {
        Self {
            name: component.name.clone(),
            version: version.trim().to_string(),
            component_id: component.id.clone(),
            ..Self::default()
        }
    }
}

/// A package-manager scoped unit, optionally linked to a release.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Package {
    pub id: String,
    pub name: String,
    pub version: String,
    /// Lower-cased, trimmed package URL
    pub purl: String,
    pub package_type: Option<CdxComponentType>,
    pub package_manager: Option<PackageManager>,
    pub description: Option<String>,
    pub homepage: Option<String>,
    pub vcs: Option<String>,
    pub license_ids: BTreeSet<String>,
    pub release_id: Option<String>,
}

/// How a release is used by a project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReleaseRelationship {
    #[default]
    Unknown,
    Contained,
    Referenced,
    DynamicallyLinked,
    StaticallyLinked,
    Standalone,
    Optional,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MainlineState {
    #[default]
    Open,
    Mainline,
    Specific,
    Phaseout,
    Denied,
}

/// Relationship attached to each project link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectRelationship {
    pub relation: ReleaseRelationship,
    pub mainline_state: MainlineState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttachmentType {
    Sbom,
    Other,
}

/// Attachment metadata recorded on a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub content_id: String,
    pub filename: String,
    pub attachment_type: AttachmentType,
    pub comment: String,
    pub created_by: String,
    pub created_team: Option<String>,
    /// `YYYY-MM-DD`
    pub created_on: String,
    pub sha256: String,
}

/// A project and its links into the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub version: String,
    pub description: String,
    pub business_unit: Option<String>,
    pub release_id_to_usage: BTreeMap<String, ProjectRelationship>,
    pub package_ids: BTreeMap<String, ProjectRelationship>,
    /// Ids of sub-projects
    pub linked_projects: BTreeSet<String>,
    pub attachments: Vec<Attachment>,
}

impl Project {
    #[must_use]
    pub fn versioned_name(&self) -> String {
        super::bom::versioned_name(&self.name, &self.version)
    }

    /// Whether a BOM subject with this name and version describes the project.
    #[must_use]
    pub fn matches(&self, name: &str, version: &str) -> bool {
        self.name.trim().eq_ignore_ascii_case(name.trim())
            && self.version.trim().eq_ignore_ascii_case(version.trim())
    }
}

/// Role ladder used by the permission check, lowest first.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum UserRole {
    #[default]
    User,
    ClearingExpert,
    ClearingAdmin,
    Admin,
}

impl UserRole {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::ClearingExpert => "CLEARING_EXPERT",
            Self::ClearingAdmin => "CLEARING_ADMIN",
            Self::Admin => "ADMIN",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().replace('_', "-").as_str() {
            "user" => Some(Self::User),
            "clearing-expert" => Some(Self::ClearingExpert),
            "clearing-admin" => Some(Self::ClearingAdmin),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The caller of an import or export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub department: Option<String>,
    pub role: UserRole,
}

impl User {
    #[must_use]
    pub fn new(email: impl Into<String>, role: UserRole) -> Self {
        Self {
            email: email.into(),
            department: None,
            role,
        }
    }

    #[must_use]
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }
}
