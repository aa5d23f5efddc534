//! Export orchestration.

use super::assembler::BomAssembler;
use super::license::LicenseNormalizer;
use super::mapper::ComponentMapper;
use super::ExportSummary;
use crate::catalog::{
    AttachmentStore, CatalogStore, PermissionChecker, ProjectStore, RolePermissionChecker,
};
use crate::codec::{write_bom, BomFormat};
use crate::config::{ExportConfig, ReconcileConfig, ToolConfig};
use crate::error::{ReconcileError, Result};
use crate::model::{
    verify_type_table, Attachment, AttachmentType, BomComponent, Component, Project, Release,
    User, UserRole,
};
use crate::reconcile::RequestStatus;
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::collections::{BTreeSet, HashSet};

/// One export call.
#[derive(Debug, Clone, Copy)]
pub struct ExportRequest<'r> {
    pub project_id: &'r str,
    pub format: BomFormat,
    pub user: &'r User,
}

/// Release and package ids reachable from a project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkedIds {
    pub release_ids: BTreeSet<String>,
    pub package_ids: BTreeSet<String>,
}

impl LinkedIds {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.release_ids.is_empty() && self.package_ids.is_empty()
    }

    fn add(&mut self, project: &Project) {
        self.release_ids
            .extend(project.release_id_to_usage.keys().cloned());
        self.package_ids.extend(project.package_ids.keys().cloned());
    }
}

/// Links of `root`, plus those of its sub-projects when `recursive` is set.
///
/// Each project is visited once, so cyclic project links terminate.
/// Sub-projects that cannot be loaded are skipped.
pub fn collect_linked_ids<P: ProjectStore + ?Sized>(
    projects: &P,
    root: &Project,
    recursive: bool,
) -> LinkedIds {
    let mut ids = LinkedIds::default();
    ids.add(root);
    if !recursive {
        return ids;
    }

    let mut visited = HashSet::from([root.id.clone()]);
    let mut pending: Vec<String> = root.linked_projects.iter().cloned().collect();
    while let Some(id) = pending.pop() {
        if !visited.insert(id.clone()) {
            continue;
        }
        match projects.project(&id) {
            Ok(sub) => {
                ids.add(&sub);
                pending.extend(
                    sub.linked_projects
                        .iter()
                        .filter(|linked| !visited.contains(*linked))
                        .cloned(),
                );
            }
            Err(err) => tracing::warn!("Skipping sub-project {}: {}", id, err),
        }
    }
    ids
}

/// Exports projects as CycloneDX documents.
pub struct BomExporter<'a, C, P, A, R = RolePermissionChecker> {
    catalog: &'a C,
    projects: &'a mut P,
    attachments: &'a mut A,
    permissions: R,
    config: ExportConfig,
    tool: ToolConfig,
    package_mode: bool,
    required_role: UserRole,
}

impl<'a, C, P, A> BomExporter<'a, C, P, A, RolePermissionChecker>
where
    C: CatalogStore,
    P: ProjectStore,
    A: AttachmentStore,
{
    /// Create an exporter. Fails when the component type table is incomplete.
    pub fn new(
        catalog: &'a C,
        projects: &'a mut P,
        attachments: &'a mut A,
        config: &ReconcileConfig,
    ) -> Result<Self> {
        verify_type_table()?;
        Ok(Self {
            catalog,
            projects,
            attachments,
            permissions: RolePermissionChecker,
            config: config.export.clone(),
            tool: config.tool.clone(),
            package_mode: config.import.package_mode,
            required_role: config.access.required_role,
        })
    }
}

impl<'a, C, P, A, R> BomExporter<'a, C, P, A, R>
where
    C: CatalogStore,
    P: ProjectStore,
    A: AttachmentStore,
    R: PermissionChecker,
{
    /// Use another permission checker.
    pub fn with_permissions<R2: PermissionChecker>(
        self,
        permissions: R2,
    ) -> BomExporter<'a, C, P, A, R2> {
        BomExporter {
            catalog: self.catalog,
            projects: self.projects,
            attachments: self.attachments,
            permissions,
            config: self.config,
            tool: self.tool,
            package_mode: self.package_mode,
            required_role: self.required_role,
        }
    }

    /// Export one project. Never fails; every outcome is a summary.
    pub fn export(&mut self, request: &ExportRequest<'_>) -> ExportSummary {
        match self.try_export(request) {
            Ok(summary) => summary,
            Err(err) => {
                match &err {
                    ReconcileError::AccessDenied { .. } => tracing::warn!(
                        "User does not have permission to export the SBOM: {}",
                        request.user.email
                    ),
                    other => tracing::error!(
                        "SBOM export of project {} failed: {}",
                        request.project_id,
                        other
                    ),
                }
                ExportSummary::from_error(&err, request.format)
            }
        }
    }

    fn try_export(&mut self, request: &ExportRequest<'_>) -> Result<ExportSummary> {
        if !self.permissions.has_role(request.user, self.required_role) {
            return Err(ReconcileError::access_denied(self.required_role.name()));
        }
        let project_id = request.project_id.trim();
        if project_id.is_empty() {
            return Err(ReconcileError::validation("project id must not be empty"));
        }
        let project = self.projects.project(project_id)?;

        let linked = collect_linked_ids(&*self.projects, &project, self.config.include_sub_projects);
        if linked.is_empty() {
            tracing::warn!(
                "Project {} has no linked releases or packages",
                project.versioned_name()
            );
            return Ok(ExportSummary {
                status: RequestStatus::FailedSanityCheck,
                message: format!(
                    "Project {} has no linked releases or packages",
                    project.versioned_name()
                ),
                format: request.format,
                content: None,
            });
        }

        let components = self.components(&linked)?;
        tracing::info!(
            "Exporting {} components of project {}",
            components.len(),
            project.versioned_name()
        );

        let now = Utc::now();
        let assembler = BomAssembler::new(self.tool.clone(), self.config.spec_version.clone());
        let document = assembler.assemble(&project, request.user, components, now);
        let content = write_bom(&document, request.format)?;

        if self.config.attach_to_project {
            self.attach(&project, request, &content, now)?;
        }

        Ok(ExportSummary {
            status: RequestStatus::Success,
            message: format!("SBOM exported for project {}", project.versioned_name()),
            format: request.format,
            content: Some(content),
        })
    }

    /// Mapped components: packages first (package mode only), then the
    /// releases no exported package points at.
    fn components(&self, linked: &LinkedIds) -> Result<Vec<BomComponent>> {
        let mapper = ComponentMapper::new(LicenseNormalizer::new(self.config.strict_spdx_licenses));

        let mut packages = Vec::new();
        if self.package_mode {
            for id in &linked.package_ids {
                packages.push(self.catalog.package(id)?);
            }
        }
        let covered: BTreeSet<&str> = packages
            .iter()
            .filter_map(|p| p.release_id.as_deref())
            .collect();

        let mut releases: Vec<(Release, Option<Component>)> = Vec::new();
        for id in linked.release_ids.iter().filter(|id| !covered.contains(id.as_str())) {
            let release = self.catalog.release(id)?;
            let component = match self.catalog.component(&release.component_id) {
                Ok(component) => Some(component),
                Err(err) => {
                    tracing::warn!("Component of release {} not found: {}", release.id, err);
                    None
                }
            };
            releases.push((release, component));
        }

        let mut components: Vec<BomComponent> =
            packages.par_iter().map(|p| mapper.map_package(p)).collect();
        components.par_extend(
            releases
                .par_iter()
                .map(|(release, component)| mapper.map_release(release, component.as_ref())),
        );
        Ok(components)
    }

    fn attach(
        &mut self,
        project: &Project,
        request: &ExportRequest<'_>,
        content: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let file_name = export_attachment_name(project, request.format);
        let stored = self
            .attachments
            .store(&file_name, request.format.content_type(), content.as_bytes())?;

        let mut updated = project.clone();
        updated.attachments.push(Attachment {
            content_id: stored.content_id,
            filename: stored.filename,
            attachment_type: AttachmentType::Sbom,
            comment: format!(
                "Auto Generated: CycloneDX SBOM export of '{}'",
                project.versioned_name()
            ),
            created_by: request.user.email.clone(),
            created_team: request.user.department.clone(),
            created_on: now.format("%Y-%m-%d").to_string(),
            sha256: stored.sha256,
        });
        self.projects
            .update_project(&updated, request.user)
            .map_err(|err| ReconcileError::BatchPersistence {
                project_id: project.id.clone(),
                message: err.to_string(),
            })?;
        tracing::info!("Attached {} to project {}", file_name, project.id);
        Ok(())
    }
}

/// File name of an exported document attached to its project.
#[must_use]
pub fn export_attachment_name(project: &Project, format: BomFormat) -> String {
    let stem: String = format!("{}_{}", project.name.trim(), project.version.trim())
        .chars()
        .map(|c| if c.is_whitespace() || c == '/' { '_' } else { c })
        .collect();
    format!("{stem}_SBOM.cdx.{}", format.extension())
}
