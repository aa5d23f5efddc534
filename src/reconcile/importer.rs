//! Import orchestration.

use super::batch::BatchResult;
use super::linkage::{link_batch, LinkMode, PriorLinks};
use super::report::{keys, ImportReport};
use super::upsert::CatalogUpserter;
use super::{ImportSummary, RequestStatus};
use crate::catalog::{
    AttachmentContent, AttachmentStore, CatalogStore, PermissionChecker, ProjectStore,
    RolePermissionChecker, UpsertOutcome,
};
use crate::codec::{BomFormat, CycloneDxReader};
use crate::config::{ImportConfig, ReconcileConfig};
use crate::error::{ReconcileError, Result};
use crate::matching::ComponentGrouping;
use crate::model::{
    verify_type_table, versioned_name, Attachment, AttachmentType, BomComponent, BomDocument,
    Project, User, UserRole,
};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

static TIMESTAMP_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[:,\s]").expect("static regex"));

const SBOM_ATTACHMENT_COMMENT: &str = "Auto Generated: Used for importing CycloneDX SBOM.";

/// File name of the report attachment, e.g.
/// `bom.json_ImportStatus_2024-05-01-10-00-00.json`.
#[must_use]
pub fn import_attachment_name(file_name: &str, at: DateTime<Utc>) -> String {
    let stamp = at.format("%Y-%m-%d %H:%M:%S").to_string();
    format!(
        "{file_name}_ImportStatus_{}.json",
        TIMESTAMP_SEPARATORS.replace_all(&stamp, "-")
    )
}

/// One uploaded SBOM.
#[derive(Debug, Clone, Copy)]
pub struct ImportRequest<'r> {
    /// Original file name; its extension selects the format
    pub file_name: &'r str,
    pub content: &'r [u8],
    /// Existing project to import into; a new project is created when absent
    pub project_id: Option<&'r str>,
    pub user: &'r User,
}

/// Imports CycloneDX documents into a catalog and a project.
pub struct BomImporter<'a, C, P, A, R = RolePermissionChecker> {
    catalog: &'a mut C,
    projects: &'a mut P,
    attachments: &'a mut A,
    permissions: R,
    config: ImportConfig,
    required_role: UserRole,
}

impl<'a, C, P, A> BomImporter<'a, C, P, A, RolePermissionChecker>
where
    C: CatalogStore,
    P: ProjectStore,
    A: AttachmentStore,
{
    /// Create an importer. Fails when the component type table is incomplete.
    pub fn new(
        catalog: &'a mut C,
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
            config: config.import.clone(),
            required_role: config.access.required_role,
        })
    }
}

impl<'a, C, P, A, R> BomImporter<'a, C, P, A, R>
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
    ) -> BomImporter<'a, C, P, A, R2> {
        BomImporter {
            catalog: self.catalog,
            projects: self.projects,
            attachments: self.attachments,
            permissions,
            config: self.config,
            required_role: self.required_role,
        }
    }

    /// Import one SBOM. Never fails; every outcome is a summary.
    pub fn import(&mut self, request: &ImportRequest<'_>) -> ImportSummary {
        match self.try_import(request) {
            Ok(summary) => summary,
            Err(err) => {
                match &err {
                    ReconcileError::AccessDenied { .. } => tracing::warn!(
                        "User does not have permission to import the SBOM: {}",
                        request.user.email
                    ),
                    other => {
                        tracing::error!("SBOM import of {} failed: {}", request.file_name, other);
                    }
                }
                ImportSummary::from_error(&err)
            }
        }
    }

    fn try_import(&mut self, request: &ImportRequest<'_>) -> Result<ImportSummary> {
        if !self.permissions.has_role(request.user, self.required_role) {
            return Err(ReconcileError::access_denied(self.required_role.name()));
        }
        let format = BomFormat::from_file_name(request.file_name)?;
        let bom = CycloneDxReader::new().read_bytes(request.content, format)?;
        let Some(subject) = bom.subject() else {
            return Err(ReconcileError::missing_field(
                "metadata.component",
                request.file_name,
            ));
        };
        tracing::info!(
            "Importing {} ({} components) for {}",
            request.file_name,
            bom.components.len(),
            subject.versioned_name()
        );

        let grouping = if self.config.package_mode {
            let grouping = ComponentGrouping::build(
                &bom.components,
                &self.config.non_package_managed_flag(),
            );
            grouping.check_consistency()?;
            Some(grouping)
        } else {
            None
        };

        let project = match self.resolve_project(subject, request)? {
            Resolution::Ready(project) => project,
            Resolution::Rejected(summary) => return Ok(summary),
        };

        let mode = LinkMode::from_do_not_replace(self.config.do_not_replace_package_and_release);
        let prior = PriorLinks::of(&project, mode);
        let (batch, message) = self.reconcile(&bom, grouping.as_ref(), request.user, &prior);

        let now = Utc::now();
        let mut report = ImportReport::from_batch(&project, &batch, grouping.as_ref());
        report.set(keys::MESSAGE, message.clone().unwrap_or_default());
        report.set(keys::RESULT, RequestStatus::Success.as_str());
        report.set(keys::FILE_NAME, request.file_name);

        let mut linked = link_batch(&project, &batch, mode);
        match self.attach(request, format, &report, now) {
            Ok(attachments) => linked.attachments.extend(attachments),
            Err(err) => return Ok(batch_failure(&project, report, &err)),
        }
        if let Err(err) = self.projects.update_project(&linked, request.user) {
            return Ok(batch_failure(&project, report, &err));
        }
        tracing::info!(
            "Project {} updated with {} releases and {} packages",
            linked.id,
            linked.release_id_to_usage.len(),
            linked.package_ids.len()
        );

        Ok(ImportSummary {
            status: RequestStatus::Success,
            message: message.unwrap_or_else(|| {
                format!("SBOM imported into project {}", linked.versioned_name())
            }),
            report: Some(report),
        })
    }

    /// Create the project described by the BOM, or validate the given one.
    fn resolve_project(
        &mut self,
        subject: &BomComponent,
        request: &ImportRequest<'_>,
    ) -> Result<Resolution> {
        let draft = Project {
            name: subject.name.trim().to_string(),
            version: subject.version.as_deref().unwrap_or("").trim().to_string(),
            description: subject.description.as_deref().unwrap_or("").trim().to_string(),
            business_unit: request.user.department.clone(),
            ..Project::default()
        };
        let draft_name = versioned_name(&draft.name, &draft.version);

        let requested = request.project_id.map(str::trim).filter(|id| !id.is_empty());
        if let Some(project_id) = requested {
            let project = self.projects.project(project_id)?;
            if !project.matches(&draft.name, &draft.version) {
                tracing::warn!(
                    "Cannot import SBOM for {} into project {}",
                    draft_name,
                    project.versioned_name()
                );
                let err = ReconcileError::SanityCheck {
                    expected: project.versioned_name(),
                    found: draft_name.clone(),
                };
                return Ok(Resolution::Rejected(ImportSummary {
                    status: RequestStatus::FailedSanityCheck,
                    message: err.to_string(),
                    report: Some(ImportReport::for_project(None, &draft_name)),
                }));
            }
            tracing::info!("Reusing existing project: {}", project_id);
            return Ok(Resolution::Ready(project));
        }

        match self.projects.add_project(&draft, request.user)? {
            UpsertOutcome::Created(id) => {
                tracing::info!("Project created successfully: {}", id);
                Ok(Resolution::Ready(self.projects.project(&id)?))
            }
            UpsertOutcome::Existing(id) => {
                tracing::warn!("Cannot import SBOM as new project, {} already exists", id);
                Ok(Resolution::Rejected(ImportSummary {
                    status: RequestStatus::Duplicate,
                    message: format!("Project {draft_name} already exists"),
                    report: Some(ImportReport::for_project(Some(&id), &draft_name)),
                }))
            }
            UpsertOutcome::Ambiguous | UpsertOutcome::Invalid(_) => {
                Ok(Resolution::Rejected(ImportSummary {
                    status: RequestStatus::Failure,
                    message: "Invalid project metadata present in SBOM or multiple projects with the same name and version exist!".to_string(),
                    report: None,
                }))
            }
        }
    }

    /// Run the catalog upserts. Returns the batch and, for partially
    /// VCS-less BOMs, the report message.
    fn reconcile(
        &mut self,
        bom: &BomDocument,
        grouping: Option<&ComponentGrouping>,
        user: &User,
        prior: &PriorLinks,
    ) -> (BatchResult, Option<String>) {
        let mut upserter = CatalogUpserter::new(&mut *self.catalog, user, prior);
        let mut batch = BatchResult::new();

        let Some(grouping) = grouping else {
            for member in &bom.components {
                batch.merge(upserter.upsert_release_only(member));
            }
            return (batch, None);
        };

        for group in grouping.groups.values() {
            batch.merge(upserter.upsert_group(group));
        }
        for member in &grouping.non_package_managed {
            batch.merge(upserter.upsert_release_only(member));
        }
        if grouping.is_pure() {
            return (batch, None);
        }

        for member in &grouping.without_vcs {
            let result = upserter.upsert_vcs_less_package(member, &batch.release_ids);
            // Only entries that became packages are reported as VCS-less components.
            if !result.package_ids.is_empty() {
                batch.invalid_components.insert(member.versioned_name());
            }
            batch.merge(result);
        }
        let message = format!(
            "VCS information is missing for {} / {} Components!",
            grouping.without_vcs.len(),
            grouping.total_components
        );
        tracing::warn!("{}", message);
        (batch, Some(message))
    }

    /// Store the configured attachments and describe them for the project.
    fn attach(
        &mut self,
        request: &ImportRequest<'_>,
        format: BomFormat,
        report: &ImportReport,
        now: DateTime<Utc>,
    ) -> Result<Vec<Attachment>> {
        let mut attachments = Vec::new();
        let created_on = now.format("%Y-%m-%d").to_string();
        let describe = |content: AttachmentContent,
                        attachment_type: AttachmentType,
                        comment: String| Attachment {
            content_id: content.content_id,
            filename: content.filename,
            attachment_type,
            comment,
            created_by: request.user.email.clone(),
            created_team: request.user.department.clone(),
            created_on: created_on.clone(),
            sha256: content.sha256,
        };

        if self.config.attach_sbom {
            let content =
                self.attachments
                    .store(request.file_name, format.content_type(), request.content)?;
            attachments.push(describe(
                content,
                AttachmentType::Sbom,
                SBOM_ATTACHMENT_COMMENT.to_string(),
            ));
        }
        if self.config.attach_import_report {
            let name = import_attachment_name(request.file_name, now);
            let json = report.to_json()?;
            let content = self
                .attachments
                .store(&name, "application/json", json.as_bytes())?;
            attachments.push(describe(
                content,
                AttachmentType::Other,
                format!(
                    "Auto Generated: CycloneDX SBOM import result for: '{}'",
                    request.file_name
                ),
            ));
        }
        Ok(attachments)
    }
}

enum Resolution {
    Ready(Project),
    Rejected(ImportSummary),
}

/// Summary for a failed final project update; catalog writes already
/// committed remain in the report.
fn batch_failure(project: &Project, mut report: ImportReport, err: &ReconcileError) -> ImportSummary {
    let err = ReconcileError::BatchPersistence {
        project_id: project.id.clone(),
        message: err.to_string(),
    };
    tracing::error!("{}", err);
    report.set(keys::RESULT, RequestStatus::Failure.as_str());
    ImportSummary {
        status: RequestStatus::Failure,
        message: err.to_string(),
        report: Some(report),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_import_attachment_name() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 30).unwrap();
        assert_eq!(
            import_attachment_name("bom.cdx.json", at),
            "bom.cdx.json_ImportStatus_2024-05-01-10-00-30.json"
        );
    }
}
