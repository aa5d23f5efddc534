//! Import tests against the fixture BOMs.

use sbom_reconcile::catalog::{
    AttachmentStore, CatalogStore, InMemoryAttachments, InMemoryCatalog, InMemoryProjects,
    ProjectStore, UpsertOutcome,
};
use sbom_reconcile::error::{ReconcileError, Result};
use sbom_reconcile::model::{
    AttachmentType, Component, Package, Project, Release, RepositoryType, User, UserRole,
    PACKAGE_URL_KEY,
};
use sbom_reconcile::reconcile::{default_relation, keys};
use sbom_reconcile::{
    BomImporter, ImportReport, ImportRequest, ImportSummary, ReconcileConfig, RequestStatus,
};

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn fixture(name: &str) -> Vec<u8> {
    std::fs::read(format!("{FIXTURES_DIR}/{name}")).expect("fixture should exist")
}

fn admin() -> User {
    User::new("admin@example.org", UserRole::Admin).with_department("OSS")
}

/// Catalog, projects and attachments shared across imports.
#[derive(Default)]
struct Workspace {
    catalog: InMemoryCatalog,
    projects: InMemoryProjects,
    attachments: InMemoryAttachments,
}

impl Workspace {
    fn import(&mut self, file_name: &str, project_id: Option<&str>) -> ImportSummary {
        self.import_with(&ReconcileConfig::default(), file_name, project_id, &admin())
    }

    fn import_with(
        &mut self,
        config: &ReconcileConfig,
        file_name: &str,
        project_id: Option<&str>,
        user: &User,
    ) -> ImportSummary {
        let content = fixture(file_name);
        let mut importer = BomImporter::new(
            &mut self.catalog,
            &mut self.projects,
            &mut self.attachments,
            config,
        )
        .unwrap();
        importer.import(&ImportRequest {
            file_name,
            content: &content,
            project_id,
            user,
        })
    }

    fn project_named(&self, name: &str) -> Project {
        self.projects
            .projects()
            .find(|p| p.name == name)
            .cloned()
            .expect("project should exist")
    }

    fn component_named(&self, name: &str) -> Component {
        self.catalog
            .components()
            .find(|c| c.name == name)
            .cloned()
            .expect("component should exist")
    }

    fn package_named(&self, name: &str) -> Package {
        self.catalog
            .packages()
            .find(|p| p.name == name)
            .cloned()
            .expect("package should exist")
    }
}

fn report(summary: &ImportSummary) -> &ImportReport {
    summary.report.as_ref().expect("report should be present")
}

#[test]
fn test_package_mode_import_creates_catalog_entries() {
    let mut ws = Workspace::default();
    let summary = ws.import("package-mode.cdx.json", None);

    assert_eq!(summary.status, RequestStatus::Success, "{}", summary.message);
    assert_eq!(summary.message, "SBOM imported into project demo-app (1.0.0)");

    let report = report(&summary);
    assert_eq!(report.count(keys::COMP_CREATION_COUNT), Some(3));
    assert_eq!(report.count(keys::COMP_REUSE_COUNT), Some(0));
    assert_eq!(report.count(keys::REL_CREATION_COUNT), Some(3));
    // foo-cli meets the release foo-core just created.
    assert_eq!(report.count(keys::REL_REUSE_COUNT), Some(1));
    assert_eq!(report.count(keys::PKG_CREATION_COUNT), Some(3));
    assert_eq!(report.count(keys::PKG_REUSE_COUNT), Some(0));
    assert_eq!(report.count(keys::COMP_IMPORT_ERROR_COUNT), Some(0));
    assert_eq!(report.get(keys::RESULT), Some("SUCCESS"));
    assert_eq!(report.get(keys::FILE_NAME), Some("package-mode.cdx.json"));
    assert_eq!(report.get(keys::PROJECT_NAME), Some("demo-app (1.0.0)"));

    assert_eq!(ws.catalog.components().count(), 3);
    assert_eq!(ws.catalog.releases().count(), 3);
    assert_eq!(ws.catalog.packages().count(), 3);

    let project = ws.project_named("demo-app");
    assert_eq!(project.description, "Demo application");
    assert_eq!(project.business_unit.as_deref(), Some("OSS"));
    assert_eq!(project.release_id_to_usage.len(), 3);
    assert_eq!(project.package_ids.len(), 3);
    assert!(project
        .release_id_to_usage
        .values()
        .all(|relation| *relation == default_relation()));
    assert_eq!(report.get(keys::PROJECT_ID), Some(project.id.as_str()));
}

#[test]
fn test_group_component_collects_member_metadata() {
    let mut ws = Workspace::default();
    ws.import("package-mode.cdx.json", None);

    let foo = ws.component_named("foo");
    assert_eq!(foo.vcs.as_deref(), Some("https://github.com/acme/foo"));
    assert_eq!(foo.homepage.as_deref(), Some("https://foo.dev"));
    assert!(foo.main_license_ids.contains("MIT"));
    assert!(foo.main_license_ids.contains("Apache-2.0"));
    assert!(!foo
        .main_license_ids
        .iter()
        .any(|id| id.eq_ignore_ascii_case("noassertion")));

    let bar = ws.component_named("bar");
    assert_eq!(bar.vcs.as_deref(), Some("https://gitlab.com/acme/bar"));
    assert_eq!(bar.mailing_list.as_deref(), Some("https://lists.acme.org/bar"));

    // Both foo packages point at the single shared release.
    let core = ws.package_named("foo-core");
    let cli = ws.package_named("foo-cli");
    assert!(core.release_id.is_some());
    assert_eq!(core.release_id, cli.release_id);
    assert_eq!(core.purl, "pkg:npm/foo-core@1.0.0");
    assert_eq!(core.vcs.as_deref(), Some("https://github.com/acme/foo.git"));

    let bar_pkg = ws.package_named("bar");
    assert_eq!(bar_pkg.vcs.as_deref(), Some("https://gitlab.com/acme/bar.git"));

    // The non-package-managed entry becomes a component with one release and no package.
    let vendored = ws.component_named("vendored-lib");
    let releases: Vec<&Release> = ws
        .catalog
        .releases()
        .filter(|r| r.component_id == vendored.id)
        .collect();
    assert_eq!(releases.len(), 1);
    assert_eq!(releases[0].version, "0.9");
    assert!(ws.catalog.packages().all(|p| p.name != "vendored-lib"));
}

#[test]
fn test_reimport_into_same_project_reuses_everything() {
    let mut ws = Workspace::default();
    let first = ws.import("package-mode.cdx.json", None);
    let project_id = report(&first).get(keys::PROJECT_ID).unwrap().to_string();

    let second = ws.import("package-mode.cdx.json", Some(&project_id));
    assert_eq!(second.status, RequestStatus::Success, "{}", second.message);

    let report = report(&second);
    assert_eq!(report.count(keys::COMP_CREATION_COUNT), Some(0));
    assert_eq!(report.count(keys::COMP_REUSE_COUNT), Some(3));
    assert_eq!(report.count(keys::REL_CREATION_COUNT), Some(0));
    assert_eq!(report.count(keys::REL_REUSE_COUNT), Some(3));
    assert_eq!(report.count(keys::PKG_CREATION_COUNT), Some(0));
    assert_eq!(report.count(keys::PKG_REUSE_COUNT), Some(3));

    assert_eq!(ws.catalog.components().count(), 3);
    assert_eq!(ws.catalog.releases().count(), 3);
    assert_eq!(ws.catalog.packages().count(), 3);
    assert_eq!(ws.projects.projects().count(), 1);

    let project = ws.project_named("demo-app");
    assert_eq!(project.release_id_to_usage.len(), 3);
    assert_eq!(project.package_ids.len(), 3);
    assert_eq!(project.attachments.len(), 4);
}

#[test]
fn test_merge_mode_does_not_count_already_linked_entities() {
    let mut ws = Workspace::default();
    let first = ws.import("package-mode.cdx.json", None);
    let project_id = report(&first).get(keys::PROJECT_ID).unwrap().to_string();

    let mut config = ReconcileConfig::default();
    config.import.do_not_replace_package_and_release = true;
    let second = ws.import_with(&config, "package-mode.cdx.json", Some(&project_id), &admin());

    let report = report(&second);
    assert_eq!(report.count(keys::COMP_REUSE_COUNT), Some(3));
    assert_eq!(report.count(keys::REL_REUSE_COUNT), Some(0));
    assert_eq!(report.count(keys::PKG_REUSE_COUNT), Some(0));
}

fn project_with_legacy_link() -> Project {
    let mut project = Project {
        name: "demo-app".to_string(),
        version: "1.0.0".to_string(),
        ..Project::default()
    };
    project
        .release_id_to_usage
        .insert("legacy-release".to_string(), default_relation());
    project
}

#[test]
fn test_replace_mode_drops_previous_links() {
    let mut ws = Workspace::default();
    let project_id = ws.projects.insert_project(project_with_legacy_link());

    let summary = ws.import("package-mode.cdx.json", Some(&project_id));
    assert_eq!(summary.status, RequestStatus::Success, "{}", summary.message);

    let project = ws.projects.project(&project_id).unwrap();
    assert_eq!(project.release_id_to_usage.len(), 3);
    assert!(!project.release_id_to_usage.contains_key("legacy-release"));
}

#[test]
fn test_merge_mode_keeps_previous_links() {
    let mut ws = Workspace::default();
    let project_id = ws.projects.insert_project(project_with_legacy_link());

    let mut config = ReconcileConfig::default();
    config.import.do_not_replace_package_and_release = true;
    let summary = ws.import_with(&config, "package-mode.cdx.json", Some(&project_id), &admin());
    assert_eq!(summary.status, RequestStatus::Success, "{}", summary.message);

    let project = ws.projects.project(&project_id).unwrap();
    assert_eq!(project.release_id_to_usage.len(), 4);
    assert!(project.release_id_to_usage.contains_key("legacy-release"));
}

#[test]
fn test_duplicate_project_is_rejected() {
    let mut ws = Workspace::default();
    let first = ws.import("package-mode.cdx.json", None);
    let project_id = report(&first).get(keys::PROJECT_ID).unwrap().to_string();

    let second = ws.import("package-mode.cdx.json", None);
    assert_eq!(second.status, RequestStatus::Duplicate);
    assert_eq!(second.message, "Project demo-app (1.0.0) already exists");
    let report = report(&second);
    assert_eq!(report.get(keys::PROJECT_ID), Some(project_id.as_str()));
    assert_eq!(report.get(keys::PROJECT_NAME), Some("demo-app (1.0.0)"));
    assert_eq!(ws.projects.projects().count(), 1);
}

#[test]
fn test_sanity_check_rejects_foreign_bom() {
    let mut ws = Workspace::default();
    let first = ws.import("package-mode.cdx.json", None);
    let project_id = report(&first).get(keys::PROJECT_ID).unwrap().to_string();

    let summary = ws.import("hybrid.cdx.json", Some(&project_id));
    assert_eq!(summary.status, RequestStatus::FailedSanityCheck);
    assert_eq!(report(&summary).get(keys::PROJECT_NAME), Some("demo-hybrid (2.0)"));

    // Nothing from the rejected BOM reaches the catalog.
    assert_eq!(ws.catalog.components().count(), 3);
    assert!(ws.catalog.packages().all(|p| p.name != "leftpad"));
}

#[test]
fn test_unknown_project_id_fails() {
    let mut ws = Workspace::default();
    let summary = ws.import("package-mode.cdx.json", Some("does-not-exist"));
    assert_eq!(summary.status, RequestStatus::Failure);
    assert!(summary.report.is_none());
    assert_eq!(ws.catalog.components().count(), 0);
}

#[test]
fn test_access_denied_reports_required_role() {
    let mut ws = Workspace::default();
    let mut config = ReconcileConfig::default();
    config.access.required_role = UserRole::ClearingAdmin;
    let user = User::new("dev@example.org", UserRole::User);

    let summary = ws.import_with(&config, "package-mode.cdx.json", None, &user);
    assert_eq!(summary.status, RequestStatus::AccessDenied);
    assert_eq!(summary.message, "CLEARING_ADMIN");
    assert_eq!(ws.projects.projects().count(), 0);
    assert!(ws.attachments.is_empty());
}

#[test]
fn test_unsupported_extension_fails() {
    let mut ws = Workspace::default();
    let content = fixture("package-mode.cdx.json");
    let config = ReconcileConfig::default();
    let user = admin();
    let mut importer =
        BomImporter::new(&mut ws.catalog, &mut ws.projects, &mut ws.attachments, &config).unwrap();
    let summary = importer.import(&ImportRequest {
        file_name: "bom.txt",
        content: &content,
        project_id: None,
        user: &user,
    });

    assert_eq!(summary.status, RequestStatus::Failure);
    assert_eq!(
        summary.message,
        "Invalid file format txt. Only XML & JSON SBOM are supported by CycloneDX!"
    );
}

#[test]
fn test_missing_subject_fails_without_project() {
    let mut ws = Workspace::default();
    let summary = ws.import("no-subject.cdx.json", None);
    assert_eq!(summary.status, RequestStatus::Failure);
    assert_eq!(ws.projects.projects().count(), 0);
}

#[test]
fn test_multiple_vcs_per_component_aborts() {
    let mut ws = Workspace::default();
    let summary = ws.import("multi-vcs.cdx.json", None);
    assert_eq!(summary.status, RequestStatus::Failure);
    assert!(summary.message.starts_with("SBOM import aborted with error:"));
    assert!(summary
        .message
        .contains("vcs found: 2 and total components: 1"));
    assert_eq!(ws.projects.projects().count(), 0);
    assert_eq!(ws.catalog.components().count(), 0);
}

#[test]
fn test_hybrid_bom_imports_vcs_less_components_as_packages() {
    let mut ws = Workspace::default();
    let summary = ws.import("hybrid.cdx.json", None);

    assert_eq!(summary.status, RequestStatus::Success);
    assert_eq!(summary.message, "VCS information is missing for 3 / 4 Components!");

    let report = report(&summary);
    assert_eq!(report.get(keys::MESSAGE), Some(summary.message.as_str()));
    assert_eq!(report.count(keys::COMP_CREATION_COUNT), Some(1));
    assert_eq!(report.count(keys::REL_CREATION_COUNT), Some(1));
    assert_eq!(report.count(keys::PKG_CREATION_COUNT), Some(3));
    assert_eq!(
        report.list(keys::INVALID_COMPONENT),
        vec!["leftpad (1.0)", "weird (3.0)"]
    );
    assert_eq!(report.list(keys::INVALID_VCS_COMPONENT), vec!["weird"]);
    assert_eq!(report.list(keys::INVALID_PACKAGE), vec!["nopurl (1.0)"]);
    // A rejected package is not also listed as a VCS-less component.
    assert!(!report
        .list(keys::INVALID_COMPONENT)
        .contains(&"nopurl (1.0)"));

    let leftpad = ws.package_named("leftpad");
    assert!(leftpad.release_id.is_none());
    assert!(leftpad.license_ids.contains("WTFPL"));

    let project = ws.project_named("demo-hybrid");
    assert_eq!(project.release_id_to_usage.len(), 1);
    assert_eq!(project.package_ids.len(), 3);
}

#[test]
fn test_vcs_less_package_links_release_of_known_package() {
    let mut ws = Workspace::default();
    ws.import("package-mode.cdx.json", None);
    let foo_release = ws.package_named("foo-core").release_id.unwrap();

    // Without a VCS reference, the package match brings in the known release.
    let content = br#"{
        "bomFormat": "CycloneDX",
        "specVersion": "1.6",
        "metadata": { "component": { "type": "application", "name": "relink", "version": "1" } },
        "components": [
            { "type": "library", "name": "foo-core", "version": "1.0.0", "purl": "pkg:npm/foo-core@1.0.0" }
        ]
    }"#;
    let config = ReconcileConfig::default();
    let user = admin();
    let mut importer =
        BomImporter::new(&mut ws.catalog, &mut ws.projects, &mut ws.attachments, &config).unwrap();
    let summary = importer.import(&ImportRequest {
        file_name: "relink.json",
        content,
        project_id: None,
        user: &user,
    });

    assert_eq!(summary.status, RequestStatus::Success);
    let report = report(&summary);
    assert_eq!(report.count(keys::PKG_REUSE_COUNT), Some(1));
    assert_eq!(report.count(keys::REL_REUSE_COUNT), Some(1));

    let project = ws.project_named("relink");
    assert!(project.release_id_to_usage.contains_key(&foo_release));
}

#[test]
fn test_existing_package_release_is_never_overwritten() {
    let mut ws = Workspace::default();
    ws.catalog.insert_package(Package {
        name: "foo-core".to_string(),
        version: "1.0.0".to_string(),
        purl: "pkg:npm/foo-core@1.0.0".to_string(),
        release_id: Some("pinned-release".to_string()),
        ..Package::default()
    });

    let summary = ws.import("package-mode.cdx.json", None);
    assert_eq!(summary.status, RequestStatus::Success);
    assert_eq!(report(&summary).count(keys::PKG_CREATION_COUNT), Some(2));
    assert_eq!(report(&summary).count(keys::PKG_REUSE_COUNT), Some(1));
    assert_eq!(
        ws.package_named("foo-core").release_id.as_deref(),
        Some("pinned-release")
    );
}

#[test]
fn test_release_only_mode_imports_xml() {
    let mut ws = Workspace::default();
    let mut config = ReconcileConfig::default();
    config.import.package_mode = false;

    let summary = ws.import_with(&config, "release-only.cdx.xml", None, &admin());
    assert_eq!(summary.status, RequestStatus::Success, "{}", summary.message);

    let report = report(&summary);
    assert_eq!(report.count(keys::COMP_CREATION_COUNT), Some(2));
    assert_eq!(report.count(keys::REL_CREATION_COUNT), Some(2));
    assert_eq!(report.count(keys::PKG_CREATION_COUNT), Some(0));
    assert!(report.get(keys::INVALID_VCS_COMPONENT).is_none());
    assert_eq!(ws.catalog.packages().count(), 0);

    let openssl = ws.component_named("openssl");
    assert_eq!(openssl.homepage.as_deref(), Some("https://www.openssl.org"));
    let release = ws
        .catalog
        .releases()
        .find(|r| r.component_id == openssl.id)
        .cloned()
        .unwrap();
    assert_eq!(
        release.external_ids.get(PACKAGE_URL_KEY).map(String::as_str),
        Some("pkg:generic/openssl@3.0.13")
    );
    let repository = release.repository.unwrap();
    assert_eq!(repository.url, "https://github.com/openssl/openssl");
    assert_eq!(repository.repository_type, Some(RepositoryType::Git));
    assert_eq!(
        release.cpe.as_deref(),
        Some("cpe:2.3:a:openssl:openssl:3.0.13:*:*:*:*:*:*:*")
    );
    assert!(release.main_license_ids.contains("Apache-2.0"));

    let project = ws.project_named("legacy-app");
    assert_eq!(project.release_id_to_usage.len(), 2);
    assert!(project.package_ids.is_empty());
}

#[test]
fn test_attachments_hold_bom_and_report() {
    let mut ws = Workspace::default();
    let summary = ws.import("package-mode.cdx.json", None);
    assert_eq!(ws.attachments.len(), 2);

    let project = ws.project_named("demo-app");
    assert_eq!(project.attachments.len(), 2);

    let sbom = project
        .attachments
        .iter()
        .find(|a| a.attachment_type == AttachmentType::Sbom)
        .unwrap();
    assert_eq!(sbom.filename, "package-mode.cdx.json");
    assert_eq!(sbom.created_by, "admin@example.org");
    assert_eq!(
        ws.attachments.read(&sbom.content_id).unwrap(),
        fixture("package-mode.cdx.json")
    );

    let stored = project
        .attachments
        .iter()
        .find(|a| a.attachment_type == AttachmentType::Other)
        .unwrap();
    assert!(stored.filename.starts_with("package-mode.cdx.json_ImportStatus_"));
    let bytes = ws.attachments.read(&stored.content_id).unwrap();
    let stored_report = ImportReport::from_json(&String::from_utf8(bytes).unwrap()).unwrap();
    assert_eq!(&stored_report, report(&summary));
}

#[test]
fn test_attachments_can_be_disabled() {
    let mut ws = Workspace::default();
    let mut config = ReconcileConfig::default();
    config.import.attach_sbom = false;
    config.import.attach_import_report = false;

    ws.import_with(&config, "package-mode.cdx.json", None, &admin());
    assert!(ws.attachments.is_empty());
    assert!(ws.project_named("demo-app").attachments.is_empty());
}

// ============================================================================
// Failing collaborators
// ============================================================================

/// Catalog that refuses to store releases of one component.
struct RejectingReleases {
    inner: InMemoryCatalog,
    rejected: &'static str,
}

impl CatalogStore for RejectingReleases {
    fn components_by_name(&self, name: &str) -> Result<Vec<Component>> {
        self.inner.components_by_name(name)
    }
    fn component(&self, id: &str) -> Result<Component> {
        self.inner.component(id)
    }
    fn add_component(&mut self, component: &Component, user: &User) -> Result<UpsertOutcome> {
        self.inner.add_component(component, user)
    }
    fn update_component(&mut self, component: &Component, user: &User) -> Result<()> {
        self.inner.update_component(component, user)
    }
    fn release(&self, id: &str) -> Result<Release> {
        self.inner.release(id)
    }
    fn add_release(&mut self, release: &Release, user: &User) -> Result<UpsertOutcome> {
        if release.name == self.rejected {
            return Err(ReconcileError::storage("backend unavailable"));
        }
        self.inner.add_release(release, user)
    }
    fn update_release(&mut self, release: &Release, user: &User) -> Result<()> {
        self.inner.update_release(release, user)
    }
    fn package(&self, id: &str) -> Result<Package> {
        self.inner.package(id)
    }
    fn packages_by_name_and_version(&self, name: &str, version: &str) -> Result<Vec<Package>> {
        self.inner.packages_by_name_and_version(name, version)
    }
    fn add_package(&mut self, package: &Package, user: &User) -> Result<UpsertOutcome> {
        self.inner.add_package(package, user)
    }
    fn update_package(&mut self, package: &Package, user: &User) -> Result<()> {
        self.inner.update_package(package, user)
    }
}

/// Project store whose final update always fails.
struct FrozenProjects(InMemoryProjects);

impl ProjectStore for FrozenProjects {
    fn project(&self, id: &str) -> Result<Project> {
        self.0.project(id)
    }
    fn add_project(&mut self, project: &Project, user: &User) -> Result<UpsertOutcome> {
        self.0.add_project(project, user)
    }
    fn update_project(&mut self, _project: &Project, _user: &User) -> Result<()> {
        Err(ReconcileError::storage("project store is read-only"))
    }
}

#[test]
fn test_item_failure_is_counted_and_import_continues() {
    let mut catalog = RejectingReleases {
        inner: InMemoryCatalog::new(),
        rejected: "bar",
    };
    let mut projects = InMemoryProjects::new();
    let mut attachments = InMemoryAttachments::new();
    let config = ReconcileConfig::default();
    let user = admin();
    let content = fixture("package-mode.cdx.json");

    let summary = BomImporter::new(&mut catalog, &mut projects, &mut attachments, &config)
        .unwrap()
        .import(&ImportRequest {
            file_name: "package-mode.cdx.json",
            content: &content,
            project_id: None,
            user: &user,
        });

    assert_eq!(summary.status, RequestStatus::Success);
    let report = report(&summary);
    assert_eq!(report.count(keys::COMP_IMPORT_ERROR_COUNT), Some(1));
    assert_eq!(report.count(keys::REL_CREATION_COUNT), Some(2));

    let project = projects.projects().next().unwrap();
    assert_eq!(project.release_id_to_usage.len(), 2);
    // The bar package is never attempted without its release.
    assert!(catalog.inner.packages().all(|p| p.name != "bar"));
}

#[test]
fn test_failed_project_update_is_batch_failure() {
    let mut catalog = InMemoryCatalog::new();
    let mut projects = FrozenProjects(InMemoryProjects::new());
    let mut attachments = InMemoryAttachments::new();
    let config = ReconcileConfig::default();
    let user = admin();
    let content = fixture("package-mode.cdx.json");

    let summary = BomImporter::new(&mut catalog, &mut projects, &mut attachments, &config)
        .unwrap()
        .import(&ImportRequest {
            file_name: "package-mode.cdx.json",
            content: &content,
            project_id: None,
            user: &user,
        });

    assert_eq!(summary.status, RequestStatus::Failure);
    assert!(summary.message.starts_with("Failed to update project"));
    let report = report(&summary);
    assert_eq!(report.get(keys::RESULT), Some("FAILURE"));
    assert_eq!(report.count(keys::COMP_CREATION_COUNT), Some(3));

    // Catalog writes made before the failure stay in place.
    assert_eq!(catalog.components().count(), 3);
    let project = projects.0.projects().next().unwrap();
    assert!(project.release_id_to_usage.is_empty());
}

// ============================================================================
// Inline documents
// ============================================================================

fn import_inline(ws: &mut Workspace, file_name: &str, content: &str) -> ImportSummary {
    let config = ReconcileConfig::default();
    let user = admin();
    BomImporter::new(&mut ws.catalog, &mut ws.projects, &mut ws.attachments, &config)
        .unwrap()
        .import(&ImportRequest {
            file_name,
            content: content.as_bytes(),
            project_id: None,
            user: &user,
        })
}

#[test]
fn test_repeated_purl_yields_one_package() {
    let mut ws = Workspace::default();
    let summary = import_inline(
        &mut ws,
        "twice.json",
        r#"{
            "bomFormat": "CycloneDX",
            "specVersion": "1.6",
            "metadata": { "component": { "name": "twice", "version": "1" } },
            "components": [
                { "name": "dup", "version": "2.0", "purl": "pkg:npm/dup@2.0",
                  "externalReferences": [{ "type": "vcs", "url": "https://github.com/acme/dup" }] },
                { "name": "dup", "version": "2.0", "purl": "pkg:npm/dup@2.0",
                  "externalReferences": [{ "type": "vcs", "url": "https://github.com/acme/dup.git" }] }
            ]
        }"#,
    );

    assert_eq!(summary.status, RequestStatus::Success, "{}", summary.message);
    let report = report(&summary);
    assert_eq!(report.count(keys::PKG_CREATION_COUNT), Some(1));
    assert_eq!(report.count(keys::PKG_REUSE_COUNT), Some(1));
    assert_eq!(report.count(keys::REL_CREATION_COUNT), Some(1));
    assert_eq!(ws.catalog.packages().count(), 1);
    assert_eq!(ws.catalog.releases().count(), 1);
}

#[test]
fn test_populated_component_fields_are_never_overwritten() {
    let mut ws = Workspace::default();
    ws.catalog.insert_component(Component {
        vcs: Some("https://github.com/acme/foo".to_string()),
        homepage: Some("https://old.foo.example".to_string()),
        ..Component::new("foo")
    });

    let summary = ws.import("package-mode.cdx.json", None);
    assert_eq!(summary.status, RequestStatus::Success, "{}", summary.message);
    assert_eq!(report(&summary).count(keys::COMP_REUSE_COUNT), Some(1));

    let foo = ws.component_named("foo");
    assert_eq!(foo.homepage.as_deref(), Some("https://old.foo.example"));
    // Empty fields and license ids still pick up what the BOM says.
    assert!(foo.main_license_ids.contains("MIT"));
}

#[test]
fn test_same_name_with_other_vcs_is_imported_under_vendor_path() {
    let mut ws = Workspace::default();
    ws.catalog.insert_component(Component {
        vcs: Some("https://github.com/other/foo".to_string()),
        ..Component::new("foo")
    });

    let summary = ws.import("package-mode.cdx.json", None);
    assert_eq!(summary.status, RequestStatus::Success, "{}", summary.message);
    assert_eq!(report(&summary).count(keys::COMP_CREATION_COUNT), Some(3));

    let renamed = ws.component_named("acme/foo");
    assert_eq!(renamed.vcs.as_deref(), Some("https://github.com/acme/foo"));
    assert_eq!(
        ws.component_named("foo").vcs.as_deref(),
        Some("https://github.com/other/foo")
    );
}
