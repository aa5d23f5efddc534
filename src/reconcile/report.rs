//! Import report: a flat map of string values.
//!
//! Counters are written as decimal strings and name lists as sorted,
//! `||`-joined strings, so the report serializes to a JSON object whose
//! values are all strings.

use super::batch::BatchResult;
use crate::error::{ErrorContext, ReconcileError, Result};
use crate::matching::ComponentGrouping;
use crate::model::Project;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Separator of list values.
pub const JOINER: &str = "||";

/// Report keys.
pub mod keys {
    pub const PROJECT_ID: &str = "projectId";
    pub const PROJECT_NAME: &str = "projectName";
    pub const COMP_CREATION_COUNT: &str = "compCreationCount";
    pub const COMP_REUSE_COUNT: &str = "compReuseCount";
    pub const REL_CREATION_COUNT: &str = "relCreationCount";
    pub const REL_REUSE_COUNT: &str = "relReuseCount";
    pub const PKG_CREATION_COUNT: &str = "pkgCreationCount";
    pub const PKG_REUSE_COUNT: &str = "pkgReuseCount";
    pub const COMP_IMPORT_ERROR_COUNT: &str = "compImportErrorCount";
    pub const DUPLICATE_COMPONENT: &str = "dupComp";
    pub const DUPLICATE_RELEASE: &str = "dupRel";
    pub const DUPLICATE_PACKAGE: &str = "dupPkg";
    pub const INVALID_COMPONENT: &str = "invalidComp";
    pub const INVALID_RELEASE: &str = "invalidRel";
    pub const INVALID_PACKAGE: &str = "invalidPkg";
    pub const INVALID_VCS_COMPONENT: &str = "invalidVcsComponent";
    pub const NON_PKG_MANAGED_WITHOUT_VCS: &str = "nonPkgManagedCompWithoutVCS";
    pub const MESSAGE: &str = "message";
    pub const RESULT: &str = "result";
    pub const FILE_NAME: &str = "fileName";
}

/// Join names with [`JOINER`] in sorted order.
#[must_use]
pub fn join_names(names: &BTreeSet<String>) -> String {
    names
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(JOINER)
}

/// Flat string report of an import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImportReport {
    entries: BTreeMap<String, String>,
}

impl ImportReport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report naming only a project, used for rejected imports.
    #[must_use]
    pub fn for_project(project_id: Option<&str>, project_name: &str) -> Self {
        let mut report = Self::new();
        if let Some(id) = project_id {
            report.set(keys::PROJECT_ID, id);
        }
        report.set(keys::PROJECT_NAME, project_name);
        report
    }

    /// Report of a completed batch.
    #[must_use]
    pub fn from_batch(
        project: &Project,
        batch: &BatchResult,
        grouping: Option<&ComponentGrouping>,
    ) -> Self {
        let mut report = Self::for_project(Some(&project.id), &project.versioned_name());

        report.set_count(keys::COMP_CREATION_COUNT, batch.components.creation_count());
        report.set_count(keys::COMP_REUSE_COUNT, batch.components.reuse_count());
        report.set_count(keys::REL_CREATION_COUNT, batch.releases.creation_count());
        report.set_count(keys::REL_REUSE_COUNT, batch.releases.reuse_count());
        report.set_count(keys::PKG_CREATION_COUNT, batch.packages.creation_count());
        report.set_count(keys::PKG_REUSE_COUNT, batch.packages.reuse_count());
        report.set_count(keys::COMP_IMPORT_ERROR_COUNT, batch.import_errors);

        report.set_list(keys::DUPLICATE_COMPONENT, &batch.duplicate_components);
        report.set_list(keys::DUPLICATE_RELEASE, &batch.duplicate_releases);
        report.set_list(keys::DUPLICATE_PACKAGE, &batch.duplicate_packages);
        report.set_list(keys::INVALID_COMPONENT, &batch.invalid_components);
        report.set_list(keys::INVALID_RELEASE, &batch.invalid_releases);
        report.set_list(keys::INVALID_PACKAGE, &batch.invalid_packages);

        if let Some(grouping) = grouping {
            report.set_list(keys::INVALID_VCS_COMPONENT, &grouping.invalid_vcs);
            report.set_list(
                keys::NON_PKG_MANAGED_WITHOUT_VCS,
                &grouping.non_package_managed_without_vcs,
            );
        }
        report
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.entries.insert(key.to_string(), value.into());
    }

    pub fn set_count(&mut self, key: &str, count: usize) {
        self.set(key, count.to_string());
    }

    pub fn set_list(&mut self, key: &str, names: &BTreeSet<String>) {
        self.set(key, join_names(names));
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Numeric value of a counter key.
    #[must_use]
    pub fn count(&self, key: &str) -> Option<usize> {
        self.get(key).and_then(|v| v.parse().ok())
    }

    /// Names stored under a list key.
    #[must_use]
    pub fn list(&self, key: &str) -> Vec<&str> {
        self.get(key)
            .map(|v| v.split(JOINER).filter(|s| !s.is_empty()).collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    /// Pretty-printed JSON object.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ReconcileError::serialize(format!("import report: {e}")))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("reading import report")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EntityKind;
    use crate::reconcile::batch::Upserted;

    fn project() -> Project {
        Project {
            id: "p1".to_string(),
            name: "demo".to_string(),
            version: "1.0".to_string(),
            ..Project::default()
        }
    }

    #[test]
    fn test_from_batch_counts_and_lists() {
        let mut batch = BatchResult::new();
        batch.record(EntityKind::Component, &Upserted::created("c1"), false);
        batch.record(EntityKind::Release, &Upserted::existing("r1"), false);
        batch.duplicate_packages.insert("zeta (1)".to_string());
        batch.duplicate_packages.insert("alpha (2)".to_string());

        let report = ImportReport::from_batch(&project(), &batch, None);
        assert_eq!(report.get(keys::PROJECT_ID), Some("p1"));
        assert_eq!(report.get(keys::PROJECT_NAME), Some("demo (1.0)"));
        assert_eq!(report.count(keys::COMP_CREATION_COUNT), Some(1));
        assert_eq!(report.count(keys::REL_REUSE_COUNT), Some(1));
        assert_eq!(report.count(keys::PKG_CREATION_COUNT), Some(0));
        assert_eq!(report.get(keys::DUPLICATE_PACKAGE), Some("alpha (2)||zeta (1)"));
        assert_eq!(report.list(keys::INVALID_RELEASE), Vec::<&str>::new());
    }

    #[test]
    fn test_json_is_flat_string_map() {
        let mut report = ImportReport::for_project(None, "demo (1.0)");
        report.set_count(keys::COMP_REUSE_COUNT, 3);

        let json = report.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["compReuseCount"], "3");
        assert_eq!(value["projectName"], "demo (1.0)");
        assert!(value.get("projectId").is_none());

        assert_eq!(ImportReport::from_json(&json).unwrap(), report);
    }
}
