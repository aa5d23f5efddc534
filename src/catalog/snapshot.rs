//! JSON file holding a catalog and its projects.
//!
//! The CLI loads a snapshot, runs an import or export against it, and saves
//! it back.

use super::memory::{InMemoryCatalog, InMemoryProjects};
use crate::error::{ErrorContext, ReconcileError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Catalog and projects persisted together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSnapshot {
    pub catalog: InMemoryCatalog,
    pub projects: InMemoryProjects,
}

impl CatalogSnapshot {
    /// Load a snapshot. A missing file yields an empty snapshot.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No catalog at {}, starting empty", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| ReconcileError::io(path, e))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&content)
            .with_context(|| format!("reading catalog snapshot {}", path.display()))
    }

    /// Write the snapshot as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ReconcileError::serialize(format!("catalog snapshot: {e}")))?;
        std::fs::write(path, content).map_err(|e| ReconcileError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Component, Project};
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("catalog.json");

        let mut snapshot = CatalogSnapshot::default();
        let id = snapshot.catalog.insert_component(Component::new("foo"));
        snapshot.projects.insert_project(Project {
            name: "demo".to_string(),
            ..Project::default()
        });
        snapshot.save(&path).unwrap();

        let loaded = CatalogSnapshot::load(&path).unwrap();
        assert_eq!(loaded, snapshot);
        assert_eq!(loaded.catalog.components().next().map(|c| c.id.clone()), Some(id));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let loaded = CatalogSnapshot::load(&tmp.path().join("absent.json")).unwrap();
        assert_eq!(loaded, CatalogSnapshot::default());
    }

    #[test]
    fn test_corrupt_file_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("catalog.json");
        std::fs::write(&path, "{ nope").unwrap();
        assert!(matches!(
            CatalogSnapshot::load(&path),
            Err(ReconcileError::Parse { .. })
        ));
    }
}
