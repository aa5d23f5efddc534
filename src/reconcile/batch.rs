//! Batch accumulator for one import.
//!
//! Each group or standalone item produces its own [`BatchResult`]; the
//! importer merges them in order. Counts are derived from id sets, so merging
//! never double-counts an entity that two groups resolved to.

use crate::error::{EntityKind, ReconcileError};
use std::collections::BTreeSet;

/// Result of a find-or-create call that yielded an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upserted {
    pub id: String,
    pub created: bool,
}

impl Upserted {
    #[must_use]
    pub fn created(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created: true,
        }
    }

    #[must_use]
    pub fn existing(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created: false,
        }
    }
}

/// Created/reused ids of one entity kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityTally {
    created: BTreeSet<String>,
    reused: BTreeSet<String>,
}

impl EntityTally {
    /// Number of entities created in the batch.
    #[must_use]
    pub fn creation_count(&self) -> usize {
        self.created.len()
    }

    /// Number of distinct ids found already existing, including ids created
    /// earlier in the same batch and met again by a later entry.
    #[must_use]
    pub fn reuse_count(&self) -> usize {
        self.reused.len()
    }

    fn merge(&mut self, other: Self) {
        self.created.extend(other.created);
        self.reused.extend(other.reused);
    }
}

/// Counters, skipped-item names and resolved link ids of an import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    pub components: EntityTally,
    pub releases: EntityTally,
    pub packages: EntityTally,
    /// Item-level persistence failures
    pub import_errors: usize,
    pub duplicate_components: BTreeSet<String>,
    pub duplicate_releases: BTreeSet<String>,
    pub duplicate_packages: BTreeSet<String>,
    pub invalid_components: BTreeSet<String>,
    pub invalid_releases: BTreeSet<String>,
    pub invalid_packages: BTreeSet<String>,
    /// Releases to link to the project
    pub release_ids: BTreeSet<String>,
    /// Packages to link to the project
    pub package_ids: BTreeSet<String>,
}

impl BatchResult {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a created entity, or a reused one unless `already_linked`.
    pub fn record(&mut self, kind: EntityKind, upserted: &Upserted, already_linked: bool) {
        let Some(tally) = self.tally_mut(kind) else {
            return;
        };
        if upserted.created {
            tally.created.insert(upserted.id.clone());
        } else if !already_linked {
            tally.reused.insert(upserted.id.clone());
        }
    }

    /// Fold an item-level error into the batch.
    ///
    /// Ambiguous matches and invalid candidates are recorded by name; any
    /// other error counts as a persistence failure.
    pub fn record_error(&mut self, err: &ReconcileError) {
        match err {
            ReconcileError::AmbiguousDuplicate { kind, name } => {
                tracing::warn!("Found multiple {}s: {}", kind, name);
                if let Some(set) = self.duplicates_mut(*kind) {
                    set.insert(name.clone());
                }
            }
            ReconcileError::InvalidItem { kind, name, reason } => {
                tracing::error!("Invalid {} '{}' found in SBOM: {}", kind, name, reason);
                if let Some(set) = self.invalid_mut(*kind) {
                    set.insert(name.clone());
                }
            }
            other => {
                tracing::error!("Error while importing SBOM item: {}", other);
                self.import_errors += 1;
            }
        }
    }

    /// Append another batch.
    pub fn merge(&mut self, other: Self) {
        self.components.merge(other.components);
        self.releases.merge(other.releases);
        self.packages.merge(other.packages);
        self.import_errors += other.import_errors;
        self.duplicate_components.extend(other.duplicate_components);
        self.duplicate_releases.extend(other.duplicate_releases);
        self.duplicate_packages.extend(other.duplicate_packages);
        self.invalid_components.extend(other.invalid_components);
        self.invalid_releases.extend(other.invalid_releases);
        self.invalid_packages.extend(other.invalid_packages);
        self.release_ids.extend(other.release_ids);
        self.package_ids.extend(other.package_ids);
    }

    /// Consume and append another batch.
    #[must_use]
    pub fn merged(mut self, other: Self) -> Self {
        self.merge(other);
        self
    }

    fn tally_mut(&mut self, kind: EntityKind) -> Option<&mut EntityTally> {
        match kind {
            EntityKind::Component => Some(&mut self.components),
            EntityKind::Release => Some(&mut self.releases),
            EntityKind::Package => Some(&mut self.packages),
            EntityKind::Project => None,
        }
    }

    fn duplicates_mut(&mut self, kind: EntityKind) -> Option<&mut BTreeSet<String>> {
        match kind {
            EntityKind::Component => Some(&mut self.duplicate_components),
            EntityKind::Release => Some(&mut self.duplicate_releases),
            EntityKind::Package => Some(&mut self.duplicate_packages),
            EntityKind::Project => None,
        }
    }

    fn invalid_mut(&mut self, kind: EntityKind) -> Option<&mut BTreeSet<String>> {
        match kind {
            EntityKind::Component => Some(&mut self.invalid_components),
            EntityKind::Release => Some(&mut self.invalid_releases),
            EntityKind::Package => Some(&mut self.invalid_packages),
            EntityKind::Project => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reuse_counted_once_per_id() {
        let mut batch = BatchResult::new();
        batch.record(EntityKind::Package, &Upserted::existing("p1"), false);
        batch.record(EntityKind::Package, &Upserted::existing("p1"), false);
        batch.record(EntityKind::Package, &Upserted::existing("p2"), true);
        assert_eq!(batch.packages.reuse_count(), 1);
        assert_eq!(batch.packages.creation_count(), 0);
    }

    #[test]
    fn test_created_then_found_counts_as_reuse() {
        let first = {
            let mut b = BatchResult::new();
            b.record(EntityKind::Release, &Upserted::created("r1"), false);
            b
        };
        let second = {
            let mut b = BatchResult::new();
            b.record(EntityKind::Release, &Upserted::existing("r1"), false);
            b
        };
        let merged = first.merged(second);
        assert_eq!(merged.releases.creation_count(), 1);
        assert_eq!(merged.releases.reuse_count(), 1);
    }

    #[test]
    fn test_record_error_routes_by_kind() {
        let mut batch = BatchResult::new();
        batch.record_error(&ReconcileError::ambiguous(EntityKind::Component, "foo"));
        batch.record_error(&ReconcileError::invalid_item(
            EntityKind::Release,
            "bar",
            "missing version",
        ));
        batch.record_error(
            &ReconcileError::storage("down").into_item_failure(EntityKind::Package, "baz"),
        );

        assert!(batch.duplicate_components.contains("foo"));
        assert!(batch.invalid_releases.contains("bar"));
        assert_eq!(batch.import_errors, 1);
        assert!(batch.invalid_packages.is_empty());
    }

    #[test]
    fn test_merge_unions_links() {
        let mut a = BatchResult::new();
        a.release_ids.insert("r1".to_string());
        a.import_errors = 1;
        let mut b = BatchResult::new();
        b.release_ids.insert("r1".to_string());
        b.package_ids.insert("p1".to_string());
        b.import_errors = 2;

        let merged = a.merged(b);
        assert_eq!(merged.release_ids.len(), 1);
        assert_eq!(merged.package_ids.len(), 1);
        assert_eq!(merged.import_errors, 3);
    }
}
