//! Project linkage.
//!
//! Resolved release and package ids are applied to the project in one step
//! at the end of a batch, either replacing the existing link maps or adding
//! only the missing entries.

use super::batch::BatchResult;
use crate::model::{MainlineState, Project, ProjectRelationship, ReleaseRelationship};
use std::collections::BTreeSet;

/// How resolved links are applied to a project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinkMode {
    /// Clear existing links before adding the batch's
    #[default]
    Replace,
    /// Keep existing links and add missing ones
    Merge,
}

impl LinkMode {
    /// Mode for the `do_not_replace_package_and_release` setting.
    #[must_use]
    pub const fn from_do_not_replace(do_not_replace: bool) -> Self {
        if do_not_replace {
            Self::Merge
        } else {
            Self::Replace
        }
    }
}

/// Relationship given to newly linked releases and packages.
#[must_use]
pub const fn default_relation() -> ProjectRelationship {
    ProjectRelationship {
        relation: ReleaseRelationship::Unknown,
        mainline_state: MainlineState::Open,
    }
}

/// Links that survive the batch and therefore never count as reuse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriorLinks {
    release_ids: BTreeSet<String>,
    package_ids: BTreeSet<String>,
}

impl PriorLinks {
    /// Links of `project` kept under `mode`. Replacing keeps none.
    #[must_use]
    pub fn of(project: &Project, mode: LinkMode) -> Self {
        match mode {
            LinkMode::Replace => Self::default(),
            LinkMode::Merge => Self {
                release_ids: project.release_id_to_usage.keys().cloned().collect(),
                package_ids: project.package_ids.keys().cloned().collect(),
            },
        }
    }

    #[must_use]
    pub fn has_release(&self, id: &str) -> bool {
        self.release_ids.contains(id)
    }

    #[must_use]
    pub fn has_package(&self, id: &str) -> bool {
        self.package_ids.contains(id)
    }
}

/// Next state of `project` with the batch's links applied.
#[must_use]
pub fn link_batch(project: &Project, batch: &BatchResult, mode: LinkMode) -> Project {
    let mut next = project.clone();
    if mode == LinkMode::Replace {
        next.release_id_to_usage.clear();
        next.package_ids.clear();
    }
    for id in &batch.release_ids {
        next.release_id_to_usage
            .entry(id.clone())
            .or_insert_with(default_relation);
    }
    for id in &batch.package_ids {
        next.package_ids
            .entry(id.clone())
            .or_insert_with(default_relation);
    }
    next
}
