//! Partitioning of a BOM's component list by VCS identity.
//!
//! Every component lands in exactly one of three places: a VCS group keyed
//! by its first resolvable repository identity, the non-package-managed
//! bucket, or the "without VCS" list.

use super::vcs::VcsIdentity;
use crate::error::{ReconcileError, Result};
use crate::model::{BomComponent, ExternalRefType};
use indexmap::IndexMap;
use rayon::prelude::*;
use std::collections::{BTreeSet, HashSet};

/// Property name/value pair marking a component as not package managed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonPackageManagedFlag {
    pub property: String,
    pub value: String,
}

impl Default for NonPackageManagedFlag {
    fn default() -> Self {
        Self {
            property: "nonPackageManaged".to_string(),
            value: "true".to_string(),
        }
    }
}

impl NonPackageManagedFlag {
    #[must_use]
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
        }
    }

    /// Whether the component carries the flag. Values compare case-insensitively.
    #[must_use]
    pub fn matches(&self, component: &BomComponent) -> bool {
        component
            .property(&self.property)
            .is_some_and(|v| v.trim().eq_ignore_ascii_case(self.value.trim()))
    }
}

/// Components sharing one repository identity.
#[derive(Debug, Clone)]
pub struct VcsGroup {
    pub identity: VcsIdentity,
    pub members: Vec<BomComponent>,
}

/// Result of grouping a component list.
#[derive(Debug, Clone, Default)]
pub struct ComponentGrouping {
    /// VCS groups in first-seen order
    pub groups: IndexMap<String, VcsGroup>,
    pub non_package_managed: Vec<BomComponent>,
    pub without_vcs: Vec<BomComponent>,
    /// Names of components whose VCS references could not be parsed
    pub invalid_vcs: BTreeSet<String>,
    /// Names of flagged components that carry no VCS reference
    pub non_package_managed_without_vcs: BTreeSet<String>,
    /// Distinct identities over all VCS references of grouped candidates
    pub distinct_vcs_count: usize,
    pub total_components: usize,
}

enum Placement {
    NonPackageManaged { has_vcs: bool },
    Grouped { identities: Vec<VcsIdentity> },
    WithoutVcs { had_vcs_refs: bool },
}

fn place(component: &BomComponent, flag: &NonPackageManagedFlag) -> Placement {
    let refs: Vec<&str> = component
        .reference_urls(ExternalRefType::Vcs)
        .filter(|url| !url.trim().is_empty())
        .collect();

    if flag.matches(component) {
        return Placement::NonPackageManaged {
            has_vcs: !refs.is_empty(),
        };
    }

    let identities: Vec<VcsIdentity> = refs.iter().filter_map(|u| VcsIdentity::parse(u)).collect();
    if identities.is_empty() {
        Placement::WithoutVcs {
            had_vcs_refs: !refs.is_empty(),
        }
    } else {
        Placement::Grouped { identities }
    }
}

impl ComponentGrouping {
    /// Group a component list. Classification runs in parallel; group order
    /// follows the input order.
    #[must_use]
    pub fn build(components: &[BomComponent], flag: &NonPackageManagedFlag) -> Self {
        let placements: Vec<Placement> = components.par_iter().map(|c| place(c, flag)).collect();

        let mut grouping = Self {
            total_components: components.len(),
            ..Self::default()
        };
        let mut distinct = HashSet::new();

        for (component, placement) in components.iter().zip(placements) {
            match placement {
                Placement::NonPackageManaged { has_vcs } => {
                    if !has_vcs {
                        grouping
                            .non_package_managed_without_vcs
                            .insert(component.name.trim().to_string());
                    }
                    grouping.non_package_managed.push(component.clone());
                }
                Placement::Grouped { identities } => {
                    distinct.extend(identities.iter().map(VcsIdentity::key));
                    let identity = identities[0].clone();
                    grouping
                        .groups
                        .entry(identity.key())
                        .or_insert_with(|| VcsGroup {
                            identity,
                            members: Vec::new(),
                        })
                        .members
                        .push(component.clone());
                }
                Placement::WithoutVcs { had_vcs_refs } => {
                    if had_vcs_refs {
                        grouping.invalid_vcs.insert(component.name.trim().to_string());
                    }
                    grouping.without_vcs.push(component.clone());
                }
            }
        }

        grouping.distinct_vcs_count = distinct.len();
        grouping
    }

    /// Every non-flagged component resolved to a VCS group.
    #[must_use]
    pub fn is_pure(&self) -> bool {
        self.without_vcs.is_empty()
    }

    /// Number of components placed in VCS groups.
    #[must_use]
    pub fn grouped_count(&self) -> usize {
        self.groups.values().map(|g| g.members.len()).sum()
    }

    /// Reject a grouping that found more repositories than components.
    pub fn check_consistency(&self) -> Result<()> {
        if self.distinct_vcs_count > self.total_components {
            return Err(ReconcileError::MalformedBom(format!(
                "Multiple vcs information found in components, vcs found: {} and total components: {}",
                self.distinct_vcs_count, self.total_components
            )));
        }
        Ok(())
    }
}
