//! Catalog upsert engine.
//!
//! Finds or creates components, releases and packages for BOM entries. Every
//! item-level step returns a `Result`; failures are folded into the item's
//! [`BatchResult`] and never stop the caller's loop.

use super::batch::{BatchResult, Upserted};
use super::linkage::PriorLinks;
use crate::catalog::{CatalogStore, UpsertOutcome};
use crate::error::{EntityKind, ReconcileError, Result};
use crate::matching::{normalize_purl, normalize_vcs_url, ParsedPurl, VcsGroup};
use crate::model::{
    versioned_name, BomComponent, BomLicense, CdxComponentType, Component, ComponentKind,
    ComponentObservation, ExternalRefType, Package, Release, Repository, User, NO_ASSERTION,
    PACKAGE_URL_KEY,
};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static VCS_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^:]+://").expect("static regex"));

/// Map a store outcome to an id or an item-level error.
fn resolve(outcome: UpsertOutcome, kind: EntityKind, label: &str) -> Result<Upserted> {
    match outcome {
        UpsertOutcome::Created(id) => Ok(Upserted::created(id)),
        UpsertOutcome::Existing(id) => Ok(Upserted::existing(id)),
        UpsertOutcome::Ambiguous => Err(ReconcileError::ambiguous(kind, label)),
        UpsertOutcome::Invalid(reason) => Err(ReconcileError::invalid_item(kind, label, reason)),
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Label used for a BOM entry in reports.
fn item_label(member: &BomComponent) -> String {
    let label = member.versioned_name();
    if !label.trim().is_empty() {
        return label;
    }
    member
        .purl
        .clone()
        .or_else(|| member.bom_ref.clone())
        .unwrap_or_else(|| "<unnamed>".to_string())
}

/// License ids declared on or evidenced for a BOM entry.
#[must_use]
pub fn license_ids(member: &BomComponent) -> BTreeSet<String> {
    member
        .licenses
        .iter()
        .chain(&member.evidence_licenses)
        .filter(|license| !matches!(license, BomLicense::Expression(_)))
        .map(|license| license.value().trim())
        .filter(|value| !value.is_empty() && !value.eq_ignore_ascii_case(NO_ASSERTION))
        .map(str::to_string)
        .collect()
}

/// Catalog type of a BOM entry; unmapped wire types yield `None`.
fn catalog_type(member: &BomComponent) -> Option<CdxComponentType> {
    member.component_type.and_then(CdxComponentType::from_bom)
}

/// Descriptive metadata a BOM entry contributes to its component.
#[must_use]
pub fn observe(member: &BomComponent) -> ComponentObservation {
    ComponentObservation {
        vcs: None,
        homepage: non_blank(member.first_reference(ExternalRefType::Website)),
        mailing_list: non_blank(member.first_reference(ExternalRefType::MailingList)),
        wiki: non_blank(member.first_reference(ExternalRefType::Support)),
        description: non_blank(member.description.as_deref()),
        cdx_component_type: catalog_type(member),
        license_ids: license_ids(member),
    }
}

/// Add the purl external id and source repository of a BOM entry.
fn with_identifiers(mut release: Release, member: &BomComponent) -> Release {
    if let Some(raw) = non_blank(member.purl.as_deref()) {
        match ParsedPurl::parse(&raw) {
            Some(purl) => {
                release
                    .external_ids
                    .insert(PACKAGE_URL_KEY.to_string(), purl.purl);
            }
            None => tracing::error!("Malformed PURL for component: {}", member.name),
        }
    }
    if let Some(url) = non_blank(member.first_reference(ExternalRefType::Vcs)) {
        release.repository = Some(Repository::from_vcs_url(&url));
    }
    release
}

/// Issues the catalog writes for one import.
pub struct CatalogUpserter<'a, C: CatalogStore + ?Sized> {
    catalog: &'a mut C,
    user: &'a User,
    prior: &'a PriorLinks,
}

impl<'a, C: CatalogStore + ?Sized> CatalogUpserter<'a, C> {
    pub fn new(catalog: &'a mut C, user: &'a User, prior: &'a PriorLinks) -> Self {
        Self {
            catalog,
            user,
            prior,
        }
    }

    // ------------------------------------------------------------------------
    // Package-mode VCS groups
    // ------------------------------------------------------------------------

    /// Import one VCS group: its component, a release and package per member,
    /// and a single metadata merge on the component.
    pub fn upsert_group(&mut self, group: &VcsGroup) -> BatchResult {
        let mut batch = BatchResult::new();
        let component = match self.upsert_group_component(group) {
            Ok((component, upserted)) => {
                batch.record(EntityKind::Component, &upserted, false);
                component
            }
            Err(err) => {
                batch.record_error(&err);
                return batch;
            }
        };

        for member in &group.members {
            batch.merge(self.upsert_member(&component, member));
        }

        let observation = group
            .members
            .iter()
            .map(observe)
            .fold(
                ComponentObservation {
                    vcs: Some(group.identity.url()),
                    ..ComponentObservation::default()
                },
                ComponentObservation::merge,
            );
        if let Err(err) = self.merge_metadata(&component, &observation) {
            batch.record_error(&err);
        }
        batch
    }

    fn upsert_group_component(&mut self, group: &VcsGroup) -> Result<(Component, Upserted)> {
        let identity = &group.identity;
        let mut candidate = Component {
            kind: ComponentKind::Oss,
            vcs: Some(identity.url()),
            ..Component::new(identity.repo_name())
        };

        let conflicting = self
            .catalog
            .components_by_name(&candidate.name)
            .map_err(|e| e.into_item_failure(EntityKind::Component, &candidate.name))?
            .iter()
            .filter_map(|existing| non_blank(existing.vcs.as_deref()))
            .any(|vcs| normalize_vcs_url(&vcs) != identity.key());
        if conflicting {
            let renamed = identity.vendor_and_name();
            tracing::info!(
                "Component {} exists with another VCS, importing {} as {}",
                candidate.name,
                identity,
                renamed
            );
            candidate.name = renamed;
        }

        let upserted = self.add_component(&candidate)?;
        let stored = self
            .catalog
            .component(&upserted.id)
            .map_err(|e| e.into_item_failure(EntityKind::Component, &candidate.name))?;
        Ok((stored, upserted))
    }

    fn upsert_member(&mut self, component: &Component, member: &BomComponent) -> BatchResult {
        let mut batch = BatchResult::new();
        let release = self.draft_release(component, member);
        let release_id = match self.add_release(&release) {
            Ok(upserted) => {
                batch.record(
                    EntityKind::Release,
                    &upserted,
                    self.prior.has_release(&upserted.id),
                );
                batch.release_ids.insert(upserted.id.clone());
                upserted.id
            }
            Err(err) => {
                batch.record_error(&err);
                return batch;
            }
        };

        match self.upsert_package(member, Some(&release_id)) {
            Ok(upserted) => {
                batch.record(
                    EntityKind::Package,
                    &upserted,
                    self.prior.has_package(&upserted.id),
                );
                batch.package_ids.insert(upserted.id);
            }
            Err(err) => batch.record_error(&err),
        }
        batch
    }

    // ------------------------------------------------------------------------
    // Release-only entries
    // ------------------------------------------------------------------------

    /// Import a BOM entry as a component named after it plus one release.
    pub fn upsert_release_only(&mut self, member: &BomComponent) -> BatchResult {
        let mut batch = BatchResult::new();
        let name = member.name.trim();
        if name.is_empty() {
            batch.record_error(&ReconcileError::invalid_item(
                EntityKind::Component,
                item_label(member),
                "component name is missing",
            ));
            return batch;
        }

        let observation = observe(member);
        let candidate = Component {
            kind: ComponentKind::Oss,
            cdx_component_type: observation.cdx_component_type,
            homepage: observation.homepage.clone(),
            mailing_list: observation.mailing_list.clone(),
            wiki: observation.wiki.clone(),
            ..Component::new(name)
        };
        let component = match self.add_component(&candidate).and_then(|upserted| {
            let stored = self
                .catalog
                .component(&upserted.id)
                .map_err(|e| e.into_item_failure(EntityKind::Component, name))?;
            Ok((stored, upserted))
        }) {
            Ok((stored, upserted)) => {
                batch.record(EntityKind::Component, &upserted, false);
                stored
            }
            Err(err) => {
                batch.record_error(&err);
                return batch;
            }
        };

        let release = with_identifiers(self.draft_release(&component, member), member);
        match self.add_release(&release) {
            Ok(upserted) => {
                batch.record(
                    EntityKind::Release,
                    &upserted,
                    self.prior.has_release(&upserted.id),
                );
                batch.release_ids.insert(upserted.id);
            }
            Err(err) => batch.record_error(&err),
        }

        if let Err(err) = self.merge_metadata(&component, &observation) {
            batch.record_error(&err);
        }
        batch
    }

    // ------------------------------------------------------------------------
    // Entries without VCS
    // ------------------------------------------------------------------------

    /// Import a BOM entry without VCS as a package with no release.
    ///
    /// When the package already exists and points at a release the project
    /// does not link yet, that release is linked and counted as reused.
    pub fn upsert_vcs_less_package(
        &mut self,
        member: &BomComponent,
        linked_releases: &BTreeSet<String>,
    ) -> BatchResult {
        let mut batch = BatchResult::new();
        let upserted = match self.upsert_package(member, None) {
            Ok(upserted) => upserted,
            Err(err) => {
                batch.record_error(&err);
                return batch;
            }
        };

        if !upserted.created {
            match self.catalog.package(&upserted.id) {
                Ok(existing) => {
                    if let Some(release_id) = non_blank(existing.release_id.as_deref()) {
                        let linked = self.prior.has_release(&release_id)
                            || linked_releases.contains(&release_id);
                        if !linked {
                            tracing::debug!(
                                "Linking release {} of existing package {}",
                                release_id,
                                existing.name
                            );
                            batch.record(
                                EntityKind::Release,
                                &Upserted::existing(release_id.clone()),
                                false,
                            );
                            batch.release_ids.insert(release_id);
                        }
                    }
                }
                Err(err) => {
                    batch.record_error(&err.into_item_failure(EntityKind::Package, &item_label(member)));
                    return batch;
                }
            }
        }

        batch.record(
            EntityKind::Package,
            &upserted,
            self.prior.has_package(&upserted.id),
        );
        batch.package_ids.insert(upserted.id);
        batch
    }

    // ------------------------------------------------------------------------
    // Single-entity steps
    // ------------------------------------------------------------------------

    fn add_component(&mut self, candidate: &Component) -> Result<Upserted> {
        let outcome = self
            .catalog
            .add_component(candidate, self.user)
            .map_err(|e| e.into_item_failure(EntityKind::Component, &candidate.name))?;
        let upserted = resolve(outcome, EntityKind::Component, &candidate.name)?;
        if upserted.created {
            tracing::info!("Created component {} ({})", candidate.name, upserted.id);
        } else {
            tracing::debug!("Reusing component {} ({})", candidate.name, upserted.id);
        }
        Ok(upserted)
    }

    fn draft_release(&self, component: &Component, member: &BomComponent) -> Release {
        Release {
            main_license_ids: license_ids(member),
            cpe: non_blank(member.cpe.as_deref()),
            creator_department: self.user.department.clone(),
            ..Release::new(component, member.version.as_deref().unwrap_or(""))
        }
    }

    fn add_release(&mut self, release: &Release) -> Result<Upserted> {
        if release.version.is_empty() {
            return Err(ReconcileError::invalid_item(
                EntityKind::Release,
                &release.name,
                "release version is missing",
            ));
        }
        let label = versioned_name(&release.name, &release.version);
        let outcome = self
            .catalog
            .add_release(release, self.user)
            .map_err(|e| e.into_item_failure(EntityKind::Release, &label))?;
        resolve(outcome, EntityKind::Release, &label)
    }

    /// Build the package a BOM entry describes.
    fn draft_package(&self, member: &BomComponent, release_id: Option<&str>) -> Result<Package> {
        let label = item_label(member);
        let Some(purl) = member.purl.as_deref().and_then(ParsedPurl::parse) else {
            return Err(ReconcileError::invalid_item(
                EntityKind::Package,
                label,
                "missing name or version or purl",
            ));
        };

        let version = purl
            .version
            .clone()
            .or_else(|| non_blank(member.version.as_deref()))
            .unwrap_or_default();
        let bom_name = member.name.trim();
        let name_taken = self
            .catalog
            .packages_by_name_and_version(bom_name, &version)
            .map_err(|e| e.into_item_failure(EntityKind::Package, &label))?
            .iter()
            .any(|existing| normalize_purl(&existing.purl) != purl.purl);
        let name = if name_taken {
            purl.disambiguated_name(member.group.as_deref(), member.publisher.as_deref())
        } else {
            bom_name.to_string()
        };

        Ok(Package {
            id: String::new(),
            name,
            version,
            package_type: match member.component_type {
                None => Some(CdxComponentType::Library),
                Some(_) => catalog_type(member),
            },
            package_manager: purl.package_manager(),
            description: non_blank(member.description.as_deref()),
            homepage: non_blank(member.first_reference(ExternalRefType::Website)),
            vcs: non_blank(member.first_reference(ExternalRefType::Vcs))
                .map(|url| VCS_SCHEME.replace(&url, "https://").into_owned()),
            license_ids: license_ids(member),
            release_id: release_id.map(str::to_string),
            purl: purl.purl,
        })
    }

    fn upsert_package(&mut self, member: &BomComponent, release_id: Option<&str>) -> Result<Upserted> {
        let draft = self.draft_package(member, release_id)?;
        let label = versioned_name(&draft.name, &draft.version);
        let outcome = self
            .catalog
            .add_package(&draft, self.user)
            .map_err(|e| e.into_item_failure(EntityKind::Package, &label))?;
        let upserted = resolve(outcome, EntityKind::Package, &label)?;

        if !upserted.created {
            if let Some(release_id) = release_id {
                self.backfill_release(&upserted.id, release_id)
                    .map_err(|e| e.into_item_failure(EntityKind::Package, &label))?;
            }
        }
        Ok(upserted)
    }

    /// Set the release of an existing package that has none. A different
    /// release already recorded is left in place.
    fn backfill_release(&mut self, package_id: &str, release_id: &str) -> Result<()> {
        let existing = self.catalog.package(package_id)?;
        match non_blank(existing.release_id.as_deref()) {
            None => {
                tracing::debug!("Linking package {} to release {}", existing.name, release_id);
                let updated = Package {
                    release_id: Some(release_id.to_string()),
                    ..existing
                };
                self.catalog.update_package(&updated, self.user)
            }
            Some(current) if current != release_id => {
                tracing::warn!(
                    "Release id of package {} from SBOM '{}' differs from catalog '{}', keeping catalog value",
                    existing.name,
                    release_id,
                    current
                );
                Ok(())
            }
            Some(_) => Ok(()),
        }
    }

    /// Apply observed metadata to a stored component, writing only on change.
    fn merge_metadata(
        &mut self,
        component: &Component,
        observation: &ComponentObservation,
    ) -> Result<()> {
        let next = component.merged_with(observation);
        if next == *component {
            return Ok(());
        }
        self.catalog
            .update_component(&next, self.user)
            .map_err(|e| e.into_item_failure(EntityKind::Component, &component.name))?;
        tracing::debug!("Updated component metadata of {}", component.name);
        Ok(())
    }
}
