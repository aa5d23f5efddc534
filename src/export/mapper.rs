//! Catalog entities to BOM components.

use super::license::LicenseNormalizer;
use crate::matching::ParsedPurl;
use crate::model::{
    BomComponent, BomComponentType, CdxComponentType, Component, ExternalRefType,
    ExternalReference, Package, Release, NULL_MARKER, PACKAGE_URL_KEY, PURL_ID_KEY,
};
use std::collections::{BTreeMap, BTreeSet};

/// Decode a purl value stored under an external id.
///
/// Accepts a JSON array of strings, a plain purl, or the `null` marker for
/// an explicitly unknown purl (which decodes to nothing).
#[must_use]
pub fn decode_purls(raw: &str) -> BTreeSet<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw == NULL_MARKER {
        return BTreeSet::new();
    }
    let values = serde_json::from_str::<Vec<String>>(raw).unwrap_or_else(|_| vec![raw.to_string()]);
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && v != NULL_MARKER)
        .collect()
}

fn purls_of(external_ids: &BTreeMap<String, String>) -> BTreeSet<String> {
    [PACKAGE_URL_KEY, PURL_ID_KEY]
        .iter()
        .filter_map(|key| external_ids.get(*key))
        .flat_map(|raw| decode_purls(raw))
        .collect()
}

/// Purl of an exported release.
///
/// Release external ids win; the component's are read only when the release
/// has none at all. Several purls are joined with `", "`.
#[must_use]
pub fn release_purl(release: &Release, component: Option<&Component>) -> Option<String> {
    let purls = if release.external_ids.is_empty() {
        component.map(|c| purls_of(&c.external_ids)).unwrap_or_default()
    } else {
        purls_of(&release.external_ids)
    };
    if purls.is_empty() {
        None
    } else {
        Some(purls.into_iter().collect::<Vec<_>>().join(", "))
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Wire type for a stored component type. Every stored type maps; an unset
/// one exports as `library`, since CycloneDX requires a type.
fn export_type(stored: Option<CdxComponentType>) -> BomComponentType {
    stored
        .and_then(CdxComponentType::to_bom)
        .unwrap_or(BomComponentType::Library)
}

fn push_ref(refs: &mut Vec<ExternalReference>, ref_type: ExternalRefType, url: Option<&str>) {
    if let Some(url) = non_blank(url) {
        refs.push(ExternalReference::new(ref_type, url));
    }
}

/// Maps stored packages and releases to BOM components.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComponentMapper {
    licenses: LicenseNormalizer,
}

impl ComponentMapper {
    #[must_use]
    pub const fn new(licenses: LicenseNormalizer) -> Self {
        Self { licenses }
    }

    /// BOM entry for a package. Unmapped or unset package types export as
    /// `library`.
    #[must_use]
    pub fn map_package(&self, package: &Package) -> BomComponent {
        let (name, purl) = match ParsedPurl::parse(&package.purl) {
            Some(parsed) => (parsed.name, Some(parsed.purl)),
            None => {
                tracing::error!("Malformed PURL for package: {}", package.name);
                (package.name.clone(), None)
            }
        };

        let mut external_refs = Vec::new();
        push_ref(&mut external_refs, ExternalRefType::Website, package.homepage.as_deref());
        push_ref(&mut external_refs, ExternalRefType::Vcs, package.vcs.as_deref());

        BomComponent {
            component_type: Some(export_type(package.package_type)),
            name,
            version: non_blank(Some(&package.version)),
            description: non_blank(package.description.as_deref()),
            licenses: self
                .licenses
                .license_choice(package.license_ids.iter().map(String::as_str)),
            purl,
            external_refs,
            ..BomComponent::default()
        }
    }

    /// BOM entry for a release and its owning component.
    ///
    /// The component type falls back to `library` when the component has none.
    #[must_use]
    pub fn map_release(&self, release: &Release, component: Option<&Component>) -> BomComponent {
        let vcs = release
            .repository
            .as_ref()
            .map(|r| r.url.as_str())
            .or_else(|| component.and_then(|c| c.vcs.as_deref()));

        let mut external_refs = Vec::new();
        push_ref(&mut external_refs, ExternalRefType::Vcs, vcs);
        if let Some(component) = component {
            push_ref(&mut external_refs, ExternalRefType::Website, component.homepage.as_deref());
            push_ref(
                &mut external_refs,
                ExternalRefType::MailingList,
                component.mailing_list.as_deref(),
            );
            push_ref(&mut external_refs, ExternalRefType::Support, component.wiki.as_deref());
        }

        let component_licenses = component
            .into_iter()
            .flat_map(|c| c.main_license_ids.iter());
        let license_ids = release
            .main_license_ids
            .iter()
            .chain(&release.other_license_ids)
            .chain(component_licenses)
            .map(String::as_str);

        BomComponent {
            component_type: Some(export_type(component.and_then(|c| c.cdx_component_type))),
            name: release.name.clone(),
            version: non_blank(Some(&release.version)),
            description: component.and_then(|c| non_blank(c.description.as_deref())),
            licenses: self.licenses.license_choice(license_ids),
            cpe: non_blank(release.cpe.as_deref()),
            purl: release_purl(release, component),
            external_refs,
            ..BomComponent::default()
        }
    }
}
