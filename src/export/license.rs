//! SPDX license normalization for exported license choices.
//!
//! Uses the `spdx` crate's license list. Deprecated identifiers are mapped to
//! their `-only` / `-or-later` successors when the list has one.

use crate::model::{BomLicense, NO_ASSERTION};
use std::collections::BTreeSet;

/// Normalizes catalog license ids into CycloneDX license entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LicenseNormalizer {
    /// Drop ids that are not on the SPDX list instead of emitting them as names
    pub strict: bool,
}

impl Default for LicenseNormalizer {
    fn default() -> Self {
        Self { strict: true }
    }
}

impl LicenseNormalizer {
    #[must_use]
    pub const fn new(strict: bool) -> Self {
        Self { strict }
    }

    /// Normalize one license id.
    ///
    /// Returns `None` for blank ids, `noassertion`, and (in strict mode)
    /// ids the SPDX list does not know.
    #[must_use]
    pub fn normalize(&self, raw: &str) -> Option<BomLicense> {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case(NO_ASSERTION) {
            return None;
        }
        match spdx::license_id(raw) {
            Some(id) if id.is_deprecated() => Some(BomLicense::Id(replacement(raw))),
            Some(id) => Some(BomLicense::Id(id.name.to_string())),
            None if self.strict => {
                tracing::warn!("Skipping invalid SPDX license ID: {}", raw);
                None
            }
            None => Some(BomLicense::Name(raw.to_string())),
        }
    }

    /// License choice for a set of ids: SPDX ids first, then names, each
    /// sorted and de-duplicated.
    #[must_use]
    pub fn license_choice<'a>(&self, ids: impl IntoIterator<Item = &'a str>) -> Vec<BomLicense> {
        let mut spdx_ids = BTreeSet::new();
        let mut names = BTreeSet::new();
        for raw in ids {
            match self.normalize(raw) {
                Some(BomLicense::Id(id)) => {
                    spdx_ids.insert(id);
                }
                Some(BomLicense::Name(name)) => {
                    names.insert(name);
                }
                Some(BomLicense::Expression(_)) | None => {}
            }
        }
        spdx_ids
            .into_iter()
            .map(BomLicense::Id)
            .chain(names.into_iter().map(BomLicense::Name))
            .collect()
    }
}

/// Current equivalent of a deprecated id, or the id itself when there is none.
fn replacement(deprecated: &str) -> String {
    let candidate = match deprecated.strip_suffix('+') {
        Some(base) => format!("{base}-or-later"),
        None => format!("{deprecated}-only"),
    };
    match spdx::license_id(&candidate) {
        Some(id) if !id.is_deprecated() => {
            tracing::info!(
                "Normalized deprecated license ID: {} to {}",
                deprecated,
                id.name
            );
            id.name.to_string()
        }
        _ => {
            tracing::warn!(
                "Deprecated license ID {} found, but no replacement available",
                deprecated
            );
            deprecated.to_string()
        }
    }
}
