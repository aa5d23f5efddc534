//! Catalog component type and its mapping to CycloneDX component types.
//!
//! The mapping is a single table read in both directions. `verify_type_table`
//! is run when an importer or exporter is constructed so that an incomplete
//! table fails loudly instead of silently dropping types.

use super::bom::BomComponentType;
use crate::error::{ReconcileError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Component type recorded on catalog components and packages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CdxComponentType {
    Application,
    Container,
    Device,
    File,
    Firmware,
    Framework,
    Library,
    OperatingSystem,
}

impl CdxComponentType {
    /// Every catalog variant.
    pub const ALL: [Self; 8] = [
        Self::Application,
        Self::Container,
        Self::Device,
        Self::File,
        Self::Firmware,
        Self::Framework,
        Self::Library,
        Self::OperatingSystem,
    ];

    /// Catalog type for a wire type, `None` for wire types the catalog has no slot for.
    #[must_use]
    pub fn from_bom(bom_type: BomComponentType) -> Option<Self> {
        TYPE_TABLE
            .iter()
            .find(|(_, wire)| *wire == bom_type)
            .map(|(catalog, _)| *catalog)
    }

    /// Wire type for this catalog type.
    #[must_use]
    pub fn to_bom(self) -> Option<BomComponentType> {
        TYPE_TABLE
            .iter()
            .find(|(catalog, _)| *catalog == self)
            .map(|(_, wire)| *wire)
    }
}

/// Bidirectional catalog/wire component type table.
const TYPE_TABLE: &[(CdxComponentType, BomComponentType)] = &[
    (CdxComponentType::Application, BomComponentType::Application),
    (CdxComponentType::Container, BomComponentType::Container),
    (CdxComponentType::Device, BomComponentType::Device),
    (CdxComponentType::File, BomComponentType::File),
    (CdxComponentType::Firmware, BomComponentType::Firmware),
    (CdxComponentType::Framework, BomComponentType::Framework),
    (CdxComponentType::Library, BomComponentType::Library),
    (
        CdxComponentType::OperatingSystem,
        BomComponentType::OperatingSystem,
    ),
];

/// Check that every catalog type maps to exactly one wire type and that no
/// wire type is claimed twice.
pub fn verify_type_table() -> Result<()> {
    verify_table(TYPE_TABLE)
}

fn verify_table(table: &[(CdxComponentType, BomComponentType)]) -> Result<()> {
    let mut seen_catalog = HashSet::new();
    let mut seen_wire = HashSet::new();
    for (catalog, wire) in table {
        if !seen_catalog.insert(*catalog) {
            return Err(ReconcileError::config(format!(
                "component type {catalog:?} is mapped more than once"
            )));
        }
        if !seen_wire.insert(*wire) {
            return Err(ReconcileError::config(format!(
                "CycloneDX type {wire} is mapped more than once"
            )));
        }
    }
    if let Some(missing) = CdxComponentType::ALL
        .iter()
        .find(|variant| !seen_catalog.contains(*variant))
    {
        return Err(ReconcileError::config(format!(
            "component type {missing:?} has no CycloneDX mapping"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_complete() {
        assert!(verify_type_table().is_ok());
    }

    #[test]
    fn test_every_variant_round_trips() {
        for variant in CdxComponentType::ALL {
            let wire = variant.to_bom().expect("every catalog type has a wire type");
            assert_eq!(CdxComponentType::from_bom(wire), Some(variant));
        }
    }

    #[test]
    fn test_unmapped_wire_types() {
        assert_eq!(CdxComponentType::from_bom(BomComponentType::Platform), None);
        assert_eq!(
            CdxComponentType::from_bom(BomComponentType::MachineLearningModel),
            None
        );
    }

    #[test]
    fn test_incomplete_table_is_rejected() {
        let partial = &TYPE_TABLE[..TYPE_TABLE.len() - 1];
        assert!(verify_table(partial).is_err());

        let doubled = [
            (CdxComponentType::Library, BomComponentType::Library),
            (CdxComponentType::Framework, BomComponentType::Library),
        ];
        assert!(verify_table(&doubled).is_err());
    }
}
