//! CycloneDX JSON/XML encoding.
//!
//! The output structs borrow from the [`BomDocument`]; element order in the
//! XML structs follows the CycloneDX schema sequence.

use super::format::BomFormat;
use crate::error::{ReconcileError, Result};
use crate::model::{BomComponent, BomDocument, BomLicense, BomTool};
use serde::Serialize;

const XML_NAMESPACE_PREFIX: &str = "http://cyclonedx.org/schema/bom/";

/// Encode a document in the given format.
pub fn write_bom(bom: &BomDocument, format: BomFormat) -> Result<String> {
    match format {
        BomFormat::Json => write_json(bom),
        BomFormat::Xml => write_xml(bom),
    }
}

fn write_json(bom: &BomDocument) -> Result<String> {
    let doc = CdxBomOut {
        bom_format: "CycloneDX",
        spec_version: &bom.spec_version,
        serial_number: bom.serial_number.as_deref(),
        version: bom.version,
        metadata: bom.metadata.as_ref().map(|m| CdxMetadataOut {
            timestamp: m.timestamp.as_deref(),
            tools: m.tools.iter().map(CdxToolOut::from).collect(),
            component: m.component.as_ref().map(CdxComponentOut::from),
        }),
        components: bom.components.iter().map(CdxComponentOut::from).collect(),
    };
    serde_json::to_string_pretty(&doc)
        .map_err(|e| ReconcileError::serialize(format!("CycloneDX JSON: {e}")))
}

fn write_xml(bom: &BomDocument) -> Result<String> {
    let doc = CdxBomXmlOut {
        xmlns: format!("{XML_NAMESPACE_PREFIX}{}", bom.spec_version),
        serial_number: bom.serial_number.as_deref(),
        version: bom.version,
        metadata: bom.metadata.as_ref().map(|m| CdxMetadataXmlOut {
            timestamp: m.timestamp.as_deref(),
            tools: (!m.tools.is_empty()).then(|| CdxToolsXmlOut {
                tool: m.tools.iter().map(CdxToolOut::from).collect(),
            }),
            component: m.component.as_ref().map(CdxComponentXmlOut::from),
        }),
        components: CdxComponentsXmlOut {
            component: bom.components.iter().map(CdxComponentXmlOut::from).collect(),
        },
    };

    let mut body = String::new();
    let mut serializer = quick_xml::se::Serializer::new(&mut body);
    serializer.indent(' ', 2);
    doc.serialize(serializer)
        .map_err(|e| ReconcileError::serialize(format!("CycloneDX XML: {e}")))?;

    Ok(format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{body}"))
}

// CycloneDX JSON structures for serialization

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CdxBomOut<'a> {
    bom_format: &'static str,
    spec_version: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    serial_number: Option<&'a str>,
    version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<CdxMetadataOut<'a>>,
    components: Vec<CdxComponentOut<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CdxMetadataOut<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<CdxToolOut<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    component: Option<CdxComponentOut<'a>>,
}

/// Legacy tool entry, valid in every supported spec version
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CdxToolOut<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    vendor: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<&'a str>,
}

impl<'a> From<&'a BomTool> for CdxToolOut<'a> {
    fn from(tool: &'a BomTool) -> Self {
        Self {
            vendor: tool.vendor.as_deref(),
            name: tool.name.as_deref(),
            version: tool.version.as_deref(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CdxComponentOut<'a> {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    component_type: Option<&'static str>,
    #[serde(rename = "bom-ref", skip_serializing_if = "Option::is_none")]
    bom_ref: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    publisher: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<&'a str>,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    licenses: Vec<CdxLicenseChoiceOut<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cpe: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    purl: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    external_references: Vec<CdxExternalReferenceOut<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    properties: Vec<CdxPropertyOut<'a>>,
}

impl<'a> From<&'a BomComponent> for CdxComponentOut<'a> {
    fn from(c: &'a BomComponent) -> Self {
        Self {
            component_type: c.component_type.map(|t| t.as_cdx()),
            bom_ref: c.bom_ref.as_deref(),
            author: c.author.as_deref(),
            publisher: c.publisher.as_deref(),
            group: c.group.as_deref(),
            name: &c.name,
            version: c.version.as_deref(),
            description: c.description.as_deref(),
            licenses: c.licenses.iter().map(CdxLicenseChoiceOut::from).collect(),
            cpe: c.cpe.as_deref(),
            purl: c.purl.as_deref(),
            external_references: c
                .external_refs
                .iter()
                .map(|r| CdxExternalReferenceOut {
                    ref_type: r.ref_type.to_string(),
                    url: &r.url,
                })
                .collect(),
            properties: c
                .properties
                .iter()
                .map(|p| CdxPropertyOut {
                    name: &p.name,
                    value: &p.value,
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CdxLicenseChoiceOut<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    license: Option<CdxLicenseOut<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expression: Option<&'a str>,
}

impl<'a> From<&'a BomLicense> for CdxLicenseChoiceOut<'a> {
    fn from(license: &'a BomLicense) -> Self {
        match license {
            BomLicense::Expression(expr) => Self {
                license: None,
                expression: Some(expr),
            },
            other => Self {
                license: Some(CdxLicenseOut::from(other)),
                expression: None,
            },
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CdxLicenseOut<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

impl<'a> From<&'a BomLicense> for CdxLicenseOut<'a> {
    fn from(license: &'a BomLicense) -> Self {
        match license {
            BomLicense::Id(id) => Self {
                id: Some(id),
                name: None,
            },
            BomLicense::Name(name) | BomLicense::Expression(name) => Self {
                id: None,
                name: Some(name),
            },
        }
    }
}

#[derive(Serialize)]
struct CdxExternalReferenceOut<'a> {
    #[serde(rename = "type")]
    ref_type: String,
    url: &'a str,
}

#[derive(Serialize)]
struct CdxPropertyOut<'a> {
    name: &'a str,
    value: &'a str,
}

// =============================================================================
// CycloneDX XML structures for serialization
// =============================================================================

#[derive(Serialize)]
#[serde(rename = "bom")]
struct CdxBomXmlOut<'a> {
    #[serde(rename = "@xmlns")]
    xmlns: String,
    #[serde(rename = "@serialNumber", skip_serializing_if = "Option::is_none")]
    serial_number: Option<&'a str>,
    #[serde(rename = "@version")]
    version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<CdxMetadataXmlOut<'a>>,
    components: CdxComponentsXmlOut<'a>,
}

#[derive(Serialize)]
struct CdxMetadataXmlOut<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<CdxToolsXmlOut<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    component: Option<CdxComponentXmlOut<'a>>,
}

#[derive(Serialize)]
struct CdxToolsXmlOut<'a> {
    tool: Vec<CdxToolOut<'a>>,
}

#[derive(Serialize)]
struct CdxComponentsXmlOut<'a> {
    component: Vec<CdxComponentXmlOut<'a>>,
}

#[derive(Serialize)]
struct CdxComponentXmlOut<'a> {
    #[serde(rename = "@type", skip_serializing_if = "Option::is_none")]
    component_type: Option<&'static str>,
    #[serde(rename = "@bom-ref", skip_serializing_if = "Option::is_none")]
    bom_ref: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    publisher: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<&'a str>,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    licenses: Option<CdxLicensesXmlOut<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cpe: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    purl: Option<&'a str>,
    #[serde(rename = "externalReferences", skip_serializing_if = "Option::is_none")]
    external_references: Option<CdxExternalReferencesXmlOut<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    properties: Option<CdxPropertiesXmlOut<'a>>,
}

impl<'a> From<&'a BomComponent> for CdxComponentXmlOut<'a> {
    fn from(c: &'a BomComponent) -> Self {
        Self {
            component_type: c.component_type.map(|t| t.as_cdx()),
            bom_ref: c.bom_ref.as_deref(),
            author: c.author.as_deref(),
            publisher: c.publisher.as_deref(),
            group: c.group.as_deref(),
            name: &c.name,
            version: c.version.as_deref(),
            description: c.description.as_deref(),
            licenses: (!c.licenses.is_empty()).then(|| CdxLicensesXmlOut {
                licenses: c
                    .licenses
                    .iter()
                    .map(|l| match l {
                        BomLicense::Expression(expr) => CdxLicenseChoiceXmlOut::Expression(expr),
                        other => CdxLicenseChoiceXmlOut::License(CdxLicenseOut::from(other)),
                    })
                    .collect(),
            }),
            cpe: c.cpe.as_deref(),
            purl: c.purl.as_deref(),
            external_references: (!c.external_refs.is_empty()).then(|| {
                CdxExternalReferencesXmlOut {
                    reference: c
                        .external_refs
                        .iter()
                        .map(|r| CdxExternalReferenceXmlOut {
                            ref_type: r.ref_type.to_string(),
                            url: &r.url,
                        })
                        .collect(),
                }
            }),
            properties: (!c.properties.is_empty()).then(|| CdxPropertiesXmlOut {
                property: c
                    .properties
                    .iter()
                    .map(|p| CdxPropertyXmlOut {
                        name: &p.name,
                        value: &p.value,
                    })
                    .collect(),
            }),
        }
    }
}

#[derive(Serialize)]
struct CdxLicensesXmlOut<'a> {
    #[serde(rename = "$value")]
    licenses: Vec<CdxLicenseChoiceXmlOut<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "lowercase")]
enum CdxLicenseChoiceXmlOut<'a> {
    License(CdxLicenseOut<'a>),
    Expression(&'a str),
}

#[derive(Serialize)]
struct CdxExternalReferencesXmlOut<'a> {
    reference: Vec<CdxExternalReferenceXmlOut<'a>>,
}

#[derive(Serialize)]
struct CdxExternalReferenceXmlOut<'a> {
    #[serde(rename = "@type")]
    ref_type: String,
    url: &'a str,
}

#[derive(Serialize)]
struct CdxPropertiesXmlOut<'a> {
    property: Vec<CdxPropertyXmlOut<'a>>,
}

#[derive(Serialize)]
struct CdxPropertyXmlOut<'a> {
    #[serde(rename = "@name")]
    name: &'a str,
    #[serde(rename = "$text")]
    value: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BomComponentType, BomMetadata, ExternalRefType};

    fn sample() -> BomDocument {
        let mut component = BomComponent::new("foo", Some("1.0.0"))
            .with_purl("pkg:npm/foo@1.0.0")
            .with_external_ref(ExternalRefType::Vcs, "https://github.com/acme/foo");
        component.component_type = Some(BomComponentType::Library);
        component.licenses = vec![
            BomLicense::Id("MIT".to_string()),
            BomLicense::Name("Custom License".to_string()),
        ];

        BomDocument {
            spec_version: "1.6".to_string(),
            serial_number: Some("urn:uuid:3e671687-395b-41f5-a30f-a58921a69b79".to_string()),
            version: 1,
            metadata: Some(BomMetadata {
                timestamp: Some("2024-01-01T00:00:00Z".to_string()),
                tools: vec![BomTool {
                    vendor: Some("Eclipse Foundation".to_string()),
                    name: Some("SW360".to_string()),
                    version: None,
                }],
                component: Some(BomComponent::new("demo", Some("2.0"))),
            }),
            components: vec![component],
        }
    }

    #[test]
    fn test_json_shape() {
        let json = write_bom(&sample(), BomFormat::Json).expect("serializes");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");

        assert_eq!(value["bomFormat"], "CycloneDX");
        assert_eq!(value["specVersion"], "1.6");
        assert_eq!(value["metadata"]["tools"][0]["name"], "SW360");
        let foo = &value["components"][0];
        assert_eq!(foo["type"], "library");
        assert_eq!(foo["purl"], "pkg:npm/foo@1.0.0");
        assert_eq!(foo["licenses"][0]["license"]["id"], "MIT");
        assert_eq!(foo["licenses"][1]["license"]["name"], "Custom License");
        assert_eq!(foo["externalReferences"][0]["type"], "vcs");
        assert!(foo.get("cpe").is_none());
    }

    #[test]
    fn test_xml_shape() {
        let xml = write_bom(&sample(), BomFormat::Xml).expect("serializes");
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("xmlns=\"http://cyclonedx.org/schema/bom/1.6\""));
        assert!(xml.contains("<component type=\"library\">"));
        assert!(xml.contains("<id>MIT</id>"));
        assert!(xml.contains("<reference type=\"vcs\">"));
        assert!(xml.contains("<purl>pkg:npm/foo@1.0.0</purl>"));
    }
}
