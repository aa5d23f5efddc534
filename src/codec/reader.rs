//! CycloneDX JSON/XML decoding.
//!
//! Supports CycloneDX 1.4, 1.5 and 1.6 in JSON and XML formats. Only the
//! fields reconciliation reads are decoded; everything else is ignored.

use super::format::BomFormat;
use crate::error::{ParseErrorKind, ReconcileError, Result};
use crate::model::{
    BomComponent, BomComponentType, BomDocument, BomLicense, BomMetadata, BomTool,
    ExternalRefType, ExternalReference, Property,
};
use serde::Deserialize;

/// Decoder for CycloneDX documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct CycloneDxReader;

impl CycloneDxReader {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Decode raw bytes in the given format.
    pub fn read_bytes(&self, bytes: &[u8], format: BomFormat) -> Result<BomDocument> {
        let content = std::str::from_utf8(bytes).map_err(|e| {
            ReconcileError::parse(
                format!("SBOM is not valid UTF-8: {e}"),
                ParseErrorKind::UnknownFormat,
            )
        })?;
        self.read_str(content, format)
    }

    /// Decode a document in the given format.
    pub fn read_str(&self, content: &str, format: BomFormat) -> Result<BomDocument> {
        match format {
            BomFormat::Json => self.parse_json(content),
            BomFormat::Xml => self.parse_xml(content),
        }
    }

    /// Decode a document, detecting the format from its first character.
    pub fn read_auto(&self, content: &str) -> Result<BomDocument> {
        let format = BomFormat::sniff(content).ok_or_else(|| {
            ReconcileError::parse("detecting CycloneDX format", ParseErrorKind::UnknownFormat)
        })?;
        self.read_str(content, format)
    }

    fn parse_json(&self, content: &str) -> Result<BomDocument> {
        let cdx: CycloneDxBom = serde_json::from_str(content).map_err(|e| {
            ReconcileError::parse("CycloneDX JSON", ParseErrorKind::InvalidJson(e.to_string()))
        })?;
        Ok(convert_bom(cdx))
    }

    fn parse_xml(&self, content: &str) -> Result<BomDocument> {
        let cdx: CycloneDxBomXml = quick_xml::de::from_str(content).map_err(|e| {
            ReconcileError::parse("CycloneDX XML", ParseErrorKind::InvalidXml(e.to_string()))
        })?;

        let spec_version = cdx
            .xmlns
            .as_deref()
            .and_then(|ns| ns.rsplit('/').next())
            .filter(|v| v.starts_with('1'))
            .map(str::to_string);

        let bom = CycloneDxBom {
            spec_version,
            serial_number: cdx.serial_number,
            version: cdx.version,
            metadata: cdx.metadata.map(|m| {
                let mut tools = m.tools.as_ref().map(|t| t.tool.clone()).unwrap_or_default();
                if let Some(components) = m.tools.and_then(|t| t.components) {
                    tools.extend(components.component.into_iter().map(|c| CdxTool {
                        vendor: c.publisher.or(c.group),
                        name: Some(c.name),
                        version: c.version,
                    }));
                }
                CdxMetadata {
                    timestamp: m.timestamp,
                    tools: Some(tools),
                    component: m.component.map(CdxComponent::from),
                }
            }),
            components: cdx
                .components
                .map(|c| c.component.into_iter().map(CdxComponent::from).collect()),
        };

        Ok(convert_bom(bom))
    }
}

/// Decode a document in the given format.
pub fn read_bom(content: &str, format: BomFormat) -> Result<BomDocument> {
    CycloneDxReader::new().read_str(content, format)
}

fn convert_bom(cdx: CycloneDxBom) -> BomDocument {
    BomDocument {
        spec_version: cdx.spec_version.unwrap_or_else(|| "1.4".to_string()),
        serial_number: cdx.serial_number,
        version: cdx.version.unwrap_or(1),
        metadata: cdx.metadata.map(|m| BomMetadata {
            timestamp: m.timestamp,
            tools: m
                .tools
                .unwrap_or_default()
                .into_iter()
                .map(|t| BomTool {
                    vendor: t.vendor,
                    name: t.name,
                    version: t.version,
                })
                .collect(),
            component: m.component.map(convert_component),
        }),
        components: cdx
            .components
            .unwrap_or_default()
            .into_iter()
            .map(convert_component)
            .collect(),
    }
}

fn convert_component(cdx: CdxComponent) -> BomComponent {
    BomComponent {
        component_type: cdx.component_type.as_deref().and_then(BomComponentType::from_cdx),
        bom_ref: cdx.bom_ref,
        author: cdx.author,
        publisher: cdx.publisher,
        group: cdx.group,
        name: cdx.name,
        version: cdx.version,
        description: cdx.description,
        licenses: convert_licenses(cdx.licenses.unwrap_or_default()),
        evidence_licenses: convert_licenses(
            cdx.evidence
                .and_then(|e| e.licenses)
                .unwrap_or_default(),
        ),
        cpe: cdx.cpe,
        purl: cdx.purl,
        external_refs: cdx
            .external_references
            .unwrap_or_default()
            .into_iter()
            .map(|r| ExternalReference {
                ref_type: ExternalRefType::from_cdx(&r.ref_type),
                url: r.url,
                comment: r.comment,
            })
            .collect(),
        properties: cdx
            .properties
            .unwrap_or_default()
            .into_iter()
            .map(|p| Property {
                name: p.name,
                value: p.value.unwrap_or_default(),
            })
            .collect(),
    }
}

fn convert_licenses(choices: Vec<CdxLicenseChoice>) -> Vec<BomLicense> {
    let mut licenses = Vec::new();
    for choice in choices {
        if let Some(license) = choice.license {
            if let Some(id) = license.id {
                licenses.push(BomLicense::Id(id));
            } else if let Some(name) = license.name {
                licenses.push(BomLicense::Name(name));
            }
        }
        if let Some(expression) = choice.expression {
            licenses.push(BomLicense::Expression(expression));
        }
    }
    licenses
}

// CycloneDX JSON structures for deserialization

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CycloneDxBom {
    spec_version: Option<String>,
    serial_number: Option<String>,
    version: Option<u32>,
    metadata: Option<CdxMetadata>,
    components: Option<Vec<CdxComponent>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CdxMetadata {
    timestamp: Option<String>,
    /// Tools field - can be either array (1.4/1.5) or object with components (1.6)
    #[serde(default, deserialize_with = "deserialize_tools")]
    tools: Option<Vec<CdxTool>>,
    component: Option<CdxComponent>,
}

/// CycloneDX 1.6 tools object format
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CdxToolsObject {
    components: Option<Vec<CdxToolComponent>>,
    services: Option<Vec<CdxToolComponent>>,
}

/// Tool component or service in CycloneDX 1.6 format
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CdxToolComponent {
    name: Option<String>,
    version: Option<String>,
    group: Option<String>,
    publisher: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CdxTool {
    vendor: Option<String>,
    name: Option<String>,
    version: Option<String>,
}

/// Custom deserializer to handle both CycloneDX 1.4/1.5 (array) and 1.6 (object) tool formats
fn deserialize_tools<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<CdxTool>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, MapAccess, SeqAccess, Visitor};
    use std::fmt;

    struct ToolsVisitor;

    impl<'de> Visitor<'de> for ToolsVisitor {
        type Value = Option<Vec<CdxTool>>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("an array of tools or an object with components/services")
        }

        fn visit_none<E>(self) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: SeqAccess<'de>,
        {
            let mut tools = Vec::new();
            while let Some(tool) = seq.next_element::<CdxTool>()? {
                tools.push(tool);
            }
            Ok(Some(tools))
        }

        fn visit_map<M>(self, map: M) -> std::result::Result<Self::Value, M::Error>
        where
            M: MapAccess<'de>,
        {
            let tools_obj: CdxToolsObject =
                serde::Deserialize::deserialize(de::value::MapAccessDeserializer::new(map))?;

            let tools: Vec<CdxTool> = tools_obj
                .components
                .into_iter()
                .chain(tools_obj.services)
                .flatten()
                .map(|t| CdxTool {
                    vendor: t.publisher.or(t.group),
                    name: t.name,
                    version: t.version,
                })
                .collect();

            Ok(if tools.is_empty() { None } else { Some(tools) })
        }
    }

    deserializer.deserialize_any(ToolsVisitor)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CdxComponent {
    #[serde(rename = "type")]
    component_type: Option<String>,
    #[serde(alias = "bom-ref")]
    bom_ref: Option<String>,
    name: String,
    version: Option<String>,
    group: Option<String>,
    publisher: Option<String>,
    author: Option<String>,
    purl: Option<String>,
    cpe: Option<String>,
    description: Option<String>,
    licenses: Option<Vec<CdxLicenseChoice>>,
    evidence: Option<CdxEvidence>,
    external_references: Option<Vec<CdxExternalReference>>,
    properties: Option<Vec<CdxProperty>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CdxEvidence {
    licenses: Option<Vec<CdxLicenseChoice>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CdxLicenseChoice {
    license: Option<CdxLicense>,
    expression: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CdxLicense {
    id: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CdxExternalReference {
    #[serde(rename = "type")]
    ref_type: String,
    url: String,
    comment: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CdxProperty {
    name: String,
    value: Option<String>,
}

// =============================================================================
// CycloneDX XML structures for deserialization
// XML uses wrapper elements for collections (e.g., <components><component>...)
// =============================================================================

/// Root BOM element for XML format
#[derive(Debug, Deserialize)]
#[serde(rename = "bom")]
struct CycloneDxBomXml {
    /// Namespace, ending in the spec version (e.g. `http://cyclonedx.org/schema/bom/1.5`)
    #[serde(rename = "@xmlns")]
    xmlns: Option<String>,
    #[serde(rename = "@serialNumber")]
    serial_number: Option<String>,
    /// BOM revision
    #[serde(rename = "@version")]
    version: Option<u32>,
    metadata: Option<CdxMetadataXml>,
    components: Option<CdxComponentsXml>,
}

#[derive(Debug, Deserialize)]
struct CdxMetadataXml {
    timestamp: Option<String>,
    tools: Option<CdxToolsXml>,
    component: Option<CdxComponentXml>,
}

/// Tools wrapper: `<tool>` entries (1.4/1.5) or `<components>` (1.6)
#[derive(Debug, Deserialize)]
struct CdxToolsXml {
    #[serde(rename = "tool", default)]
    tool: Vec<CdxTool>,
    components: Option<CdxComponentsXml>,
}

#[derive(Debug, Deserialize)]
struct CdxComponentsXml {
    #[serde(rename = "component", default)]
    component: Vec<CdxComponentXml>,
}

#[derive(Debug, Deserialize)]
struct CdxComponentXml {
    #[serde(rename = "@type")]
    component_type: Option<String>,
    #[serde(rename = "@bom-ref")]
    bom_ref: Option<String>,
    name: String,
    version: Option<String>,
    group: Option<String>,
    publisher: Option<String>,
    author: Option<String>,
    purl: Option<String>,
    cpe: Option<String>,
    description: Option<String>,
    licenses: Option<CdxLicensesXml>,
    evidence: Option<CdxEvidenceXml>,
    #[serde(rename = "externalReferences")]
    external_references: Option<CdxExternalReferencesXml>,
    properties: Option<CdxPropertiesXml>,
}

impl From<CdxComponentXml> for CdxComponent {
    fn from(xml: CdxComponentXml) -> Self {
        Self {
            component_type: xml.component_type,
            bom_ref: xml.bom_ref,
            name: xml.name,
            version: xml.version,
            group: xml.group,
            publisher: xml.publisher,
            author: xml.author,
            purl: xml.purl,
            cpe: xml.cpe,
            description: xml.description,
            licenses: xml.licenses.map(CdxLicensesXml::into_choices),
            evidence: xml.evidence.map(|e| CdxEvidence {
                licenses: e.licenses.map(CdxLicensesXml::into_choices),
            }),
            external_references: xml.external_references.map(|refs| {
                refs.reference
                    .into_iter()
                    .map(|r| CdxExternalReference {
                        ref_type: r.ref_type,
                        url: r.url,
                        comment: r.comment,
                    })
                    .collect()
            }),
            properties: xml.properties.map(|props| {
                props
                    .property
                    .into_iter()
                    .map(|p| CdxProperty {
                        name: p.name,
                        value: Some(p.value),
                    })
                    .collect()
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CdxEvidenceXml {
    licenses: Option<CdxLicensesXml>,
}

/// Licenses wrapper holding `<license>` and `<expression>` children
#[derive(Debug, Deserialize)]
struct CdxLicensesXml {
    #[serde(rename = "$value", default)]
    licenses: Vec<CdxLicenseChoiceXml>,
}

impl CdxLicensesXml {
    fn into_choices(self) -> Vec<CdxLicenseChoice> {
        self.licenses
            .into_iter()
            .map(|choice| match choice {
                CdxLicenseChoiceXml::License(license) => CdxLicenseChoice {
                    license: Some(license),
                    expression: None,
                },
                CdxLicenseChoiceXml::Expression(expression) => CdxLicenseChoice {
                    license: None,
                    expression: Some(expression),
                },
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum CdxLicenseChoiceXml {
    License(CdxLicense),
    Expression(String),
}

#[derive(Debug, Deserialize)]
struct CdxExternalReferencesXml {
    #[serde(rename = "reference", default)]
    reference: Vec<CdxExternalReferenceXml>,
}

#[derive(Debug, Deserialize)]
struct CdxExternalReferenceXml {
    #[serde(rename = "@type")]
    ref_type: String,
    url: String,
    comment: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CdxPropertiesXml {
    #[serde(rename = "property", default)]
    property: Vec<CdxPropertyXml>,
}

#[derive(Debug, Deserialize)]
struct CdxPropertyXml {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "$text", default)]
    value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON_BOM: &str = r#"{
        "bomFormat": "CycloneDX",
        "specVersion": "1.6",
        "version": 3,
        "metadata": {
            "tools": {"components": [{"type": "application", "name": "syft", "version": "1.0"}]},
            "component": {"type": "application", "name": "demo", "version": "2.0"}
        },
        "components": [{
            "type": "library",
            "name": "foo",
            "version": "1.0.0",
            "purl": "pkg:npm/foo@1.0.0",
            "licenses": [{"license": {"id": "MIT"}}, {"expression": "Apache-2.0 OR MIT"}],
            "evidence": {"licenses": [{"license": {"name": "Custom"}}]},
            "externalReferences": [{"type": "vcs", "url": "https://github.com/acme/foo.git"}],
            "properties": [{"name": "nonPackageManaged", "value": "false"}]
        }]
    }"#;

    #[test]
    fn test_parse_json() {
        let bom = read_bom(JSON_BOM, BomFormat::Json).expect("valid JSON BOM");
        assert_eq!(bom.spec_version, "1.6");
        assert_eq!(bom.version, 3);
        assert_eq!(bom.subject().map(|c| c.name.as_str()), Some("demo"));
        let tools = &bom.metadata.as_ref().expect("metadata").tools;
        assert_eq!(tools[0].name.as_deref(), Some("syft"));

        let foo = &bom.components[0];
        assert_eq!(foo.component_type, Some(BomComponentType::Library));
        assert_eq!(
            foo.licenses,
            vec![
                BomLicense::Id("MIT".to_string()),
                BomLicense::Expression("Apache-2.0 OR MIT".to_string())
            ]
        );
        assert_eq!(foo.evidence_licenses, vec![BomLicense::Name("Custom".to_string())]);
        assert_eq!(
            foo.first_reference(ExternalRefType::Vcs),
            Some("https://github.com/acme/foo.git")
        );
        assert_eq!(foo.property("nonPackageManaged"), Some("false"));
    }

    #[test]
    fn test_legacy_tools_array() {
        let content = r#"{
            "specVersion": "1.4",
            "metadata": {"tools": [{"vendor": "acme", "name": "scanner", "version": "0.1"}]}
        }"#;
        let bom = read_bom(content, BomFormat::Json).expect("valid");
        let tool = &bom.metadata.expect("metadata").tools[0];
        assert_eq!(tool.vendor.as_deref(), Some("acme"));
        assert!(bom.components.is_empty());
    }

    #[test]
    fn test_parse_xml() {
        let content = r#"<?xml version="1.0" encoding="UTF-8"?>
<bom xmlns="http://cyclonedx.org/schema/bom/1.5" version="2">
  <metadata>
    <tools><tool><vendor>acme</vendor><name>scanner</name></tool></tools>
    <component type="application"><name>demo</name><version>2.0</version></component>
  </metadata>
  <components>
    <component type="library" bom-ref="foo">
      <name>foo</name>
      <version>1.0.0</version>
      <licenses>
        <license><id>MIT</id></license>
        <expression>BSD-3-Clause</expression>
      </licenses>
      <purl>pkg:npm/foo@1.0.0</purl>
      <externalReferences>
        <reference type="vcs"><url>https://github.com/acme/foo</url></reference>
      </externalReferences>
      <properties>
        <property name="nonPackageManaged">true</property>
      </properties>
    </component>
  </components>
</bom>"#;
        let bom = read_bom(content, BomFormat::Xml).expect("valid XML BOM");
        assert_eq!(bom.spec_version, "1.5");
        assert_eq!(bom.version, 2);
        assert_eq!(bom.subject().map(|c| c.name.as_str()), Some("demo"));

        let foo = &bom.components[0];
        assert_eq!(foo.bom_ref.as_deref(), Some("foo"));
        assert_eq!(foo.licenses.len(), 2);
        assert_eq!(foo.purl.as_deref(), Some("pkg:npm/foo@1.0.0"));
        assert_eq!(foo.property("nonPackageManaged"), Some("true"));
        assert_eq!(foo.reference_urls(ExternalRefType::Vcs).count(), 1);
    }

    #[test]
    fn test_malformed_input() {
        assert!(matches!(
            read_bom("{not json", BomFormat::Json),
            Err(ReconcileError::Parse { .. })
        ));
        assert!(matches!(
            CycloneDxReader::new().read_auto("plain text"),
            Err(ReconcileError::Parse { .. })
        ));
    }
}
