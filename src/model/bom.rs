//! In-memory CycloneDX document model.
//!
//! This is the typed document the codec yields on import and consumes on
//! export. It carries only what reconciliation reads or writes.

use serde::{Deserialize, Serialize};

/// A decoded CycloneDX BOM.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BomDocument {
    /// Spec version (e.g. "1.6")
    pub spec_version: String,
    /// `urn:uuid:` serial number
    pub serial_number: Option<String>,
    /// BOM revision
    pub version: u32,
    pub metadata: Option<BomMetadata>,
    pub components: Vec<BomComponent>,
}

impl BomDocument {
    /// The component describing the BOM subject, if present.
    #[must_use]
    pub fn subject(&self) -> Option<&BomComponent> {
        self.metadata.as_ref().and_then(|m| m.component.as_ref())
    }
}

/// Document metadata block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BomMetadata {
    /// RFC 3339 timestamp
    pub timestamp: Option<String>,
    pub tools: Vec<BomTool>,
    pub component: Option<BomComponent>,
}

/// Tool that generated the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BomTool {
    pub vendor: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
}

/// One entry of the BOM component list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BomComponent {
    pub component_type: Option<BomComponentType>,
    pub bom_ref: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub group: Option<String>,
    pub name: String,
    pub version: Option<String>,
    pub description: Option<String>,
    /// Declared licenses
    pub licenses: Vec<BomLicense>,
    /// Licenses found as evidence
    pub evidence_licenses: Vec<BomLicense>,
    pub cpe: Option<String>,
    pub purl: Option<String>,
    pub external_refs: Vec<ExternalReference>,
    pub properties: Vec<Property>,
}

impl BomComponent {
    /// Create a component with a name and optional version.
    #[must_use]
    pub fn new(name: impl Into<String>, version: Option<&str>) -> Self {
        Self {
            name: name.into(),
            version: version.map(str::to_string),
            ..Self::default()
        }
    }

    /// Add a PURL
    #[must_use]
    pub fn with_purl(mut self, purl: impl Into<String>) -> Self {
        self.purl = Some(purl.into());
        self
    }

    /// Add an external reference
    #[must_use]
    pub fn with_external_ref(mut self, ref_type: ExternalRefType, url: impl Into<String>) -> Self {
        self.external_refs.push(ExternalReference::new(ref_type, url));
        self
    }

    /// Add a property
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.push(Property {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// URLs of all external references of the given type.
    pub fn reference_urls(&self, ref_type: ExternalRefType) -> impl Iterator<Item = &str> + '_ {
        self.external_refs
            .iter()
            .filter(move |r| r.ref_type == ref_type)
            .map(|r| r.url.as_str())
    }

    /// First external reference URL of the given type.
    #[must_use]
    pub fn first_reference(&self, ref_type: ExternalRefType) -> Option<&str> {
        self.reference_urls(ref_type).next()
    }

    /// Value of the first property with the given name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }

    /// "name (version)" label used in reports.
    #[must_use]
    pub fn versioned_name(&self) -> String {
        versioned_name(&self.name, self.version.as_deref().unwrap_or(""))
    }
}

/// Format a "name (version)" label.
#[must_use]
pub fn versioned_name(name: &str, version: &str) -> String {
    if version.trim().is_empty() {
        name.to_string()
    } else {
        format!("{name} ({version})")
    }
}

/// A license entry in a license choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BomLicense {
    /// SPDX license identifier
    Id(String),
    /// Free-form license name
    Name(String),
    /// SPDX license expression
    Expression(String),
}

impl BomLicense {
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Id(v) | Self::Name(v) | Self::Expression(v) => v,
        }
    }
}

/// External reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalReference {
    pub ref_type: ExternalRefType,
    pub url: String,
    pub comment: Option<String>,
}

impl ExternalReference {
    #[must_use]
    pub fn new(ref_type: ExternalRefType, url: impl Into<String>) -> Self {
        Self {
            ref_type,
            url: url.into(),
            comment: None,
        }
    }
}

/// External reference types that reconciliation distinguishes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExternalRefType {
    Vcs,
    Website,
    MailingList,
    Support,
    Other(String),
}

impl ExternalRefType {
    /// Parse a CycloneDX reference type string.
    #[must_use]
    pub fn from_cdx(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "vcs" => Self::Vcs,
            "website" => Self::Website,
            "mailing-list" => Self::MailingList,
            "support" => Self::Support,
            other => Self::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for ExternalRefType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vcs => write!(f, "vcs"),
            Self::Website => write!(f, "website"),
            Self::MailingList => write!(f, "mailing-list"),
            Self::Support => write!(f, "support"),
            Self::Other(s) => write!(f, "{s}"),
        }
    }
}

/// Free-form name/value property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub value: String,
}

/// CycloneDX component type as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BomComponentType {
    Application,
    Framework,
    Library,
    Container,
    Platform,
    OperatingSystem,
    Device,
    DeviceDriver,
    Firmware,
    File,
    MachineLearningModel,
    Data,
    CryptographicAsset,
}

impl BomComponentType {
    /// Parse a CycloneDX type string. Unknown strings yield `None`.
    #[must_use]
    pub fn from_cdx(value: &str) -> Option<Self> {
        let parsed = match value.trim().to_lowercase().as_str() {
            "application" => Self::Application,
            "framework" => Self::Framework,
            "library" => Self::Library,
            "container" => Self::Container,
            "platform" => Self::Platform,
            "operating-system" => Self::OperatingSystem,
            "device" => Self::Device,
            "device-driver" => Self::DeviceDriver,
            "firmware" => Self::Firmware,
            "file" => Self::File,
            "machine-learning-model" => Self::MachineLearningModel,
            "data" => Self::Data,
            "cryptographic-asset" => Self::CryptographicAsset,
            _ => return None,
        };
        Some(parsed)
    }

    #[must_use]
    pub const fn as_cdx(&self) -> &'static str {
        match self {
            Self::Application => "application",
            Self::Framework => "framework",
            Self::Library => "library",
            Self::Container => "container",
            Self::Platform => "platform",
            Self::OperatingSystem => "operating-system",
            Self::Device => "device",
            Self::DeviceDriver => "device-driver",
            Self::Firmware => "firmware",
            Self::File => "file",
            Self::MachineLearningModel => "machine-learning-model",
            Self::Data => "data",
            Self::CryptographicAsset => "cryptographic-asset",
        }
    }
}

impl std::fmt::Display for BomComponentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_cdx())
    }
}
