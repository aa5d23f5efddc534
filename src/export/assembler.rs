//! Document assembly for exports.

use crate::config::ToolConfig;
use crate::model::{BomComponent, BomComponentType, BomDocument, BomMetadata, BomTool, Project, User};
use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

/// Wraps mapped components into a complete document.
#[derive(Debug, Clone)]
pub struct BomAssembler {
    tool: ToolConfig,
    spec_version: String,
}

impl BomAssembler {
    #[must_use]
    pub fn new(tool: ToolConfig, spec_version: impl Into<String>) -> Self {
        Self {
            tool,
            spec_version: spec_version.into(),
        }
    }

    /// The metadata component describing `project`.
    #[must_use]
    pub fn subject(project: &Project, user: &User) -> BomComponent {
        BomComponent {
            component_type: Some(BomComponentType::Application),
            author: Some(user.email.clone()),
            group: Some(project.business_unit.clone().unwrap_or_default()),
            name: project.name.clone(),
            version: Some(project.version.clone()),
            description: Some(project.description.clone()),
            ..BomComponent::default()
        }
    }

    /// Assemble a document with a fresh serial number.
    #[must_use]
    pub fn assemble(
        &self,
        project: &Project,
        user: &User,
        components: Vec<BomComponent>,
        at: DateTime<Utc>,
    ) -> BomDocument {
        BomDocument {
            spec_version: self.spec_version.clone(),
            serial_number: Some(format!("urn:uuid:{}", Uuid::new_v4())),
            version: 1,
            metadata: Some(BomMetadata {
                timestamp: Some(at.to_rfc3339_opts(SecondsFormat::Secs, true)),
                tools: vec![BomTool {
                    vendor: Some(self.tool.vendor.clone()),
                    name: Some(self.tool.name.clone()),
                    version: Some(self.tool.version.clone()),
                }],
                component: Some(Self::subject(project, user)),
            }),
            components,
        }
    }
}
