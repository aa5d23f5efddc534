//! Import command handler.
//!
//! Implements the `import` subcommand: reconcile a CycloneDX file with a
//! catalog snapshot and print the import report.

use crate::catalog::FsAttachmentStore;
use crate::config::ReconcileConfig;
use crate::model::User;
use crate::pipeline::{exit_code, load_snapshot, save_snapshot, write_output, OutputTarget};
use crate::reconcile::{BomImporter, ImportRequest, ImportSummary};
use anyhow::{Context, Result};
use serde_json::json;
use std::path::{Path, PathBuf};

/// Options of the `import` subcommand.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub bom: PathBuf,
    pub catalog: PathBuf,
    pub project_id: Option<String>,
    /// Attachment directory; defaults to `attachments/` next to the catalog
    pub attachments_dir: Option<PathBuf>,
    pub user: User,
    pub output_file: Option<PathBuf>,
    pub quiet: bool,
}

/// Directory used for attachments when none is given.
#[must_use]
pub fn default_attachments_dir(catalog: &Path) -> PathBuf {
    catalog
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("attachments")
}

/// Run the import command, returning the desired exit code.
///
/// The catalog snapshot is saved after every import that reached the
/// catalog, including partially failed ones.
#[allow(clippy::needless_pass_by_value)]
pub fn run_import(options: ImportOptions, config: &ReconcileConfig) -> Result<i32> {
    let content = std::fs::read(&options.bom)
        .with_context(|| format!("Failed to read SBOM {:?}", options.bom))?;
    let file_name = options
        .bom
        .file_name()
        .and_then(|n| n.to_str())
        .context("SBOM path has no file name")?;

    let mut snapshot = load_snapshot(&options.catalog)?;
    let attachments_dir = options
        .attachments_dir
        .clone()
        .unwrap_or_else(|| default_attachments_dir(&options.catalog));
    let mut attachments = FsAttachmentStore::new(attachments_dir)?;

    let summary = {
        let mut importer = BomImporter::new(
            &mut snapshot.catalog,
            &mut snapshot.projects,
            &mut attachments,
            config,
        )?;
        importer.import(&ImportRequest {
            file_name,
            content: &content,
            project_id: options.project_id.as_deref(),
            user: &options.user,
        })
    };

    if summary.report.is_some() {
        save_snapshot(&snapshot, &options.catalog)?;
    }

    if !options.quiet {
        if summary.is_success() {
            tracing::info!("{}", summary.message);
        } else {
            tracing::warn!("Import finished with {}: {}", summary.status, summary.message);
        }
    }

    let target = OutputTarget::from_option(options.output_file);
    write_output(&summary_json(&summary)?, &target, options.quiet)?;
    Ok(exit_code(summary.status))
}

fn summary_json(summary: &ImportSummary) -> Result<String> {
    let value = json!({
        "status": summary.status,
        "message": summary.message,
        "report": summary.report,
    });
    serde_json::to_string_pretty(&value).context("Failed to serialize import summary")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::RequestStatus;

    #[test]
    fn test_default_attachments_dir() {
        assert_eq!(
            default_attachments_dir(Path::new("/data/catalog.json")),
            PathBuf::from("/data/attachments")
        );
        assert_eq!(
            default_attachments_dir(Path::new("catalog.json")),
            PathBuf::from("attachments")
        );
    }

    #[test]
    fn test_summary_json_without_report() {
        let summary = ImportSummary {
            status: RequestStatus::AccessDenied,
            message: "ADMIN".to_string(),
            report: None,
        };
        let value: serde_json::Value = serde_json::from_str(&summary_json(&summary).unwrap()).unwrap();
        assert_eq!(value["status"], "ACCESS_DENIED");
        assert!(value["report"].is_null());
    }
}
