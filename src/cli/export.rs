//! Export command handler.
//!
//! Implements the `export` subcommand: write a project of a catalog snapshot
//! as a CycloneDX document.

use super::import::default_attachments_dir;
use crate::catalog::FsAttachmentStore;
use crate::codec::BomFormat;
use crate::config::ReconcileConfig;
use crate::export::{BomExporter, ExportRequest};
use crate::model::User;
use crate::pipeline::{exit_code, load_snapshot, save_snapshot, write_output, OutputTarget};
use anyhow::Result;
use std::path::PathBuf;

/// Options of the `export` subcommand.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub project_id: String,
    pub catalog: PathBuf,
    pub format: BomFormat,
    pub attachments_dir: Option<PathBuf>,
    pub user: User,
    pub output_file: Option<PathBuf>,
    pub quiet: bool,
}

/// Run the export command, returning the desired exit code.
#[allow(clippy::needless_pass_by_value)]
pub fn run_export(options: ExportOptions, config: &ReconcileConfig) -> Result<i32> {
    let mut snapshot = load_snapshot(&options.catalog)?;
    let attachments_dir = options
        .attachments_dir
        .clone()
        .unwrap_or_else(|| default_attachments_dir(&options.catalog));
    let mut attachments = FsAttachmentStore::new(attachments_dir)?;

    let summary = {
        let mut exporter = BomExporter::new(
            &snapshot.catalog,
            &mut snapshot.projects,
            &mut attachments,
            config,
        )?;
        exporter.export(&ExportRequest {
            project_id: &options.project_id,
            format: options.format,
            user: &options.user,
        })
    };

    let Some(content) = summary.content.as_deref() else {
        tracing::warn!("Export finished with {}: {}", summary.status, summary.message);
        return Ok(exit_code(summary.status));
    };

    if config.export.attach_to_project {
        save_snapshot(&snapshot, &options.catalog)?;
    }
    if !options.quiet {
        tracing::info!("{}", summary.message);
    }
    let target = OutputTarget::from_option(options.output_file);
    write_output(content, &target, options.quiet)?;
    Ok(exit_code(summary.status))
}
