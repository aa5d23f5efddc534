//! Inspection command handlers.
//!
//! `normalize` prints canonical VCS identities; `group` prints how a BOM's
//! components would be grouped on import. Neither touches a catalog.

use crate::codec::{BomFormat, CycloneDxReader};
use crate::config::ImportConfig;
use crate::matching::{ComponentGrouping, VcsIdentity};
use crate::pipeline::{write_output, OutputTarget};
use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::path::PathBuf;

/// Run the normalize command: one `<input>\t<identity>` line per URL.
///
/// URLs that do not resolve to a repository identity print an empty identity.
pub fn run_normalize(urls: &[String], output_file: Option<PathBuf>) -> Result<()> {
    let lines: Vec<String> = urls
        .iter()
        .map(|url| {
            let identity = VcsIdentity::parse(url).map(|id| id.key()).unwrap_or_default();
            format!("{url}\t{identity}")
        })
        .collect();
    let target = OutputTarget::from_option(output_file);
    write_output(&lines.join("\n"), &target, false)
}

/// Run the group command: the VCS grouping of a BOM as JSON.
#[allow(clippy::needless_pass_by_value)]
pub fn run_group(bom: PathBuf, config: &ImportConfig, output_file: Option<PathBuf>) -> Result<()> {
    let file_name = bom.to_string_lossy().to_string();
    let content =
        std::fs::read(&bom).with_context(|| format!("Failed to read SBOM {bom:?}"))?;
    let format = BomFormat::from_file_name(&file_name)?;
    let document = CycloneDxReader::new().read_bytes(&content, format)?;

    let grouping =
        ComponentGrouping::build(&document.components, &config.non_package_managed_flag());
    if let Err(err) = grouping.check_consistency() {
        tracing::warn!("{}", err);
    }

    let target = OutputTarget::from_option(output_file);
    let rendered = serde_json::to_string_pretty(&grouping_json(&grouping))
        .context("Failed to serialize grouping")?;
    write_output(&rendered, &target, false)
}

fn grouping_json(grouping: &ComponentGrouping) -> Value {
    let groups: Vec<Value> = grouping
        .groups
        .values()
        .map(|group| {
            json!({
                "identity": group.identity.key(),
                "component": group.identity.repo_name(),
                "members": group.members.iter().map(|m| m.versioned_name()).collect::<Vec<_>>(),
            })
        })
        .collect();
    let names = |members: &[crate::model::BomComponent]| -> Vec<String> {
        members.iter().map(|m| m.versioned_name()).collect()
    };

    json!({
        "totalComponents": grouping.total_components,
        "distinctVcsCount": grouping.distinct_vcs_count,
        "groups": groups,
        "nonPackageManaged": names(&grouping.non_package_managed),
        "withoutVcs": names(&grouping.without_vcs),
        "invalidVcs": grouping.invalid_vcs,
        "nonPackageManagedWithoutVcs": grouping.non_package_managed_without_vcs,
    })
}
