//! Shared plumbing for CLI command handlers.
//!
//! Loading and saving the catalog snapshot, writing results to stdout or a
//! file, and mapping request statuses to process exit codes.

mod output;

pub use output::{write_output, OutputTarget};

use crate::catalog::CatalogSnapshot;
use crate::reconcile::RequestStatus;
use anyhow::{Context, Result};
use std::path::Path;

/// Exit codes for CI/CD integration
pub mod exit_codes {
    /// Request succeeded
    pub const SUCCESS: i32 = 0;
    /// Request was rejected (access denied, duplicate, sanity check, invalid input or failure)
    pub const REJECTED: i32 = 1;
    /// An error occurred before a request could be made
    pub const ERROR: i32 = 3;
}

/// Exit code for a request status.
#[must_use]
pub const fn exit_code(status: RequestStatus) -> i32 {
    if status.is_success() {
        exit_codes::SUCCESS
    } else {
        exit_codes::REJECTED
    }
}

/// Load a catalog snapshot; a missing file is an empty catalog.
pub fn load_snapshot(path: &Path) -> Result<CatalogSnapshot> {
    CatalogSnapshot::load(path).with_context(|| format!("Failed to load catalog {path:?}"))
}

/// Persist a catalog snapshot.
pub fn save_snapshot(snapshot: &CatalogSnapshot, path: &Path) -> Result<()> {
    snapshot
        .save(path)
        .with_context(|| format!("Failed to save catalog {path:?}"))
}
