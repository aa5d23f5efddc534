//! CLI command handlers.
//!
//! This module provides testable command handlers that are invoked by main.rs.
//! Each handler implements the business logic for a specific CLI subcommand.

mod export;
mod import;
mod inspect;

pub use export::{run_export, ExportOptions};
pub use import::{default_attachments_dir, run_import, ImportOptions};
pub use inspect::{run_group, run_normalize};

// Re-export config types used by handlers
pub use crate::config::{ImportConfig, ReconcileConfig};
