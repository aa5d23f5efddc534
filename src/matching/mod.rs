//! Identity resolution for BOM components.
//!
//! - [`vcs`]: canonical repository identities and URL normalization
//! - [`purl`]: package URL parsing and name disambiguation
//! - [`grouping`]: partitioning of a component list by repository identity
//!
//! # Example
//!
//! ```ignore
//! use sbom_reconcile::matching::{normalize_vcs_url, ComponentGrouping, NonPackageManagedFlag};
//!
//! assert_eq!(normalize_vcs_url("git@github.com:acme/foo.git"), "github.com/acme/foo");
//!
//! let grouping = ComponentGrouping::build(&bom.components, &NonPackageManagedFlag::default());
//! for group in grouping.groups.values() {
//!     println!("{}: {} members", group.identity, group.members.len());
//! }
//! ```

mod grouping;
mod purl;
mod vcs;

pub use grouping::{ComponentGrouping, NonPackageManagedFlag, VcsGroup};
pub use purl::{normalize_purl, ParsedPurl};
pub use vcs::{normalize_vcs_url, VcsIdentity};
