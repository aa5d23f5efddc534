//! Identifier vocabulary shared by import and export.

use serde::{Deserialize, Serialize};
use std::fmt;

/// External-id key holding a release's package URL.
pub const PACKAGE_URL_KEY: &str = "package-url";

/// Legacy external-id key for package URLs.
pub const PURL_ID_KEY: &str = "purl.id";

/// Marker stored under a purl key when the purl is explicitly unknown.
pub const NULL_MARKER: &str = "null";

/// License value meaning "no license information".
pub const NO_ASSERTION: &str = "noassertion";

/// Package manager, derived from the purl type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PackageManager {
    Alpine,
    Apk,
    Bitbucket,
    Cargo,
    Cocoapods,
    Composer,
    Conan,
    Conda,
    Cran,
    Deb,
    Docker,
    Gem,
    Generic,
    Github,
    Golang,
    Hackage,
    Hex,
    Maven,
    Npm,
    Nuget,
    Oci,
    Pub,
    Pypi,
    Rpm,
    Swift,
}

impl PackageManager {
    /// Parse a package manager from a purl type. Unknown types yield `None`.
    #[must_use]
    pub fn from_purl_type(purl_type: &str) -> Option<Self> {
        let manager = match purl_type.to_lowercase().as_str() {
            "alpine" => Self::Alpine,
            "apk" => Self::Apk,
            "bitbucket" => Self::Bitbucket,
            "cargo" => Self::Cargo,
            "cocoapods" => Self::Cocoapods,
            "composer" => Self::Composer,
            "conan" => Self::Conan,
            "conda" => Self::Conda,
            "cran" => Self::Cran,
            "deb" => Self::Deb,
            "docker" => Self::Docker,
            "gem" => Self::Gem,
            "generic" => Self::Generic,
            "github" => Self::Github,
            "golang" | "go" => Self::Golang,
            "hackage" => Self::Hackage,
            "hex" => Self::Hex,
            "maven" => Self::Maven,
            "npm" => Self::Npm,
            "nuget" => Self::Nuget,
            "oci" => Self::Oci,
            "pub" => Self::Pub,
            "pypi" => Self::Pypi,
            "rpm" => Self::Rpm,
            "swift" => Self::Swift,
            _ => return None,
        };
        Some(manager)
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Alpine => "alpine",
            Self::Apk => "apk",
            Self::Bitbucket => "bitbucket",
            Self::Cargo => "cargo",
            Self::Cocoapods => "cocoapods",
            Self::Composer => "composer",
            Self::Conan => "conan",
            Self::Conda => "conda",
            Self::Cran => "cran",
            Self::Deb => "deb",
            Self::Docker => "docker",
            Self::Gem => "gem",
            Self::Generic => "generic",
            Self::Github => "github",
            Self::Golang => "golang",
            Self::Hackage => "hackage",
            Self::Hex => "hex",
            Self::Maven => "maven",
            Self::Npm => "npm",
            Self::Nuget => "nuget",
            Self::Oci => "oci",
            Self::Pub => "pub",
            Self::Pypi => "pypi",
            Self::Rpm => "rpm",
            Self::Swift => "swift",
        };
        f.write_str(name)
    }
}
