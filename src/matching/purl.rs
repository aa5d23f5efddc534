//! Package URL helpers.

use crate::model::PackageManager;
use packageurl::PackageUrl;
use std::str::FromStr;

/// Lower-case and trim a purl for storage and comparison.
#[must_use]
pub fn normalize_purl(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// The parts of a package URL that reconciliation reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPurl {
    /// Normalized purl string as given
    pub purl: String,
    pub purl_type: String,
    pub namespace: Option<String>,
    pub name: String,
    pub version: Option<String>,
}

impl ParsedPurl {
    /// Parse a purl after normalizing it. Returns `None` for malformed input.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let purl = normalize_purl(raw);
        if purl.is_empty() {
            return None;
        }
        let parsed = PackageUrl::from_str(&purl).ok()?;
        let name = parsed.name().trim().to_string();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            purl_type: parsed.ty().to_string(),
            namespace: parsed
                .namespace()
                .map(str::to_string)
                .filter(|ns| !ns.trim().is_empty()),
            version: parsed
                .version()
                .map(str::to_string)
                .filter(|v| !v.trim().is_empty()),
            name,
            purl,
        })
    }

    /// Package manager implied by the purl type.
    #[must_use]
    pub fn package_manager(&self) -> Option<PackageManager> {
        PackageManager::from_purl_type(&self.purl_type)
    }

    /// Name qualified by the purl type and the first available scope:
    /// namespace, then BOM group, then BOM publisher.
    #[must_use]
    pub fn disambiguated_name(&self, group: Option<&str>, publisher: Option<&str>) -> String {
        let scope = self
            .namespace
            .as_deref()
            .or(group)
            .or(publisher)
            .map(str::trim)
            .filter(|s| !s.is_empty());
        match scope {
            Some(scope) => format!("{}/{}/{}", self.purl_type, scope, self.name),
            None => format!("{}/{}", self.purl_type, self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_npm() {
        let purl = ParsedPurl::parse("  pkg:npm/Foo@1.0.0 ").expect("valid purl");
        assert_eq!(purl.purl, "pkg:npm/foo@1.0.0");
        assert_eq!(purl.purl_type, "npm");
        assert_eq!(purl.name, "foo");
        assert_eq!(purl.version.as_deref(), Some("1.0.0"));
        assert_eq!(purl.package_manager(), Some(PackageManager::Npm));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(ParsedPurl::parse("").is_none());
        assert!(ParsedPurl::parse("not-a-purl").is_none());
        assert!(ParsedPurl::parse("pkg:npm").is_none());
    }

    #[test]
    fn test_disambiguated_name() {
        let maven = ParsedPurl::parse("pkg:maven/org.apache/commons-io@2.11.0").expect("valid");
        assert_eq!(
            maven.disambiguated_name(Some("ignored"), None),
            "maven/org.apache/commons-io"
        );

        let npm = ParsedPurl::parse("pkg:npm/left-pad@1.3.0").expect("valid");
        assert_eq!(npm.disambiguated_name(Some("acme"), None), "npm/acme/left-pad");
        assert_eq!(npm.disambiguated_name(None, Some("ACME Inc")), "npm/ACME Inc/left-pad");
        assert_eq!(npm.disambiguated_name(Some(" "), None), "npm/left-pad");
    }
}
