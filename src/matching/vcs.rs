//! VCS URL normalization.
//!
//! Repository URLs reach a BOM in many spellings (`git+https://`, scp-style
//! `git@host:path`, trailing `.git`, `/tree/<branch>` sub-paths, …). This
//! module reduces them to a canonical, scheme-less identity key such as
//! `github.com/acme/foo` that is stable under those differences and is used
//! to group and deduplicate components.
//!
//! Normalization never fails: input that cannot be read as a repository URL
//! is returned trimmed and otherwise unchanged.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static SCM_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^scm:[a-z0-9]+:").expect("static regex"));

static SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9+.\-]*://").expect("static regex"));

static SCP_LIKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@/:\s]+@([^/:\s]+):(.*)$").expect("static regex"));

static HOST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9](?:[a-z0-9\-]*[a-z0-9])?(?:\.[a-z0-9](?:[a-z0-9\-]*[a-z0-9])?)*$")
        .expect("static regex")
});

/// Hosts with a known repository path layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KnownHost {
    /// `<owner>/<repo>`
    GitHub,
    /// `<owner>/<repo>`
    Bitbucket,
    /// nested groups, up to the `-` separator
    GitLab,
    /// `<project>/<repo>[/<sub>]`
    OpenSourceGoogle,
    /// `<repo>`
    GoogleSource,
    /// `project/<name>`
    PyPi,
}

impl KnownHost {
    fn from_host(host: &str) -> Option<Self> {
        match host {
            "github.com" => Some(Self::GitHub),
            "bitbucket.org" => Some(Self::Bitbucket),
            "gitlab.com" => Some(Self::GitLab),
            "cs.opensource.google" => Some(Self::OpenSourceGoogle),
            "go.googlesource.com" => Some(Self::GoogleSource),
            "pypi.org" => Some(Self::PyPi),
            _ => None,
        }
    }

    /// Repository-identifying prefix of the path, or `None` when the path is
    /// too short for this host's layout.
    fn select(self, segments: &[String]) -> Option<Vec<String>> {
        match self {
            Self::GitHub | Self::Bitbucket => {
                (segments.len() >= 2).then(|| segments[..2].to_vec())
            }
            Self::GitLab => {
                let repo: Vec<String> = segments
                    .iter()
                    .take_while(|s| s.as_str() != "-")
                    .cloned()
                    .collect();
                (!repo.is_empty()).then_some(repo)
            }
            Self::OpenSourceGoogle => {
                if segments.len() < 2 {
                    return None;
                }
                let mut repo = segments[..2].to_vec();
                if let Some(third) = segments.get(2) {
                    if third != "+" {
                        repo.push(third.clone());
                    }
                }
                Some(repo)
            }
            Self::GoogleSource => segments.first().map(|s| vec![s.clone()]),
            Self::PyPi => segments
                .get(1)
                .map(|name| vec!["project".to_string(), name.clone()]),
        }
    }
}

/// Canonical identity of a source repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VcsIdentity {
    host: String,
    segments: Vec<String>,
}

impl VcsIdentity {
    /// Parse a raw repository URL. Returns `None` when no host and
    /// repository path can be recognized.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let lowered = raw.trim().to_lowercase();
        let unprefixed = SCM_PREFIX.replace(&lowered, "");

        let (authority, path) = if let Some(scheme) = SCHEME.find(&unprefixed) {
            split_authority(&unprefixed[scheme.end()..])
        } else if let Some(caps) = SCP_LIKE.captures(&unprefixed) {
            (caps[1].to_string(), strip_query(&caps[2]).to_string())
        } else {
            split_authority(&unprefixed)
        };

        let host = host_of(&authority)?;
        let segments = path_segments(&path);
        let selected = KnownHost::from_host(&host)
            .and_then(|known| known.select(&segments))
            .unwrap_or(segments);
        let segments = strip_git_suffix(selected);

        if segments.is_empty() {
            return None;
        }
        Some(Self { host, segments })
    }

    /// Scheme-less identity key, e.g. `github.com/acme/foo`.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}/{}", self.host, self.segments.join("/"))
    }

    /// HTTPS url of the repository.
    #[must_use]
    pub fn url(&self) -> String {
        format!("https://{}", self.key())
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Last path segment, used as the component name.
    #[must_use]
    pub fn repo_name(&self) -> &str {
        self.segments.last().map_or("", String::as_str)
    }

    /// Path after the host (`acme/foo`), used to disambiguate component names.
    #[must_use]
    pub fn vendor_and_name(&self) -> String {
        self.segments.join("/")
    }
}

impl fmt::Display for VcsIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Normalize a repository URL to its identity key, or return it trimmed when
/// it cannot be parsed.
#[must_use]
pub fn normalize_vcs_url(raw: &str) -> String {
    VcsIdentity::parse(raw).map_or_else(|| raw.trim().to_string(), |id| id.key())
}

fn strip_query(s: &str) -> &str {
    s.find(['?', '#']).map_or(s, |idx| &s[..idx])
}

fn split_authority(rest: &str) -> (String, String) {
    let rest = strip_query(rest);
    match rest.split_once('/') {
        Some((authority, path)) => (authority.to_string(), path.to_string()),
        None => (rest.to_string(), String::new()),
    }
}

/// Host part of an authority with user info, port and `www.` removed.
fn host_of(authority: &str) -> Option<String> {
    let without_user = authority.rsplit('@').next().unwrap_or(authority);
    let mut host = without_user.split(':').next().unwrap_or(without_user).trim();
    while let Some(stripped) = host.strip_prefix("www.") {
        host = stripped;
    }
    let plausible = host.contains('.') || host == "localhost";
    (plausible && HOST.is_match(host)).then(|| host.to_string())
}

/// Non-empty, trimmed path segments up to and including the first one that
/// names a `.git` repository.
fn path_segments(path: &str) -> Vec<String> {
    let mut segments = Vec::new();
    for segment in path.split('/').map(str::trim).filter(|s| !s.is_empty()) {
        segments.push(segment.to_string());
        if segment.ends_with(".git") {
            break;
        }
    }
    segments
}

fn strip_git_suffix(mut segments: Vec<String>) -> Vec<String> {
    while let Some(last) = segments.last_mut() {
        let mut trimmed = last.as_str();
        while let Some(stripped) = trimmed.strip_suffix(".git") {
            trimmed = stripped.trim();
        }
        if trimmed.is_empty() {
            segments.pop();
        } else {
            *last = trimmed.to_string();
            break;
        }
    }
    segments
}
