//! Template sources
//!
//! A packaging run starts from exactly one base package and at most one
//! overlay:
//!
//! - [`PackageSource::OfficialRelease`]: the canonical package for the
//!   selected agent(s)
//! - [`PackageSource::OverrideRepo`]: release assets of a replacement
//!   repository, used instead of the official package
//! - [`PackageSource::OverlayRepo`]: a repository whose files are laid over
//!   the official package
//! - [`PackageSource::OverlayPath`]: a local directory or ZIP archive laid
//!   over the official package
//!
//! Repositories are named with [`RepoId`], which accepts:
//! - `owner/name` and `github:owner/name` (GitHub)
//! - `https://host/owner/name.git`, `ssh://...`, `git@host:owner/name.git`
//! - `file:///path/to/repo` or an absolute path
//!
//! Each form takes an optional `#ref` suffix (branch, tag, or SHA).

pub mod archive;
pub mod locator;
pub mod releases;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Result, source};

pub use locator::{ReleaseProvider, RepositoryFetcher, SourceLocator};
pub use releases::{AssetNaming, LocalReleaseStore};

/// Where template files come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageSource {
    OfficialRelease,
    OverrideRepo(RepoId),
    OverlayRepo(RepoId),
    OverlayPath(PathBuf),
}

impl PackageSource {
    /// Whether this source is laid over a base package
    pub fn is_overlay(&self) -> bool {
        matches!(
            self,
            PackageSource::OverlayRepo(_) | PackageSource::OverlayPath(_)
        )
    }
}

impl fmt::Display for PackageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageSource::OfficialRelease => write!(f, "official release"),
            PackageSource::OverrideRepo(repo) => write!(f, "template repository {repo}"),
            PackageSource::OverlayRepo(repo) => write!(f, "overlay repository {repo}"),
            PackageSource::OverlayPath(path) => write!(f, "overlay path {}", path.display()),
        }
    }
}

/// Base package plus optional overlay for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePlan {
    pub base: PackageSource,
    pub overlay: Option<PackageSource>,
}

impl SourcePlan {
    /// Build a plan, rejecting combinations that cannot be honored.
    ///
    /// The base must be the official release or an override repository; the
    /// overlay must be an overlay repository or path. An override repository
    /// cannot be combined with an overlay.
    pub fn new(base: PackageSource, overlay: Option<PackageSource>) -> Result<Self> {
        if base.is_overlay() {
            return Err(source::conflicting(
                base.to_string(),
                "base package (an overlay cannot be the base)",
            ));
        }
        if let Some(overlay) = &overlay {
            if !overlay.is_overlay() {
                return Err(source::conflicting(base.to_string(), overlay.to_string()));
            }
            if matches!(base, PackageSource::OverrideRepo(_)) {
                return Err(source::conflicting(base.to_string(), overlay.to_string()));
            }
        }
        Ok(Self { base, overlay })
    }

    pub fn official() -> Self {
        Self {
            base: PackageSource::OfficialRelease,
            overlay: None,
        }
    }
}

impl Default for SourcePlan {
    fn default() -> Self {
        Self::official()
    }
}

/// A parsed repository identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoId {
    /// Clone URL (or absolute path for local repositories)
    pub url: String,

    /// Repository owner, when the form names one
    pub owner: Option<String>,

    pub name: String,

    /// Branch, tag, or SHA after `#`
    pub git_ref: Option<String>,

    input: String,
}

impl RepoId {
    /// Parse a repository identifier.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(source::invalid_repository(input));
        }

        let (location, git_ref) = match trimmed.rsplit_once('#') {
            Some((location, git_ref)) if !git_ref.is_empty() => {
                (location, Some(git_ref.to_string()))
            }
            Some((location, _)) => (location, None),
            None => (trimmed, None),
        };
        if location.is_empty() {
            return Err(source::invalid_repository(input));
        }

        let (url, owner, name) = if let Some(short) = location.strip_prefix("github:") {
            github_short_form(short).ok_or_else(|| source::invalid_repository(input))?
        } else if is_url(location) {
            url_parts(location).ok_or_else(|| source::invalid_repository(input))?
        } else if Path::new(location).is_absolute() {
            let name = Path::new(location)
                .file_name()
                .map(|n| n.to_string_lossy().trim_end_matches(".git").to_string())
                .filter(|n| !n.is_empty())
                .ok_or_else(|| source::invalid_repository(input))?;
            (location.to_string(), None, name)
        } else {
            github_short_form(location).ok_or_else(|| source::invalid_repository(input))?
        };

        Ok(Self {
            url,
            owner,
            name,
            git_ref,
            input: trimmed.to_string(),
        })
    }

    /// Owner used to group release assets; local repositories use `local`
    pub fn owner_or_local(&self) -> &str {
        self.owner.as_deref().unwrap_or("local")
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.input)
    }
}

fn is_url(location: &str) -> bool {
    ["https://", "http://", "ssh://", "git://", "file://", "git@"]
        .iter()
        .any(|scheme| location.starts_with(scheme))
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

fn github_short_form(location: &str) -> Option<(String, Option<String>, String)> {
    let (owner, name) = location.split_once('/')?;
    let name = name.strip_suffix(".git").unwrap_or(name);
    if !is_valid_segment(owner) || !is_valid_segment(name) {
        return None;
    }
    Some((
        format!("https://github.com/{owner}/{name}.git"),
        Some(owner.to_string()),
        name.to_string(),
    ))
}

fn url_parts(location: &str) -> Option<(String, Option<String>, String)> {
    let path = if let Some(rest) = location.strip_prefix("git@") {
        rest.split_once(':')?.1
    } else {
        let (_, rest) = location.split_once("://")?;
        if location.starts_with("file://") {
            rest
        } else {
            rest.split_once('/')?.1
        }
    };

    let mut segments = path.trim_end_matches('/').rsplit('/').filter(|s| !s.is_empty());
    let name = segments.next()?.trim_end_matches(".git").to_string();
    if name.is_empty() {
        return None;
    }
    let owner = segments.next().map(str::to_string);
    Some((location.to_string(), owner, name))
}
