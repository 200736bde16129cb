//! Run configuration
//!
//! Source settings arrive from CLI flags and from the environment:
//!
//! | Flag                       | Environment variable              |
//! |----------------------------|-----------------------------------|
//! | `--template-repo`          | `SPECIFY_TEMPLATE_REPO`           |
//! | `--template-overlay-repo`  | `SPECIFY_TEMPLATE_OVERLAY_REPO`   |
//! | `--template-overlay-path`  | `SPECIFY_TEMPLATE_OVERLAY_PATH`   |
//!
//! A flag wins over its variable. When any overlay flag is given, both
//! overlay variables are ignored. Empty values count as unset.
//!
//! The environment is passed in as a lookup function; nothing here reads
//! `std::env` directly.

use std::path::PathBuf;

use crate::agent::AgentSelection;
use crate::error::{Result, source};
use crate::packager::PackageOptions;
use crate::source::{LocalReleaseStore, PackageSource, RepoId, SourcePlan};
use crate::substitute::ScriptVariant;

pub const TEMPLATE_REPO_ENV: &str = "SPECIFY_TEMPLATE_REPO";
pub const OVERLAY_REPO_ENV: &str = "SPECIFY_TEMPLATE_OVERLAY_REPO";
pub const OVERLAY_PATH_ENV: &str = "SPECIFY_TEMPLATE_OVERLAY_PATH";

/// Unvalidated source settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceOptions {
    pub template_repo: Option<String>,
    pub overlay_repo: Option<String>,
    pub overlay_path: Option<PathBuf>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl SourceOptions {
    pub fn from_flags(
        template_repo: Option<String>,
        overlay_repo: Option<String>,
        overlay_path: Option<PathBuf>,
    ) -> Self {
        Self {
            template_repo: non_empty(template_repo),
            overlay_repo: non_empty(overlay_repo),
            overlay_path: overlay_path.filter(|p| !p.as_os_str().is_empty()),
        }
    }

    /// Fill settings not given as flags from `lookup`.
    pub fn with_env<F>(self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |name: &str| non_empty(lookup(name));

        let template_repo = self.template_repo.or_else(|| env(TEMPLATE_REPO_ENV));
        let (overlay_repo, overlay_path) = if self.overlay_repo.is_some() || self.overlay_path.is_some() {
            (self.overlay_repo, self.overlay_path)
        } else {
            (env(OVERLAY_REPO_ENV), env(OVERLAY_PATH_ENV).map(PathBuf::from))
        };

        Self {
            template_repo,
            overlay_repo,
            overlay_path,
        }
    }

    /// Validate into a [`SourcePlan`].
    pub fn resolve(&self) -> Result<SourcePlan> {
        if let (Some(repo), Some(path)) = (&self.overlay_repo, &self.overlay_path) {
            return Err(source::conflicting(
                format!("overlay repository {repo}"),
                format!("overlay path {}", path.display()),
            ));
        }

        let base = match &self.template_repo {
            Some(repo) => PackageSource::OverrideRepo(RepoId::parse(repo)?),
            None => PackageSource::OfficialRelease,
        };

        let overlay = match (&self.overlay_repo, &self.overlay_path) {
            (Some(repo), None) => Some(PackageSource::OverlayRepo(RepoId::parse(repo)?)),
            (None, Some(path)) => Some(PackageSource::OverlayPath(path.clone())),
            _ => None,
        };

        SourcePlan::new(base, overlay)
    }
}

/// Everything one packaging run needs
#[derive(Debug, Clone)]
pub struct PackagingConfig {
    pub plan: SourcePlan,
    pub agents: AgentSelection,
    pub script: ScriptVariant,
    /// Directory receiving the packaged files
    pub out_dir: PathBuf,
    /// Directory or ZIP holding the official package
    pub official_package: PathBuf,
    /// Root of override release assets
    pub releases_dir: Option<PathBuf>,
    pub include_vscode_settings: bool,
}

impl PackagingConfig {
    pub fn package_options(&self) -> PackageOptions {
        PackageOptions {
            script: self.script,
            include_vscode_settings: self.include_vscode_settings,
        }
    }

    /// Release provider reading the configured local packages
    pub fn release_store(&self) -> LocalReleaseStore {
        let store = LocalReleaseStore::new(&self.official_package);
        match &self.releases_dir {
            Some(dir) => store.with_releases_dir(dir),
            None => store,
        }
    }
}
