//! Source location
//!
//! [`SourceLocator`] turns a [`PackageSource`] into a [`FileTree`]. Release
//! assets and repository clones are reached through the [`ReleaseProvider`]
//! and [`RepositoryFetcher`] traits so that callers (and tests) decide how
//! packages are actually obtained.

use tracing::{debug, info};

use crate::agent::AgentProfile;
use crate::error::{Result, source};
use crate::overlay;
use crate::substitute::ScriptVariant;
use crate::tree::FileTree;

use super::{PackageSource, RepoId, SourcePlan, archive};

/// Supplies packaged template releases
pub trait ReleaseProvider {
    /// The canonical package for the selected agents
    fn official(&self, agents: &[AgentProfile], script: ScriptVariant) -> Result<FileTree>;

    /// The release asset of `repo` built for one agent and script variant
    fn asset(&self, repo: &RepoId, agent: &AgentProfile, script: ScriptVariant) -> Result<FileTree>;
}

/// Supplies the working tree of a repository
pub trait RepositoryFetcher {
    fn fetch(&self, repo: &RepoId) -> Result<FileTree>;
}

/// Resolves package sources to file trees
pub struct SourceLocator<'a> {
    releases: &'a dyn ReleaseProvider,
    repositories: &'a dyn RepositoryFetcher,
}

impl<'a> SourceLocator<'a> {
    pub fn new(releases: &'a dyn ReleaseProvider, repositories: &'a dyn RepositoryFetcher) -> Self {
        Self {
            releases,
            repositories,
        }
    }

    /// Resolve a single source for the given agents and script variant.
    pub fn locate(
        &self,
        package_source: &PackageSource,
        agents: &[AgentProfile],
        script: ScriptVariant,
    ) -> Result<FileTree> {
        debug!(source = %package_source, agents = agents.len(), "Locating template source");

        match package_source {
            PackageSource::OfficialRelease => self.releases.official(agents, script),
            PackageSource::OverrideRepo(repo) => self.override_assets(repo, agents, script),
            PackageSource::OverlayRepo(repo) => self.repositories.fetch(repo),
            PackageSource::OverlayPath(path) => archive::read_package(path),
        }
    }

    /// Resolve the base package and optional overlay of `plan`.
    pub fn locate_plan(
        &self,
        plan: &SourcePlan,
        agents: &[AgentProfile],
        script: ScriptVariant,
    ) -> Result<(FileTree, Option<FileTree>)> {
        let base = self.locate(&plan.base, agents, script)?;
        info!(source = %plan.base, files = base.len(), "Resolved base package");

        let overlay = match &plan.overlay {
            Some(overlay_source) => {
                let tree = self.locate(overlay_source, agents, script)?;
                info!(source = %overlay_source, files = tree.len(), "Resolved overlay");
                Some(tree)
            }
            None => None,
        };

        Ok((base, overlay))
    }

    /// One asset per agent, combined in agent order.
    fn override_assets(
        &self,
        repo: &RepoId,
        agents: &[AgentProfile],
        script: ScriptVariant,
    ) -> Result<FileTree> {
        if agents.is_empty() {
            return Err(source::unavailable(repo.to_string(), "no agents selected"));
        }

        let mut combined = FileTree::new();
        for agent in agents {
            let asset = self.releases.asset(repo, agent, script)?;
            combined = overlay::merge(combined, Some(asset));
        }
        Ok(combined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentRegistry;
    use crate::error::TemplateError;
    use std::cell::RefCell;
    use std::path::PathBuf;

    #[derive(Default)]
    struct FakeReleases {
        requested: RefCell<Vec<String>>,
    }

    impl ReleaseProvider for FakeReleases {
        fn official(&self, _agents: &[AgentProfile], _script: ScriptVariant) -> Result<FileTree> {
            let mut tree = FileTree::new();
            tree.insert_text("templates/commands/plan.md", "official")?;
            Ok(tree)
        }

        fn asset(
            &self,
            repo: &RepoId,
            agent: &AgentProfile,
            script: ScriptVariant,
        ) -> Result<FileTree> {
            self.requested
                .borrow_mut()
                .push(format!("{}:{}:{}", repo.name, agent.id, script));
            if agent.id == "bob" {
                return Err(source::unavailable(repo.to_string(), "no asset for bob"));
            }
            let mut tree = FileTree::new();
            tree.insert_text(&agent.command_path("plan"), format!("{} plan", agent.id))?;
            tree.insert_text(".specify/memory/constitution.md", "shared")?;
            Ok(tree)
        }
    }

    struct FakeRepositories;

    impl RepositoryFetcher for FakeRepositories {
        fn fetch(&self, repo: &RepoId) -> Result<FileTree> {
            let mut tree = FileTree::new();
            tree.insert_text("templates/commands/plan.md", format!("from {}", repo.name))?;
            Ok(tree)
        }
    }

    fn agents(ids: &[&str]) -> Vec<AgentProfile> {
        let registry = AgentRegistry::default();
        ids.iter()
            .map(|id| registry.get(id).unwrap().clone())
            .collect()
    }

    #[test]
    fn test_locate_official() {
        let releases = FakeReleases::default();
        let locator = SourceLocator::new(&releases, &FakeRepositories);
        let tree = locator
            .locate(&PackageSource::OfficialRelease, &agents(&["claude"]), ScriptVariant::Sh)
            .unwrap();
        assert_eq!(tree.text("templates/commands/plan.md"), Some("official"));
    }

    #[test]
    fn test_locate_override_unions_agent_assets() {
        let releases = FakeReleases::default();
        let locator = SourceLocator::new(&releases, &FakeRepositories);
        let repo = RepoId::parse("acme/templates").unwrap();

        let tree = locator
            .locate(
                &PackageSource::OverrideRepo(repo),
                &agents(&["claude", "gemini"]),
                ScriptVariant::Ps,
            )
            .unwrap();

        assert!(tree.contains(".claude/commands/speckit.plan.md"));
        assert!(tree.contains(".gemini/commands/speckit.plan.toml"));
        assert_eq!(tree.text(".specify/memory/constitution.md"), Some("shared"));
        assert_eq!(
            *releases.requested.borrow(),
            vec!["templates:claude:ps", "templates:gemini:ps"]
        );
    }

    #[test]
    fn test_locate_override_missing_asset_fails() {
        let releases = FakeReleases::default();
        let locator = SourceLocator::new(&releases, &FakeRepositories);
        let repo = RepoId::parse("acme/templates").unwrap();

        let err = locator
            .locate(&PackageSource::OverrideRepo(repo), &agents(&["claude", "bob"]), ScriptVariant::Sh)
            .unwrap_err();
        assert!(matches!(err, TemplateError::SourceUnavailable { .. }));
    }

    #[test]
    fn test_locate_overlay_repo() {
        let releases = FakeReleases::default();
        let locator = SourceLocator::new(&releases, &FakeRepositories);
        let repo = RepoId::parse("acme/overlay").unwrap();

        let tree = locator
            .locate(&PackageSource::OverlayRepo(repo), &agents(&["claude"]), ScriptVariant::Sh)
            .unwrap();
        assert_eq!(tree.text("templates/commands/plan.md"), Some("from overlay"));
        assert!(releases.requested.borrow().is_empty());
    }

    #[test]
    fn test_locate_missing_overlay_path() {
        let releases = FakeReleases::default();
        let locator = SourceLocator::new(&releases, &FakeRepositories);
        let err = locator
            .locate(
                &PackageSource::OverlayPath(PathBuf::from("/definitely/not/here")),
                &agents(&["claude"]),
                ScriptVariant::Sh,
            )
            .unwrap_err();
        assert!(matches!(err, TemplateError::SourceUnavailable { .. }));
    }

    #[test]
    fn test_locate_plan_with_overlay() {
        let releases = FakeReleases::default();
        let locator = SourceLocator::new(&releases, &FakeRepositories);
        let plan = SourcePlan::new(
            PackageSource::OfficialRelease,
            Some(PackageSource::OverlayRepo(RepoId::parse("acme/overlay").unwrap())),
        )
        .unwrap();

        let (base, overlay) = locator
            .locate_plan(&plan, &agents(&["claude"]), ScriptVariant::Sh)
            .unwrap();
        assert_eq!(base.text("templates/commands/plan.md"), Some("official"));
        assert_eq!(
            overlay.unwrap().text("templates/commands/plan.md"),
            Some("from overlay")
        );
    }
}
