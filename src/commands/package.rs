//! Package command
//!
//! Resolves the run configuration, locates the base package and overlay,
//! merges them, packages the result for every selected agent, and writes
//! the output in one transaction. Nothing is written unless every step
//! before the write succeeded.

use tracing::{debug, info};

use crate::agent::AgentRegistry;
use crate::cli::PackageArgs;
use crate::config::{PackagingConfig, SourceOptions};
use crate::error::Result;
use crate::git::GitFetcher;
use crate::overlay;
use crate::packager;
use crate::source::{ReleaseProvider, RepositoryFetcher, SourceLocator};
use crate::ui::{self, PackageManifest};
use crate::writer;

/// Build the run configuration from arguments and an environment lookup.
pub fn resolve_config<F>(
    args: &PackageArgs,
    registry: &AgentRegistry,
    env: F,
) -> Result<PackagingConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let plan = SourceOptions::from_flags(
        args.template_repo.clone(),
        args.template_overlay_repo.clone(),
        args.template_overlay_path.clone(),
    )
    .with_env(env)
    .resolve()?;

    Ok(PackagingConfig {
        plan,
        agents: registry.select(&args.ai)?,
        script: args.script.parse()?,
        out_dir: args.out.clone(),
        official_package: args.base.clone(),
        releases_dir: args.releases_dir.clone(),
        include_vscode_settings: args.include_vscode_settings,
    })
}

/// Run the packaging pipeline for `config`.
pub fn execute(
    config: &PackagingConfig,
    registry: &AgentRegistry,
    releases: &dyn ReleaseProvider,
    repositories: &dyn RepositoryFetcher,
    dry_run: bool,
) -> Result<PackageManifest> {
    let agents = config.agents.profiles(registry);
    let locator = SourceLocator::new(releases, repositories);

    let (base, overlay_tree) = locator.locate_plan(&config.plan, &agents, config.script)?;
    let (merged, merge_report) = overlay::merge_with_report(base, overlay_tree);
    debug!(
        files = merged.len(),
        replaced = merge_report.replaced.len(),
        added = merge_report.added.len(),
        "Merged sources"
    );

    let packaged =
        packager::package_merged(&merged, &merge_report, &agents, &config.package_options())?;
    info!(agents = %config.agents.label(), files = packaged.len(), "Packaged templates");

    let overwritten = if dry_run {
        Vec::new()
    } else {
        writer::write_tree(&packaged, &config.out_dir)?.overwritten
    };

    let manifest = PackageManifest {
        agents: agents.iter().map(|a| a.id.clone()).collect(),
        script: config.script.to_string(),
        out_dir: config.out_dir.display().to_string(),
        dry_run,
        base: config.plan.base.to_string(),
        overlay: config.plan.overlay.as_ref().map(ToString::to_string),
        overlay_replaced: 0,
        overlay_added: 0,
        digest: packaged.digest(),
        files: ui::group_by_agent(&packaged, &agents),
        overwritten,
    }
    .with_merge_report(&merge_report);

    Ok(manifest)
}

/// Entry point for `specify package` and `package-templates`
pub fn run(args: PackageArgs) -> Result<()> {
    let registry = AgentRegistry::default();
    let config = resolve_config(&args, &registry, |name| std::env::var(name).ok())?;

    let releases = config.release_store();
    let repositories = GitFetcher::new();
    let manifest = execute(&config, &registry, &releases, &repositories, args.dry_run)?;

    if args.json {
        ui::print_json(&manifest)
    } else {
        ui::print_summary(&manifest);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use crate::error::TemplateError;
    use crate::source::{LocalReleaseStore, RepoId};
    use crate::tree::FileTree;
    use clap::Parser;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const PLAN: &str = "---\n\
description: Create a plan\n\
scripts:\n  \
sh: scripts/bash/setup-plan.sh --json\n  \
ps: scripts/powershell/setup-plan.ps1 -Json\n\
---\n\
Run {SCRIPT} with {ARGS}. See memory/constitution.md.\n";

    struct NoRepositories;

    impl RepositoryFetcher for NoRepositories {
        fn fetch(&self, repo: &RepoId) -> Result<FileTree> {
            Err(crate::error::source::unavailable(repo.to_string(), "offline"))
        }
    }

    fn args(extra: &[&str]) -> PackageArgs {
        let mut argv = vec!["specify", "package"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Package(args) => args,
            Commands::Completions(_) => panic!("Expected Package command"),
        }
    }

    fn official(dir: &Path) {
        fs::create_dir_all(dir.join("templates/commands")).unwrap();
        fs::create_dir_all(dir.join("memory")).unwrap();
        fs::write(dir.join("templates/commands/plan.md"), PLAN).unwrap();
        fs::write(dir.join("memory/constitution.md"), "# Constitution\n").unwrap();
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_resolve_config() {
        let registry = AgentRegistry::default();
        let config = resolve_config(
            &args(&["--ai", "claude", "--script", "ps"]),
            &registry,
            no_env,
        )
        .unwrap();
        assert_eq!(config.agents.label(), "claude");
        assert_eq!(config.script.as_str(), "ps");
        assert!(config.plan.overlay.is_none());
    }

    #[test]
    fn test_resolve_config_rejects_bad_input() {
        let registry = AgentRegistry::default();
        assert!(matches!(
            resolve_config(&args(&["--ai", "vim"]), &registry, no_env),
            Err(TemplateError::UnknownAgent { .. })
        ));
        assert!(matches!(
            resolve_config(&args(&["--script", "zsh"]), &registry, no_env),
            Err(TemplateError::InvalidScriptVariant { .. })
        ));
    }

    #[test]
    fn test_execute_writes_package() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("release");
        let out = temp.path().join("out");
        official(&base);

        let registry = AgentRegistry::default();
        let config = resolve_config(
            &args(&[
                "--ai",
                "claude,gemini",
                "--base",
                base.to_str().unwrap(),
                "--out",
                out.to_str().unwrap(),
            ]),
            &registry,
            no_env,
        )
        .unwrap();

        let releases = config.release_store();
        let manifest = execute(&config, &registry, &releases, &NoRepositories, false).unwrap();

        assert_eq!(manifest.agents, vec!["claude", "gemini"]);
        assert_eq!(manifest.files["claude"], vec![".claude/commands/speckit.plan.md"]);
        let claude = fs::read_to_string(out.join(".claude/commands/speckit.plan.md")).unwrap();
        assert!(claude.contains("Run .specify/scripts/bash/setup-plan.sh --json with $ARGUMENTS."));
        assert!(claude.contains(".specify/memory/constitution.md"));
        let gemini = fs::read_to_string(out.join(".gemini/commands/speckit.plan.toml")).unwrap();
        assert!(gemini.contains("{{args}}"));
        assert!(out.join(".specify/memory/constitution.md").exists());
    }

    #[test]
    fn test_execute_with_overlay_and_dry_run() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("release");
        let overlay_dir = temp.path().join("overlay");
        let out = temp.path().join("out");
        official(&base);
        fs::create_dir_all(overlay_dir.join("templates/commands")).unwrap();
        fs::write(
            overlay_dir.join("templates/commands/plan.md"),
            PLAN.replace("Run {SCRIPT}", "Forked: run {SCRIPT}"),
        )
        .unwrap();

        let registry = AgentRegistry::default();
        let config = resolve_config(
            &args(&[
                "--ai",
                "claude",
                "--base",
                base.to_str().unwrap(),
                "--out",
                out.to_str().unwrap(),
                "--template-overlay-path",
                overlay_dir.to_str().unwrap(),
            ]),
            &registry,
            no_env,
        )
        .unwrap();

        let releases = config.release_store();
        let manifest = execute(&config, &registry, &releases, &NoRepositories, true).unwrap();
        assert_eq!(manifest.overlay_replaced, 1);
        assert!(manifest.dry_run);
        assert!(!out.exists());

        execute(&config, &registry, &releases, &NoRepositories, false).unwrap();
        let claude = fs::read_to_string(out.join(".claude/commands/speckit.plan.md")).unwrap();
        assert!(claude.contains("Forked: run .specify/scripts/bash/setup-plan.sh"));
    }

    #[test]
    fn test_execute_failure_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("release");
        let out = temp.path().join("out");
        official(&base);
        fs::write(base.join("templates/commands/broken.md"), "no front matter\n").unwrap();

        let registry = AgentRegistry::default();
        let config = resolve_config(
            &args(&[
                "--ai",
                "claude",
                "--base",
                base.to_str().unwrap(),
                "--out",
                out.to_str().unwrap(),
            ]),
            &registry,
            no_env,
        )
        .unwrap();

        let releases = LocalReleaseStore::new(&base);
        let err = execute(&config, &registry, &releases, &NoRepositories, false).unwrap_err();
        assert!(matches!(err, TemplateError::MalformedTemplate { .. }));
        assert!(!out.exists());
    }

    #[test]
    fn test_execute_overlay_repo_unavailable() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("release");
        official(&base);

        let registry = AgentRegistry::default();
        let config = resolve_config(
            &args(&["--ai", "claude", "--base", base.to_str().unwrap()]),
            &registry,
            |name| (name == crate::config::OVERLAY_REPO_ENV).then(|| "acme/overlay".to_string()),
        )
        .unwrap();

        let releases = config.release_store();
        let err = execute(&config, &registry, &releases, &NoRepositories, true).unwrap_err();
        assert!(matches!(err, TemplateError::SourceUnavailable { .. }));
    }
}
