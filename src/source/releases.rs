//! Release assets on the local file system
//!
//! Layout:
//!
//! ```text
//! <official package>                  directory or ZIP of the official release
//! <releases_dir>/<owner>/<name>/      assets published by a template repository
//!     spec-kit-template-claude-sh-v0.1.0.zip
//!     spec-kit-template-gemini-ps-v0.1.0.zip
//! ```

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::agent::AgentProfile;
use crate::error::{Result, fs as fs_error, source};
use crate::packager::paths;
use crate::substitute::ScriptVariant;
use crate::tree::FileTree;

use super::{RepoId, archive};
use super::locator::ReleaseProvider;

/// Default asset file name prefix
pub const DEFAULT_ASSET_PREFIX: &str = "spec-kit-template";

/// File naming of per-agent release assets: `{prefix}-{agent}-{script}[-version].zip`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetNaming {
    prefix: String,
}

impl AssetNaming {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Whether `file_name` is an asset for `agent_id` and `script`
    pub fn matches(&self, file_name: &str, agent_id: &str, script: ScriptVariant) -> bool {
        let Some(stem) = file_name.strip_suffix(".zip") else {
            return false;
        };
        let expected = format!("{}-{agent_id}-{script}", self.prefix);
        match stem.strip_prefix(&expected) {
            Some(rest) => rest.is_empty() || rest.starts_with('-'),
            None => false,
        }
    }
}

impl Default for AssetNaming {
    fn default() -> Self {
        Self::new(DEFAULT_ASSET_PREFIX)
    }
}

/// Release provider backed by local files
#[derive(Debug, Clone)]
pub struct LocalReleaseStore {
    official: PathBuf,
    releases_dir: Option<PathBuf>,
    naming: AssetNaming,
}

impl LocalReleaseStore {
    /// `official` is the directory or ZIP holding the official package.
    pub fn new(official: impl Into<PathBuf>) -> Self {
        Self {
            official: official.into(),
            releases_dir: None,
            naming: AssetNaming::default(),
        }
    }

    pub fn with_releases_dir(mut self, releases_dir: impl Into<PathBuf>) -> Self {
        self.releases_dir = Some(releases_dir.into());
        self
    }

    pub fn with_naming(mut self, naming: AssetNaming) -> Self {
        self.naming = naming;
        self
    }

    /// Newest asset for `agent_id` in `dir` (file names compared lexically)
    fn find_asset(&self, dir: &Path, agent_id: &str, script: ScriptVariant) -> Result<Option<PathBuf>> {
        let entries = std::fs::read_dir(dir).map_err(fs_error::read_error(dir))?;

        let mut candidates = Vec::new();
        for entry in entries {
            let entry = entry.map_err(fs_error::read_error(dir))?;
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if self.naming.matches(&file_name, agent_id, script) {
                candidates.push(entry.path());
            }
        }
        candidates.sort();
        Ok(candidates.pop())
    }
}

impl ReleaseProvider for LocalReleaseStore {
    /// A directory package is read from its package roots only, so a working
    /// directory used as the base never picks up earlier output or build files.
    fn official(&self, agents: &[AgentProfile], _script: ScriptVariant) -> Result<FileTree> {
        if !self.official.is_dir() {
            return archive::read_package(&self.official);
        }

        let tree = FileTree::from_dir_filtered(&self.official, |name| {
            paths::is_package_root(name, agents)
        })?;
        debug!(path = %self.official.display(), files = tree.len(), "Read official package directory");
        Ok(tree)
    }

    fn asset(&self, repo: &RepoId, agent: &AgentProfile, script: ScriptVariant) -> Result<FileTree> {
        let releases_dir = self.releases_dir.as_ref().ok_or_else(|| {
            source::unavailable(repo.to_string(), "no releases directory configured")
        })?;

        let dir = releases_dir.join(repo.owner_or_local()).join(&repo.name);
        if !dir.is_dir() {
            return Err(source::unavailable(
                repo.to_string(),
                format!("no releases found at {}", dir.display()),
            ));
        }

        let asset = self.find_asset(&dir, &agent.id, script)?.ok_or_else(|| {
            source::unavailable(
                repo.to_string(),
                format!("no release asset for agent '{}' and script '{script}'", agent.id),
            )
        })?;

        debug!(asset = %asset.display(), agent = %agent.id, "Using release asset");
        archive::read_zip(&asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TemplateError;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    fn write_asset(path: &Path, file: &str, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut zip = ZipWriter::new(File::create(path).unwrap());
        zip.start_file(file, SimpleFileOptions::default()).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
        zip.finish().unwrap();
    }

    fn claude() -> AgentProfile {
        AgentProfile::new("claude", "Claude Code", ".claude/commands")
    }

    #[test]
    fn test_asset_naming() {
        let naming = AssetNaming::default();
        assert!(naming.matches("spec-kit-template-claude-sh-v0.1.0.zip", "claude", ScriptVariant::Sh));
        assert!(naming.matches("spec-kit-template-claude-sh.zip", "claude", ScriptVariant::Sh));
        assert!(!naming.matches("spec-kit-template-claude-ps-v0.1.0.zip", "claude", ScriptVariant::Sh));
        assert!(!naming.matches("spec-kit-template-q-sh-v1.zip", "qwen", ScriptVariant::Sh));
        assert!(!naming.matches("spec-kit-template-qwen-sh-v1.zip", "q", ScriptVariant::Sh));
        assert!(!naming.matches("spec-kit-template-claude-sh-v0.1.0.tar.gz", "claude", ScriptVariant::Sh));
    }

    #[test]
    fn test_asset_picks_newest() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("acme/templates");
        write_asset(&dir.join("spec-kit-template-claude-sh-v0.1.0.zip"), "memory/a.md", "old");
        write_asset(&dir.join("spec-kit-template-claude-sh-v0.2.0.zip"), "memory/a.md", "new");

        let store = LocalReleaseStore::new(temp.path().join("official")).with_releases_dir(temp.path());
        let repo = RepoId::parse("acme/templates").unwrap();
        let tree = store.asset(&repo, &claude(), ScriptVariant::Sh).unwrap();
        assert_eq!(tree.text("memory/a.md"), Some("new"));
    }

    #[test]
    fn test_asset_missing() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("acme/templates");
        write_asset(&dir.join("spec-kit-template-claude-ps-v0.1.0.zip"), "memory/a.md", "x");

        let store = LocalReleaseStore::new(temp.path().join("official")).with_releases_dir(temp.path());
        let repo = RepoId::parse("acme/templates").unwrap();
        let err = store.asset(&repo, &claude(), ScriptVariant::Sh).unwrap_err();
        assert!(matches!(err, TemplateError::SourceUnavailable { .. }));

        let other = RepoId::parse("acme/other").unwrap();
        assert!(store.asset(&other, &claude(), ScriptVariant::Sh).is_err());
    }

    #[test]
    fn test_asset_without_releases_dir() {
        let store = LocalReleaseStore::new("/nonexistent");
        let repo = RepoId::parse("acme/templates").unwrap();
        let err = store.asset(&repo, &claude(), ScriptVariant::Sh).unwrap_err();
        assert!(err.to_string().contains("acme/templates"));
    }

    #[test]
    fn test_official_reads_directory() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("templates/commands")).unwrap();
        std::fs::write(temp.path().join("templates/commands/plan.md"), "---\n---\nPlan\n").unwrap();

        let store = LocalReleaseStore::new(temp.path());
        let tree = store.official(&[claude()], ScriptVariant::Sh).unwrap();
        assert!(tree.contains("templates/commands/plan.md"));
    }

    #[test]
    fn test_official_directory_skips_non_package_entries() {
        let temp = TempDir::new().unwrap();
        for (path, content) in [
            ("templates/commands/plan.md", "---\n---\nPlan\n"),
            ("memory/constitution.md", "rules"),
            (".claude/commands/speckit.plan.md", "packaged"),
            ("dist/.claude/commands/speckit.plan.md", "earlier output"),
            ("target/debug/build.log", "log"),
            ("README.md", "readme"),
        ] {
            let file = temp.path().join(path);
            std::fs::create_dir_all(file.parent().unwrap()).unwrap();
            std::fs::write(file, content).unwrap();
        }

        let store = LocalReleaseStore::new(temp.path());
        let tree = store.official(&[claude()], ScriptVariant::Sh).unwrap();
        assert_eq!(
            tree.paths().collect::<Vec<_>>(),
            vec![
                ".claude/commands/speckit.plan.md",
                "memory/constitution.md",
                "templates/commands/plan.md"
            ]
        );
    }

    #[test]
    fn test_custom_prefix() {
        let naming = AssetNaming::new("acme-kit");
        assert!(naming.matches("acme-kit-gemini-ps-v3.zip", "gemini", ScriptVariant::Ps));
        assert!(!naming.matches("spec-kit-template-gemini-ps-v3.zip", "gemini", ScriptVariant::Ps));
    }
}
