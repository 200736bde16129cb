//! Agent profiles
//!
//! An [`AgentProfile`] describes where an AI coding agent expects its command
//! files, which format they use, and which extra files it receives:
//! - `commands_dir`: directory for generated command files
//! - `format` / `extension`: Markdown or TOML, and the file suffix
//! - `prompts_dir`: optional mirror of every command file (Copilot)
//! - `settings`: optional settings file emitted on request (Copilot)

use serde::{Deserialize, Serialize};

use crate::substitute::FileFormat;

pub mod registry;

pub use registry::{AgentRegistry, AgentSelection, default_agents};

/// Sentinel accepted in place of an agent id to mean every known agent
pub const ALL_AGENTS: &str = "all";

/// Prefix of every generated command file name
pub const COMMAND_PREFIX: &str = "speckit";

/// Output layout of a single agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Agent identifier (e.g., "claude", "gemini", "copilot")
    pub id: String,

    /// Display name
    pub name: String,

    /// Directory receiving command files (e.g., ".claude/commands")
    pub commands_dir: String,

    pub format: FileFormat,

    /// Command file suffix without the leading dot (e.g., "md", "agent.md", "toml")
    pub extension: String,

    /// Mirror directory and suffix for prompt files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompts: Option<PromptMirror>,

    /// Settings file emitted only when explicitly requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<SettingsFile>,
}

/// Parallel prompt tree holding a copy of every command file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMirror {
    pub dir: String,
    pub extension: String,
}

/// Settings file copied from the source tree into the agent's layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsFile {
    /// Path in the merged source tree
    pub source: String,
    /// Path in the packaged output
    pub target: String,
}

impl AgentProfile {
    /// Create a Markdown agent writing `<commands_dir>/speckit.<name>.md`
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        commands_dir: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            commands_dir: commands_dir.into(),
            format: FileFormat::Markdown,
            extension: "md".to_string(),
            prompts: None,
            settings: None,
        }
    }

    /// Switch to TOML command files
    pub fn with_toml(mut self) -> Self {
        self.format = FileFormat::Toml;
        self.extension = "toml".to_string();
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_prompts(mut self, dir: impl Into<String>, extension: impl Into<String>) -> Self {
        self.prompts = Some(PromptMirror {
            dir: dir.into(),
            extension: extension.into(),
        });
        self
    }

    pub fn with_settings(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.settings = Some(SettingsFile {
            source: source.into(),
            target: target.into(),
        });
        self
    }

    /// Output path of the command generated from template `stem`
    pub fn command_path(&self, stem: &str) -> String {
        format!(
            "{}/{COMMAND_PREFIX}.{stem}.{}",
            self.commands_dir, self.extension
        )
    }

    /// Mirrored prompt path for template `stem`, if this agent mirrors prompts
    pub fn prompt_path(&self, stem: &str) -> Option<String> {
        self.prompts
            .as_ref()
            .map(|p| format!("{}/{COMMAND_PREFIX}.{stem}.{}", p.dir, p.extension))
    }

    /// Template stem of a packaged command path
    /// (`.claude/commands/speckit.plan.md` → `plan`)
    pub fn command_stem<'a>(&self, path: &'a str) -> Option<&'a str> {
        packaged_stem(path, &self.commands_dir, &self.extension)
    }

    /// Template stem of a mirrored prompt path
    pub fn prompt_stem<'a>(&self, path: &'a str) -> Option<&'a str> {
        let prompts = self.prompts.as_ref()?;
        packaged_stem(path, &prompts.dir, &prompts.extension)
    }

    /// Whether `path` lies in this agent's command or prompt directory
    pub fn owns_path(&self, path: &str) -> bool {
        let under = |dir: &str| {
            path.strip_prefix(dir)
                .is_some_and(|rest| rest.starts_with('/'))
        };
        under(&self.commands_dir) || self.prompts.as_ref().is_some_and(|p| under(&p.dir))
    }

    /// Root directory owned by this agent (e.g., ".claude", ".github")
    pub fn root_dir(&self) -> &str {
        self.commands_dir
            .split('/')
            .next()
            .unwrap_or(&self.commands_dir)
    }
}

fn packaged_stem<'a>(path: &'a str, dir: &str, extension: &str) -> Option<&'a str> {
    let name = path.strip_prefix(dir)?.strip_prefix('/')?;
    let stem = name
        .strip_prefix(COMMAND_PREFIX)?
        .strip_prefix('.')?
        .strip_suffix(extension)?
        .strip_suffix('.')?;
    (!stem.is_empty() && !stem.contains('/')).then_some(stem)
}
