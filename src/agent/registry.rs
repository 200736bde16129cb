//! Agent registry
//!
//! Holds the known agent profiles and resolves `--ai` selections
//! (`claude`, `claude,gemini`, or `all`) against them.

use std::collections::HashMap;

use crate::error::{Result, TemplateError};
use crate::packager::paths::VSCODE_SETTINGS_SOURCE;

use super::{ALL_AGENTS, AgentProfile};

/// Registry of all known agents
#[derive(Debug, Clone)]
pub struct AgentRegistry {
    agents: Vec<AgentProfile>,
    by_id: HashMap<String, usize>,
}

/// Resolved `--ai` selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentSelection {
    /// Every known agent
    All,
    /// Explicitly named agents, in the order given
    Agents(Vec<AgentProfile>),
}

impl AgentSelection {
    /// Profiles this selection packages for
    pub fn profiles(&self, registry: &AgentRegistry) -> Vec<AgentProfile> {
        match self {
            AgentSelection::All => registry.all().to_vec(),
            AgentSelection::Agents(agents) => agents.clone(),
        }
    }

    /// Label used in diagnostics and asset lookups
    pub fn label(&self) -> String {
        match self {
            AgentSelection::All => ALL_AGENTS.to_string(),
            AgentSelection::Agents(agents) => agents
                .iter()
                .map(|a| a.id.as_str())
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

impl AgentRegistry {
    pub fn new(agents: Vec<AgentProfile>) -> Self {
        let by_id = agents
            .iter()
            .enumerate()
            .map(|(idx, a)| (a.id.clone(), idx))
            .collect();
        Self { agents, by_id }
    }

    pub fn get(&self, id: &str) -> Option<&AgentProfile> {
        self.by_id.get(id).and_then(|&idx| self.agents.get(idx))
    }

    pub fn all(&self) -> &[AgentProfile] {
        &self.agents
    }

    /// Resolve an `--ai` value.
    ///
    /// Accepts a single id, a comma-separated list, or `all`. Duplicates are
    /// dropped; unknown ids fail with [`TemplateError::UnknownAgent`].
    pub fn select(&self, spec: &str) -> Result<AgentSelection> {
        let ids: Vec<&str> = spec
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        if ids.is_empty() {
            return Err(TemplateError::UnknownAgent {
                agent: spec.to_string(),
            });
        }
        if ids.contains(&ALL_AGENTS) {
            return Ok(AgentSelection::All);
        }

        let mut agents: Vec<AgentProfile> = Vec::new();
        for id in ids {
            let agent = self.get(id).ok_or_else(|| TemplateError::UnknownAgent {
                agent: id.to_string(),
            })?;
            if !agents.iter().any(|a| a.id == agent.id) {
                agents.push(agent.clone());
            }
        }
        Ok(AgentSelection::Agents(agents))
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new(default_agents())
    }
}

/// Known agents and their layouts
pub fn default_agents() -> Vec<AgentProfile> {
    vec![
        AgentProfile::new("claude", "Claude Code", ".claude/commands"),
        AgentProfile::new("gemini", "Gemini CLI", ".gemini/commands").with_toml(),
        AgentProfile::new("copilot", "GitHub Copilot", ".github/agents")
            .with_extension("agent.md")
            .with_prompts(".github/prompts", "prompt.md")
            .with_settings(VSCODE_SETTINGS_SOURCE, ".vscode/settings.json"),
        AgentProfile::new("cursor-agent", "Cursor", ".cursor/commands"),
        AgentProfile::new("qwen", "Qwen Code", ".qwen/commands").with_toml(),
        AgentProfile::new("opencode", "opencode", ".opencode/command"),
        AgentProfile::new("windsurf", "Windsurf", ".windsurf/workflows"),
        AgentProfile::new("codex", "Codex CLI", ".codex/prompts"),
        AgentProfile::new("kilocode", "Kilo Code", ".kilocode/workflows"),
        AgentProfile::new("auggie", "Auggie CLI", ".augment/commands"),
        AgentProfile::new("roo", "Roo Code", ".roo/commands"),
        AgentProfile::new("codebuddy", "CodeBuddy", ".codebuddy/commands"),
        AgentProfile::new("qoder", "Qoder CLI", ".qoder/commands"),
        AgentProfile::new("amp", "Amp", ".agents/commands"),
        AgentProfile::new("shai", "SHAI", ".shai/commands"),
        AgentProfile::new("q", "Amazon Q Developer CLI", ".amazonq/prompts"),
        AgentProfile::new("bob", "IBM Bob", ".bob/commands"),
    ]
}
