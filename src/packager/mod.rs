//! Agent packaging
//!
//! Turns a merged source tree into the file set an agent's project receives:
//!
//! - `templates/commands/<stem>.md` → `<commands dir>/speckit.<stem>.<ext>`,
//!   placeholders expanded for the agent's format
//! - `templates/vscode-settings.json` → the agent's settings file, only when
//!   requested and only for agents that declare one
//! - root `memory/`, `scripts/`, `templates/`, `lib/` → `.specify/...`
//! - anything else (e.g. an overlay's `.claude/commands/...`) → verbatim;
//!   text files in the agent's own command or prompt directory get their
//!   placeholders expanded
//!
//! When several source files land on one output path, a file from the overlay
//! beats a file from the base. Within one tree, generated commands beat
//! relocated files, which beat files already at their packaged path.
//! Prompt mirrors are copied from the final command files.
//!
//! Packaging never writes to disk; the returned tree goes to the writer once
//! every agent has been packaged successfully.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::debug;

use crate::agent::{AgentProfile, AgentRegistry, AgentSelection};
use crate::error::{Result, TemplateError};
use crate::overlay::MergeReport;
use crate::substitute::{
    FileFormat, ScriptVariant, TemplateVariables, expand, rewrite_path_references,
};
use crate::template::CommandTemplate;
use crate::tree::{FileEntry, FileTree};

pub mod formats;
pub mod paths;

/// Packaging switches shared by all agents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackageOptions {
    pub script: ScriptVariant,
    /// Emit the agent's settings file (Copilot: `.vscode/settings.json`)
    pub include_vscode_settings: bool,
}

/// How a packaged file was derived, lowest precedence first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Layer {
    Verbatim,
    Relocated,
    Generated,
}

/// Precedence of a candidate output file: overlay origin first, then layer
type Rank = (bool, Layer);

#[derive(Debug, Default)]
struct Resolved {
    entries: BTreeMap<String, (Rank, FileEntry)>,
}

impl Resolved {
    fn place(&mut self, path: String, rank: Rank, entry: FileEntry) {
        match self.entries.get(&path) {
            Some((existing, _)) if *existing >= rank => {
                debug!(path = %path, "keeping higher-precedence packaged file");
            }
            _ => {
                self.entries.insert(path, (rank, entry));
            }
        }
    }

    fn into_tree(self) -> Result<FileTree> {
        let mut tree = FileTree::new();
        for (path, (_, entry)) in self.entries {
            tree.insert(&path, entry)?;
        }
        Ok(tree)
    }
}

/// Package `tree` for every agent in `selection`.
pub fn package_selection(
    tree: &FileTree,
    selection: &AgentSelection,
    registry: &AgentRegistry,
    options: &PackageOptions,
) -> Result<FileTree> {
    package(tree, &selection.profiles(registry), options)
}

/// Package `tree` for each agent and union the results.
///
/// Every file is treated as coming from the base; see [`package_merged`].
pub fn package(
    tree: &FileTree,
    agents: &[AgentProfile],
    options: &PackageOptions,
) -> Result<FileTree> {
    package_merged(tree, &MergeReport::default(), agents, options)
}

/// Package a merged tree for each agent and union the results.
///
/// `report` tells which merged paths came from the overlay. Identical files
/// produced by several agents (the shared `.specify/` tree) are kept once.
/// Differing content at one path fails with [`TemplateError::PathCollision`].
pub fn package_merged(
    tree: &FileTree,
    report: &MergeReport,
    agents: &[AgentProfile],
    options: &PackageOptions,
) -> Result<FileTree> {
    let overlay_paths: HashSet<&str> = report.overlay_paths().collect();
    let mut output = FileTree::new();
    let mut owners: HashMap<String, String> = HashMap::new();

    for agent in agents {
        let others: Vec<&AgentProfile> = agents.iter().filter(|a| a.id != agent.id).collect();
        let packaged = package_agent(tree, &overlay_paths, agent, &others, options)?;
        debug!(agent = %agent.id, files = packaged.len(), "packaged agent");

        for (path, entry) in packaged {
            match output.get(&path) {
                Some(existing) if *existing == entry => {}
                Some(_) => {
                    return Err(TemplateError::PathCollision {
                        first: owners.get(&path).cloned().unwrap_or_default(),
                        second: agent.id.clone(),
                        path,
                    });
                }
                None => {
                    owners.insert(path.clone(), agent.id.clone());
                    output.insert(&path, entry)?;
                }
            }
        }
    }

    Ok(output)
}

/// Package `tree` for a single agent.
pub fn package_for_agent(
    tree: &FileTree,
    agent: &AgentProfile,
    options: &PackageOptions,
) -> Result<FileTree> {
    package_agent(tree, &HashSet::new(), agent, &[], options)
}

/// Files under another selected agent's command directories are left to that
/// agent, which expands them for its own format.
fn package_agent(
    tree: &FileTree,
    overlay_paths: &HashSet<&str>,
    agent: &AgentProfile,
    others: &[&AgentProfile],
    options: &PackageOptions,
) -> Result<FileTree> {
    let mut resolved = Resolved::default();

    for (path, entry) in tree.iter() {
        let from_overlay = overlay_paths.contains(path);

        if let Some(stem) = paths::command_template_stem(path) {
            let text = entry
                .content
                .as_text()
                .ok_or_else(|| TemplateError::MalformedTemplate {
                    path: path.to_string(),
                    reason: "command template is not UTF-8 text".to_string(),
                })?;
            let template = CommandTemplate::parse(stem, text, options.script)?;
            let rendered = formats::render(&template, agent);
            resolved.place(
                agent.command_path(stem),
                (from_overlay, Layer::Generated),
                FileEntry::text(rendered),
            );
            continue;
        }

        if path == paths::VSCODE_SETTINGS_SOURCE {
            let settings = agent
                .settings
                .as_ref()
                .filter(|s| options.include_vscode_settings && s.source == path);
            if let Some(settings) = settings {
                resolved.place(
                    settings.target.clone(),
                    (from_overlay, Layer::Generated),
                    entry.clone(),
                );
            }
            continue;
        }

        let target = paths::rewrite(path);
        if target != path {
            resolved.place(target, (from_overlay, Layer::Relocated), entry.clone());
            continue;
        }

        if others.iter().any(|other| other.owns_path(path)) && !agent.owns_path(path) {
            continue;
        }
        let entry = if agent.owns_path(path) {
            expand_packaged_command(tree, path, entry, agent, options)
        } else {
            entry.clone()
        };
        resolved.place(path.to_string(), (from_overlay, Layer::Verbatim), entry);
    }

    mirror_prompts(&mut resolved, agent);
    resolved.into_tree()
}

/// Expand placeholders in a file already at one of the agent's packaged paths.
///
/// Script commands come from the file's own front matter, falling back to the
/// command template with the same stem.
fn expand_packaged_command(
    tree: &FileTree,
    path: &str,
    entry: &FileEntry,
    agent: &AgentProfile,
    options: &PackageOptions,
) -> FileEntry {
    let Some(text) = entry.content.as_text() else {
        return entry.clone();
    };

    let stem = agent.command_stem(path).or_else(|| agent.prompt_stem(path));
    let own = CommandTemplate::parse(stem.unwrap_or(path), text, options.script).ok();
    let fallback = stem.and_then(|stem| {
        let raw = tree.text(&paths::command_template_path(stem))?;
        CommandTemplate::parse(stem, raw, options.script).ok()
    });

    let pick = |get: fn(&CommandTemplate) -> Option<&String>| {
        own.as_ref()
            .and_then(get)
            .or_else(|| fallback.as_ref().and_then(get))
            .cloned()
    };
    let variables = TemplateVariables {
        script: pick(|t| t.script_command.as_ref()),
        agent_script: pick(|t| t.agent_script_command.as_ref()),
        agent: Some(agent.id.clone()),
    };

    let content = match (&own, agent.format) {
        (Some(template), FileFormat::Markdown) => template.to_markdown(),
        _ => text.to_string(),
    };
    let expanded = rewrite_path_references(&expand(&content, &variables, agent.format));
    FileEntry::text(expanded).with_executable(entry.executable)
}

/// Copy every final command file to the agent's prompt mirror.
fn mirror_prompts(resolved: &mut Resolved, agent: &AgentProfile) {
    if agent.prompts.is_none() {
        return;
    }

    let mirrors: Vec<(String, (Rank, FileEntry))> = resolved
        .entries
        .iter()
        .filter_map(|(path, placed)| {
            let prompt_path = agent.prompt_path(agent.command_stem(path)?)?;
            Some((prompt_path, placed.clone()))
        })
        .collect();

    for (prompt_path, placed) in mirrors {
        if resolved.entries.insert(prompt_path.clone(), placed).is_some() {
            debug!(agent = %agent.id, path = %prompt_path, "prompt mirror replaces packaged prompt");
        }
    }
}
