//! Run summary and JSON manifest

use std::collections::BTreeMap;

use console::Style;
use serde::Serialize;

use crate::agent::AgentProfile;
use crate::error::Result;
use crate::overlay::MergeReport;
use crate::tree::FileTree;

/// Group label for files not owned by a single agent
pub const SHARED_GROUP: &str = "shared";

/// Outcome of one packaging run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageManifest {
    pub agents: Vec<String>,
    pub script: String,
    pub out_dir: String,
    pub dry_run: bool,
    pub base: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay: Option<String>,
    pub overlay_replaced: usize,
    pub overlay_added: usize,
    pub digest: String,
    /// Packaged paths grouped by owning agent (or [`SHARED_GROUP`])
    pub files: BTreeMap<String, Vec<String>>,
    /// Paths that already existed in the output directory
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub overwritten: Vec<String>,
}

impl PackageManifest {
    pub fn total_files(&self) -> usize {
        self.files.values().map(Vec::len).sum()
    }

    pub fn with_merge_report(mut self, report: &MergeReport) -> Self {
        self.overlay_replaced = report.replaced.len();
        self.overlay_added = report.added.len();
        self
    }
}

/// Agent owning `path`, if the path lies in one of its output locations.
fn owner<'a>(path: &str, agents: &'a [AgentProfile]) -> Option<&'a str> {
    let under = |dir: &str| {
        path.strip_prefix(dir)
            .is_some_and(|rest| rest.starts_with('/'))
    };

    agents
        .iter()
        .find(|agent| {
            under(&agent.commands_dir)
                || agent.prompts.as_ref().is_some_and(|p| under(&p.dir))
                || agent.settings.as_ref().is_some_and(|s| s.target == path)
        })
        .map(|agent| agent.id.as_str())
}

/// Group the paths of `tree` by owning agent.
pub fn group_by_agent(tree: &FileTree, agents: &[AgentProfile]) -> BTreeMap<String, Vec<String>> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for path in tree.paths() {
        let group = owner(path, agents).unwrap_or(SHARED_GROUP);
        groups
            .entry(group.to_string())
            .or_default()
            .push(path.to_string());
    }
    groups
}

/// Print a human-readable summary to stdout.
pub fn print_summary(manifest: &PackageManifest) {
    let bold = Style::new().bold();
    let heading = Style::new().bold().green();
    let dim = Style::new().dim();

    let verb = if manifest.dry_run { "Would package" } else { "Packaged" };
    println!(
        "{} {} files for {} ({}) into {}",
        heading.apply_to(verb),
        manifest.total_files(),
        manifest.agents.join(", "),
        manifest.script,
        manifest.out_dir
    );
    println!("  {} {}", bold.apply_to("Base:"), manifest.base);
    if let Some(overlay) = &manifest.overlay {
        println!(
            "  {} {} ({} replaced, {} added)",
            bold.apply_to("Overlay:"),
            overlay,
            manifest.overlay_replaced,
            manifest.overlay_added
        );
    }

    for (group, paths) in &manifest.files {
        println!(
            "  {} {}",
            Style::new().bold().yellow().apply_to(group),
            dim.apply_to(format!("({} files)", paths.len()))
        );
        for path in paths {
            println!("    {path}");
        }
    }

    if !manifest.overwritten.is_empty() {
        println!(
            "  {} {}",
            bold.apply_to("Overwritten:"),
            manifest.overwritten.len()
        );
    }
    println!("  {} {}", bold.apply_to("Digest:"), dim.apply_to(&manifest.digest));
}

/// Print the manifest as pretty JSON to stdout.
pub fn print_json(manifest: &PackageManifest) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(manifest)?);
    Ok(())
}
