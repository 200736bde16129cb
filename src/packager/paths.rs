//! Path rewriting for packaged output
//!
//! Root-level `memory/`, `scripts/`, `templates/` and `lib/` move under
//! `.specify/`. The rewrite is applied once, after merging and before the tree
//! is handed to the writer.

use wax::{CandidatePath, Glob, Pattern};

use crate::agent::AgentProfile;

/// Directory holding the packaged support files in a user's project
pub const SPECIFY_DIR: &str = ".specify";

/// Root directories referenced from command bodies
pub const TEMPLATE_ROOTS: &[&str] = &["memory", "scripts", "templates"];

/// Root directories moved under [`SPECIFY_DIR`]
pub const REWRITE_ROOTS: &[&str] = &["memory", "scripts", "templates", "lib"];

/// Location of the Copilot VS Code settings template in a source tree
pub const VSCODE_SETTINGS_SOURCE: &str = "templates/vscode-settings.json";

const COMMAND_TEMPLATE_GLOB: &str = "templates/commands/*.md";

/// Rewrite a merged-tree path to its packaged location.
///
/// Paths outside the rewrite roots come back unchanged.
pub fn rewrite(path: &str) -> String {
    match path.split_once('/') {
        Some((root, _)) if REWRITE_ROOTS.contains(&root) => format!("{SPECIFY_DIR}/{path}"),
        _ => path.to_string(),
    }
}

/// Stem of a command template (`templates/commands/plan.md` → `plan`)
///
/// Only direct children of `templates/commands/` are command templates.
pub fn command_template_stem(path: &str) -> Option<&str> {
    let glob = Glob::new(COMMAND_TEMPLATE_GLOB).ok()?;
    glob.matched(&CandidatePath::from(path))?;
    path.rsplit('/')
        .next()
        .and_then(|name| name.strip_suffix(".md"))
        .filter(|stem| !stem.is_empty())
}

/// Source path of the command template with the given stem
pub fn command_template_path(stem: &str) -> String {
    format!("templates/commands/{stem}.md")
}

/// Whether a top-level entry of a package directory belongs to the package.
///
/// Package roots are the directories moved under `.specify/`, `.specify/`
/// itself, and the root directories `agents` write to. Anything else in a
/// directory used as a package (build output, `target/`, project files) is
/// not part of it.
pub fn is_package_root(name: &str, agents: &[AgentProfile]) -> bool {
    REWRITE_ROOTS.contains(&name)
        || name == SPECIFY_DIR
        || agents.iter().any(|agent| {
            agent.root_dir() == name
                || agent
                    .settings
                    .as_ref()
                    .is_some_and(|s| s.target.split('/').next() == Some(name))
        })
}
