use std::path::PathBuf;

use clap::Args;

/// Arguments for packaging templates
#[derive(Args, Debug, Clone)]
#[command(after_help = "EXAMPLES:\n  \
                   Package for every agent:\n    specify package --base ./release --out dist\n\n\
                   Package for Claude and Gemini with PowerShell scripts:\n    specify package --ai claude,gemini --script ps\n\n\
                   Lay a local overlay over the official package:\n    specify package --ai claude --template-overlay-path ./my-templates\n\n\
                   Use a fork's release assets instead of the official package:\n    specify package --ai claude --template-repo acme/spec-kit --releases-dir ./releases")]
pub struct PackageArgs {
    /// Agent id, comma-separated list of ids, or "all"
    #[arg(long, value_name = "AGENTS", default_value = "all")]
    pub ai: String,

    /// Script variant referenced by command templates (sh, ps)
    #[arg(long, value_name = "VARIANT", default_value = "sh")]
    pub script: String,

    /// Directory receiving the packaged files
    #[arg(long, short = 'o', value_name = "DIR", default_value = ".")]
    pub out: PathBuf,

    /// Official package (directory or ZIP)
    #[arg(long, value_name = "PATH", default_value = ".", env = "SPECIFY_BASE_PACKAGE")]
    pub base: PathBuf,

    /// Directory holding release assets of template repositories (<owner>/<name>/*.zip)
    #[arg(long, value_name = "DIR", env = "SPECIFY_RELEASES_DIR")]
    pub releases_dir: Option<PathBuf>,

    /// Replacement template repository (owner/name[#ref])
    #[arg(long, value_name = "REPO")]
    pub template_repo: Option<String>,

    /// Repository laid over the official package (owner/name[#ref] or URL)
    #[arg(long, value_name = "REPO")]
    pub template_overlay_repo: Option<String>,

    /// Directory or ZIP laid over the official package
    #[arg(long, value_name = "PATH")]
    pub template_overlay_path: Option<PathBuf>,

    /// Emit .vscode/settings.json for Copilot
    #[arg(long)]
    pub include_vscode_settings: bool,

    /// Show what would be packaged without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Print the package manifest as JSON
    #[arg(long)]
    pub json: bool,
}
