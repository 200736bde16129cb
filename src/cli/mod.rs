//! CLI definitions using clap derive API
//!
//! - [`Cli`]: the `specify` binary (`package`, `completions`)
//! - [`PackageTemplatesCli`]: the standalone `package-templates` binary,
//!   taking the package arguments directly

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};

pub mod completions;
pub mod package;

pub use completions::CompletionsArgs;
pub use package::PackageArgs;

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default())
}

/// Specify - command template packaging
#[derive(Parser, Debug)]
#[command(
    name = "specify",
    author,
    version,
    styles = styles(),
    about = "Package Spec Kit command templates for AI coding agents",
    long_about = "Resolves the official template package, an optional replacement repository \
                  or overlay, and renders the command templates into the layout each AI coding \
                  agent expects (Claude, Gemini, Copilot, Cursor, ...).",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  specify package --ai claude                          \x1b[90m# Package for Claude Code\x1b[0m\n   \
                  specify package --ai all --out dist                  \x1b[90m# Package for every agent\x1b[0m\n   \
                  specify package --template-overlay-path ./overlay    \x1b[90m# Apply a local overlay\x1b[0m\n   \
                  specify completions zsh                              \x1b[90m# Shell completions\x1b[0m\n"
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Package command templates for one or more agents
    Package(PackageArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Standalone packager
#[derive(Parser, Debug)]
#[command(
    name = "package-templates",
    version,
    styles = styles(),
    about = "Package Spec Kit command templates for AI coding agents"
)]
pub struct PackageTemplatesCli {
    /// Enable verbose output
    #[arg(long, short = 'v')]
    pub verbose: bool,

    #[command(flatten)]
    pub args: PackageArgs,
}
