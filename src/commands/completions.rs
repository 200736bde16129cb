//! Shell completions command

use std::io::Write;

use clap::CommandFactory;

use crate::cli::{Cli, CompletionsArgs};
use crate::error::Result;

/// Write completions for `args.shell` to `out`
pub fn generate(args: &CompletionsArgs, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    clap_complete::generate(args.shell, &mut cmd, "specify", out);
}

/// Generate shell completions on stdout
pub fn run(args: CompletionsArgs) -> Result<()> {
    generate(&args, &mut std::io::stdout().lock());
    Ok(())
}
