//! Specify - command template packaging for AI coding agents

use clap::Parser;

use specify_templates::cli::{Cli, Commands};
use specify_templates::{commands, logging};

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Package(args) => commands::package::run(args),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
