//! Standalone template packager

use clap::Parser;

use specify_templates::cli::PackageTemplatesCli;
use specify_templates::{commands, logging};

fn main() {
    let cli = PackageTemplatesCli::parse();
    logging::init_logging(cli.verbose);

    if let Err(e) = commands::package::run(cli.args) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
