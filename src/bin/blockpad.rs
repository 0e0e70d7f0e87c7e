//! Blockpad CLI Binary
//!
//! Command-line interface for editing remote code blocks as local files.

use anyhow::Context;
use blockpad::config::ConfigLoader;
use blockpad::logging::init_logging;
use blockpad::tooling::cli::{apply_log_overrides, Cli, CliContext};
use clap::Parser;
use std::process;

fn run(cli: Cli) -> anyhow::Result<bool> {
    let mut config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
    .context("Failed to load configuration")?;
    apply_log_overrides(&cli, &mut config);

    if let Err(e) = init_logging(Some(&config.logging)) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    let mut context = CliContext::new(&config).context("Failed to initialize blockpad")?;
    let report = context.execute(&cli.command)?;
    if !report.output.is_empty() {
        println!("{}", report.output);
    }
    Ok(report.ok)
}

fn main() {
    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}
