//! modhost CLI
//!
//! Packs modules, inspects a modules directory and runs the module runtime.

mod activator;
mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            source,
            start,
            stop,
        } => {
            let config = commands::load_config(&source)?;
            logging::init(cli.verbose, &config.log_filter)?;
            commands::run_runtime(config, &start, &stop)
        }
        Commands::Pack {
            project,
            artifact,
            output,
        } => {
            logging::init(cli.verbose, logging::DEFAULT_FILTER)?;
            commands::run_pack(&project, &artifact, &output)
        }
        Commands::List { source, json } => {
            let config = commands::load_config(&source)?;
            logging::init(cli.verbose, &config.log_filter)?;
            commands::run_list(config, json)
        }
        Commands::Extensions {
            point,
            source,
            json,
        } => {
            let config = commands::load_config(&source)?;
            logging::init(cli.verbose, &config.log_filter)?;
            commands::run_extensions(config, &point, json)
        }
    }
}
