//! Command implementations for modhost-cli

pub mod extensions;
pub mod list;
pub mod pack;
pub mod run;

use colored::Colorize;
use modhost_runtime::{Error, RuntimeConfig};

use crate::cli::SourceArgs;
use crate::error::Result;

pub use extensions::run_extensions;
pub use list::run_list;
pub use pack::run_pack;
pub use run::run_runtime;

/// Resolve the runtime configuration from the command line.
///
/// An explicit `--config` file must exist; otherwise `./modhost.toml` is
/// used when present. `--modules-dir` overrides whatever the file says.
pub fn load_config(source: &SourceArgs) -> Result<RuntimeConfig> {
    let config = match &source.config {
        Some(path) => RuntimeConfig::load(path)?,
        None => RuntimeConfig::discover(&std::env::current_dir()?)?,
    };
    Ok(match &source.modules_dir {
        Some(dir) => config.with_modules_dir(dir),
        None => config,
    })
}

/// Print non-fatal errors collected along the way.
pub(crate) fn print_warnings(errors: &[Error]) {
    for error in errors {
        eprintln!("{} {}", "warning:".yellow().bold(), error);
    }
}
