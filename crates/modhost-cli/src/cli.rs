//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// modhost - run and package manifest-driven modules
#[derive(Parser, Debug)]
#[command(name = "modhost")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where to find the runtime configuration and modules.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct SourceArgs {
    /// Configuration file (defaults to ./modhost.toml when present)
    #[arg(short, long, env = "MODHOST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory scanned for module archives; overrides the configuration
    #[arg(short, long)]
    pub modules_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start the runtime, report module states, then shut down
    ///
    /// Examples:
    ///   modhost run                              # activate everything
    ///   modhost run --start org.example.ui       # only this module and its dependencies
    ///   modhost run --stop org.example.core      # stop a module after startup
    Run {
        #[command(flatten)]
        source: SourceArgs,

        /// Activate only these modules (repeatable); overrides auto_start
        #[arg(long)]
        start: Vec<String>,

        /// Stop these modules after startup (repeatable)
        #[arg(long)]
        stop: Vec<String>,
    },

    /// Bundle a module artifact with its manifest into an archive
    Pack {
        /// Project directory (or a file inside it) holding MANIFEST.MF
        project: PathBuf,

        /// Primary artifact to bundle
        artifact: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Discover and resolve modules without activating them
    List {
        #[command(flatten)]
        source: SourceArgs,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show the contributions to an extension point
    Extensions {
        /// Extension point id
        point: String,

        #[command(flatten)]
        source: SourceArgs,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}
