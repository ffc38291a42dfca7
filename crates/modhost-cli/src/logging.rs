use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::error::{CliError, Result};

/// Filter used before a configuration has been read.
pub const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber. Logs go to stderr so stdout stays clean
/// for `--json` output.
///
/// `RUST_LOG` wins over `fallback`; `--verbose` raises the fallback to debug.
pub fn init(verbose: bool, fallback: &str) -> Result<()> {
    let fallback = if verbose { "debug" } else { fallback };

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .compact();

    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .map_err(|e| CliError::user(format!("invalid log filter '{fallback}': {e}")))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| CliError::user(format!("failed to initialise logging: {e}")))?;

    tracing::debug!("verbose mode enabled");
    Ok(())
}
