//! Runtime configuration
//!
//! Loaded from `modhost.toml` (or a `.json`/`.yaml` file) through
//! [`modhost_fs::ConfigStore`]. Every field has a default, so an empty file
//! and a missing optional file behave the same.
//!
//! ```toml
//! modules_dir = "modules"
//! archive_extension = "mpk"
//! activate_on_startup = true
//! auto_start = ["org.example.ui"]
//! log_filter = "info"
//! ```

use std::path::{Path, PathBuf};

use modhost_fs::ConfigStore;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
pub const CONFIG_FILENAME: &str = "modhost.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Directory scanned for module archives. Relative paths are resolved
    /// against the configuration file's directory.
    pub modules_dir: PathBuf,

    /// File extension of module archives, without the dot.
    pub archive_extension: String,

    /// Activate modules as part of startup.
    pub activate_on_startup: bool,

    /// When non-empty, only these modules (and their dependencies) are
    /// activated at startup.
    pub auto_start: Vec<String>,

    /// Fallback tracing filter when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            modules_dir: PathBuf::from("modules"),
            archive_extension: modhost_package::ARCHIVE_EXTENSION.to_string(),
            activate_on_startup: true,
            auto_start: Vec::new(),
            log_filter: "info".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from `path`. The file must exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::Config {
                path: path.to_path_buf(),
                message: "configuration file not found".to_string(),
            });
        }

        let mut config: Self = ConfigStore::new().load(path).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        if config.modules_dir.is_relative() {
            let base = path.parent().unwrap_or_else(|| Path::new(""));
            config.modules_dir = base.join(&config.modules_dir);
        }
        tracing::debug!(
            path = %path.display(),
            modules_dir = %config.modules_dir.display(),
            "loaded runtime config"
        );
        Ok(config)
    }

    /// Load `dir/modhost.toml` if present, otherwise defaults rooted at `dir`.
    pub fn discover(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILENAME);
        if path.is_file() {
            return Self::load(&path);
        }
        Ok(Self {
            modules_dir: dir.join("modules"),
            ..Self::default()
        })
    }

    pub fn with_modules_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.modules_dir = dir.into();
        self
    }
}
