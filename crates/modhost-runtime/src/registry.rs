//! Discovery of module archives in a directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use modhost_manifest::ModuleDescriptor;
use modhost_package::{ARCHIVE_EXTENSION, ModuleArchive};

use crate::error::{Error, Result};

/// A module read from an archive, ready to be handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredModule {
    pub descriptor: ModuleDescriptor,
    pub archive: PathBuf,
    /// Raw extension-declaration text, if the archive carries one.
    pub extensions: Option<String>,
}

impl DiscoveredModule {
    pub fn new(descriptor: ModuleDescriptor, archive: impl Into<PathBuf>) -> Self {
        Self {
            descriptor,
            archive: archive.into(),
            extensions: None,
        }
    }

    pub fn with_extensions(mut self, text: impl Into<String>) -> Self {
        self.extensions = Some(text.into());
        self
    }

    pub fn symbolic_name(&self) -> &str {
        &self.descriptor.symbolic_name
    }

    /// Read a module from the archive at `path`.
    pub fn from_archive(path: &Path) -> Result<Self> {
        let archive = ModuleArchive::open(path)?;
        let descriptor = archive.descriptor()?;
        Ok(Self {
            descriptor,
            archive: path.to_path_buf(),
            extensions: archive.extensions().map(str::to_string),
        })
    }
}

/// An archive the scan had to skip.
#[derive(Debug)]
pub struct ScanFailure {
    pub archive: PathBuf,
    pub error: Error,
}

/// Result of scanning a module directory.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Modules in discovery order.
    pub modules: Vec<DiscoveredModule>,
    pub failures: Vec<ScanFailure>,
}

impl ScanReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn into_errors(self) -> Vec<Error> {
        self.failures.into_iter().map(|f| f.error).collect()
    }
}

/// Scans a directory for module archives.
#[derive(Debug, Clone)]
pub struct ModuleRegistry {
    dir: PathBuf,
    extension: String,
}

impl ModuleRegistry {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            extension: ARCHIVE_EXTENSION.to_string(),
        }
    }

    /// Look for archives ending in `.<extension>` instead of `.mpk`.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read every archive in the directory, in file-name order.
    ///
    /// Broken archives and duplicate symbolic names are reported in
    /// [`ScanReport::failures`] and never stop the scan. Only an unreadable
    /// directory fails the call.
    pub fn scan(&self) -> Result<ScanReport> {
        let archives = modhost_fs::io::list_files(&self.dir, Some(&self.extension))?;
        tracing::debug!(dir = %self.dir.display(), count = archives.len(), "scanning for modules");

        let mut report = ScanReport::default();
        let mut seen: HashMap<String, PathBuf> = HashMap::new();

        for path in archives {
            let module = match DiscoveredModule::from_archive(&path) {
                Ok(module) => module,
                Err(error) => {
                    tracing::warn!(archive = %path.display(), %error, "skipping module archive");
                    report.failures.push(ScanFailure {
                        archive: path,
                        error,
                    });
                    continue;
                }
            };

            if let Some(first) = seen.get(module.symbolic_name()) {
                let error = Error::DuplicateModule {
                    symbolic_name: module.symbolic_name().to_string(),
                    first: first.clone(),
                    duplicate: path.clone(),
                };
                tracing::warn!(%error, "skipping duplicate module");
                report.failures.push(ScanFailure {
                    archive: path,
                    error,
                });
                continue;
            }

            tracing::debug!(module = %module.descriptor, archive = %path.display(), "found module");
            seen.insert(module.symbolic_name().to_string(), path);
            report.modules.push(module);
        }

        Ok(report)
    }
}
