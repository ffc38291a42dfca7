//! Reading module archives.

use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use modhost_manifest::ModuleDescriptor;

use crate::error::{Error, Result};
use crate::{ARTIFACT_DIR, EXTENSIONS_ENTRY, MANIFEST_ENTRY, RESOURCES_DIR};

/// The contents of a module archive, minus artifact and resource bytes.
#[derive(Debug, Clone)]
pub struct ModuleArchive {
    path: PathBuf,
    manifest: String,
    extensions: Option<String>,
    artifact: Option<String>,
    resources: Vec<String>,
}

impl ModuleArchive {
    /// Open the archive at `path`.
    ///
    /// Fails with [`Error::NoManifest`] when the archive has no manifest entry.
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = modhost_fs::io::read_bytes(path)?;
        Self::from_bytes(path, &bytes)
    }

    /// Read an archive already loaded into memory. `path` is used for
    /// reporting only.
    pub fn from_bytes(path: impl Into<PathBuf>, bytes: &[u8]) -> Result<Self> {
        let path = path.into();
        let mut manifest = None;
        let mut extensions = None;
        let mut artifact = None;
        let mut resources = Vec::new();

        let mut archive = tar::Archive::new(GzDecoder::new(bytes));
        let entries = archive.entries().map_err(|e| Error::io(&path, e))?;
        for entry in entries {
            let mut entry = entry.map_err(|e| Error::io(&path, e))?;
            if !entry.header().entry_type().is_file() {
                continue;
            }
            let name = entry
                .path()
                .map_err(|e| Error::io(&path, e))?
                .to_string_lossy()
                .replace('\\', "/");

            if name == MANIFEST_ENTRY {
                manifest = Some(read_text_entry(&mut entry, &path)?);
            } else if name == EXTENSIONS_ENTRY {
                extensions = Some(read_text_entry(&mut entry, &path)?);
            } else if let Some(rest) = strip_dir(&name, ARTIFACT_DIR) {
                artifact = Some(rest.to_string());
            } else if let Some(rest) = strip_dir(&name, RESOURCES_DIR) {
                resources.push(rest.to_string());
            }
        }

        let manifest = manifest.ok_or_else(|| Error::NoManifest {
            archive: path.clone(),
        })?;

        Ok(Self {
            path,
            manifest,
            extensions,
            artifact,
            resources,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw manifest text.
    pub fn manifest(&self) -> &str {
        &self.manifest
    }

    /// Raw extension-declaration text, if the archive carries one.
    pub fn extensions(&self) -> Option<&str> {
        self.extensions.as_deref()
    }

    /// File name of the primary artifact.
    pub fn artifact(&self) -> Option<&str> {
        self.artifact.as_deref()
    }

    /// Resource paths relative to the resources directory.
    pub fn resources(&self) -> &[String] {
        &self.resources
    }

    /// Parse the manifest into a module descriptor.
    pub fn descriptor(&self) -> Result<ModuleDescriptor> {
        ModuleDescriptor::from_text(&self.manifest).map_err(|source| Error::Manifest {
            path: self.path.join(MANIFEST_ENTRY),
            source,
        })
    }

    /// Read a resource's bytes back from disk.
    pub fn read_resource(&self, resource: &str) -> Result<Option<Vec<u8>>> {
        let wanted = format!("{RESOURCES_DIR}/{resource}");
        let bytes = modhost_fs::io::read_bytes(&self.path)?;
        let mut archive = tar::Archive::new(GzDecoder::new(bytes.as_slice()));
        for entry in archive.entries().map_err(|e| Error::io(&self.path, e))? {
            let mut entry = entry.map_err(|e| Error::io(&self.path, e))?;
            let name = entry
                .path()
                .map_err(|e| Error::io(&self.path, e))?
                .to_string_lossy()
                .replace('\\', "/");
            if name == wanted {
                let mut data = Vec::new();
                entry
                    .read_to_end(&mut data)
                    .map_err(|e| Error::io(&self.path, e))?;
                return Ok(Some(data));
            }
        }
        Ok(None)
    }
}

fn strip_dir<'a>(name: &'a str, dir: &str) -> Option<&'a str> {
    name.strip_prefix(dir)
        .and_then(|rest| rest.strip_prefix('/'))
        .filter(|rest| !rest.is_empty())
}

fn read_text_entry<R: Read>(entry: &mut R, archive: &Path) -> Result<String> {
    let mut text = String::new();
    entry
        .read_to_string(&mut text)
        .map_err(|e| Error::io(archive, e))?;
    Ok(text)
}
