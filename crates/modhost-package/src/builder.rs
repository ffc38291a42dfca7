//! Package builder: bundles a module artifact with its manifest.

use std::path::{Component, Path, PathBuf};

use flate2::{Compression, GzBuilder};
use modhost_manifest::{EXTENSIONS_FILENAME, MANIFEST_FILENAME, ModuleDescriptor};

use crate::error::{Error, Result};
use crate::{ARCHIVE_EXTENSION, ARTIFACT_DIR, EXTENSIONS_ENTRY, MANIFEST_ENTRY, RESOURCES_DIR};

/// Options for [`PackageBuilder`].
#[derive(Debug, Clone, Default)]
pub struct PackOptions {
    /// Archive file name; defaults to `<symbolicName>-<version>.mpk`.
    pub file_name: Option<String>,
}

/// Builds module archives.
///
/// Output is deterministic: entries are written in a fixed order with
/// zeroed timestamps and ownership, so identical inputs give identical bytes.
#[derive(Debug, Clone, Default)]
pub struct PackageBuilder {
    options: PackOptions,
}

/// Pack with default options. See [`PackageBuilder::pack`].
pub fn pack(project_path: &Path, artifact_path: &Path, output_dir: &Path) -> Result<PathBuf> {
    PackageBuilder::new().pack(project_path, artifact_path, output_dir)
}

impl PackageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: PackOptions) -> Self {
        Self { options }
    }

    /// Bundle `artifact_path`, the project's manifest, its optional extension
    /// declarations and every resource the manifest declares into one archive
    /// inside `output_dir`. Returns the archive path.
    ///
    /// The manifest is looked up inside `project_path` when it is a directory,
    /// or next to it otherwise. Without a manifest nothing is written.
    pub fn pack(
        &self,
        project_path: &Path,
        artifact_path: &Path,
        output_dir: &Path,
    ) -> Result<PathBuf> {
        let project_dir = project_dir_of(project_path);
        let manifest_path = project_dir.join(MANIFEST_FILENAME);
        if !manifest_path.is_file() {
            return Err(Error::MissingManifest {
                project: project_path.to_path_buf(),
                expected: manifest_path,
            });
        }

        let manifest_text = modhost_fs::io::read_text(&manifest_path)?;
        let descriptor =
            ModuleDescriptor::from_text(&manifest_text).map_err(|source| Error::Manifest {
                path: manifest_path.clone(),
                source,
            })?;

        let mut entries: Vec<(String, Vec<u8>)> = Vec::new();
        entries.push((MANIFEST_ENTRY.to_string(), manifest_text.into_bytes()));

        let extensions_path = project_dir.join(EXTENSIONS_FILENAME);
        if extensions_path.is_file() {
            entries.push((
                EXTENSIONS_ENTRY.to_string(),
                modhost_fs::io::read_bytes(&extensions_path)?,
            ));
        }

        let artifact_name = artifact_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::InvalidPath {
                path: artifact_path.to_path_buf(),
                reason: "artifact path has no file name".to_string(),
            })?;
        entries.push((
            format!("{ARTIFACT_DIR}/{artifact_name}"),
            modhost_fs::io::read_bytes(artifact_path)?,
        ));

        let mut resources = descriptor.resources.clone();
        resources.sort();
        for resource in &resources {
            let relative = validate_resource(resource)?;
            let data = modhost_fs::io::read_bytes(&project_dir.join(&relative))?;
            entries.push((format!("{RESOURCES_DIR}/{}", resource.replace('\\', "/")), data));
        }

        let bytes = build_archive(&entries).map_err(|e| Error::io(output_dir, e))?;

        let file_name = self
            .options
            .file_name
            .clone()
            .unwrap_or_else(|| descriptor.archive_file_name(ARCHIVE_EXTENSION));
        let target = output_dir.join(file_name);
        modhost_fs::io::write_atomic(&target, &bytes)?;

        tracing::info!(
            module = %descriptor,
            archive = %target.display(),
            entries = entries.len(),
            "packed module"
        );
        Ok(target)
    }
}

fn project_dir_of(project_path: &Path) -> PathBuf {
    if project_path.is_dir() {
        return project_path.to_path_buf();
    }
    match project_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Resources must stay inside the project directory.
fn validate_resource(resource: &str) -> Result<PathBuf> {
    let path = PathBuf::from(resource.replace('\\', "/"));
    let escapes = path.components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if escapes {
        return Err(Error::InvalidPath {
            path,
            reason: "resources must be relative paths inside the project".to_string(),
        });
    }
    Ok(path)
}

fn build_archive(entries: &[(String, Vec<u8>)]) -> std::io::Result<Vec<u8>> {
    let encoder = GzBuilder::new()
        .mtime(0)
        .write(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for (name, data) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Regular);
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(0);
        header.set_uid(0);
        header.set_gid(0);
        builder.append_data(&mut header, name, data.as_slice())?;
    }

    builder.into_inner()?.finish()
}
