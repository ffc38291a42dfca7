//! Error types for modhost-package

use std::path::PathBuf;

/// Result type for packaging operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while packing or reading module archives.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The project has no manifest next to it; nothing was written.
    #[error("no manifest found for project {project} (expected {expected})")]
    MissingManifest { project: PathBuf, expected: PathBuf },

    /// The archive contains no manifest entry.
    #[error("archive {archive} contains no manifest")]
    NoManifest { archive: PathBuf },

    /// The manifest exists but cannot be interpreted.
    #[error("invalid manifest in {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: modhost_manifest::Error,
    },

    /// A declared artifact or resource path is unusable.
    #[error("invalid path {path}: {reason}")]
    InvalidPath { path: PathBuf, reason: String },

    /// Reading inputs or writing the archive failed.
    #[error("packaging I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<modhost_fs::Error> for Error {
    fn from(err: modhost_fs::Error) -> Self {
        match err {
            modhost_fs::Error::Io { path, source } => Self::Io { path, source },
            modhost_fs::Error::LockFailed { path } => Self::Io {
                path,
                source: std::io::Error::other("could not lock output file"),
            },
            other => Self::Io {
                path: PathBuf::new(),
                source: std::io::Error::other(other.to_string()),
            },
        }
    }
}
