//! Error types for modhost-runtime

use std::path::PathBuf;

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while discovering, resolving or running modules.
///
/// Every failure cause has its own variant so callers can branch on it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading or interpreting a module archive failed.
    #[error(transparent)]
    Package(#[from] modhost_package::Error),

    /// Filesystem failure outside of archive handling.
    #[error(transparent)]
    Fs(#[from] modhost_fs::Error),

    /// A second archive declares a symbolic name that is already known.
    #[error("duplicate module '{symbolic_name}' in {duplicate} (first seen in {first})")]
    DuplicateModule {
        symbolic_name: String,
        first: PathBuf,
        duplicate: PathBuf,
    },

    /// Some dependencies are absent or cannot themselves be resolved.
    #[error("module '{module}' has unresolved dependencies: {}", .missing.join(", "))]
    UnresolvedDependency { module: String, missing: Vec<String> },

    /// Modules that depend on each other in a cycle.
    #[error("cyclic dependency between modules: {}", .members.join(" -> "))]
    CyclicDependency { members: Vec<String> },

    /// No module with this symbolic name was discovered.
    #[error("unknown module '{name}'")]
    UnknownModule { name: String },

    /// A rescan did not find the module but reported problems, one of which
    /// may be an unreadable archive of the module itself.
    #[error(
        "module '{name}' not found; rescan reported {} problem(s), first: {}",
        .problems.len(),
        .problems.first().map(ToString::to_string).unwrap_or_default()
    )]
    NotDiscovered { name: String, problems: Vec<Error> },

    /// The module has been disposed and can never run again.
    #[error("module '{name}' has been disposed")]
    ModuleDisposed { name: String },

    /// The activation hook failed; the module stayed Provided.
    #[error("activation of module '{module}' failed: {reason}")]
    ActivationFailed { module: String, reason: String },

    /// The stopping hook failed; the module was stopped regardless.
    #[error("stopping module '{module}' failed: {reason}")]
    StopFailed { module: String, reason: String },

    /// The deactivation hook failed; the module was disposed regardless.
    #[error("deactivation of module '{module}' failed: {reason}")]
    DeactivationFailed { module: String, reason: String },

    /// An extension declaration lacks a required attribute. The contributing
    /// module's whole extension file is rejected.
    #[error("extension element {element} of module '{contributor}' is missing '{attribute}'")]
    MissingAttribute {
        contributor: String,
        element: usize,
        attribute: &'static str,
    },

    /// An extension declaration repeats a key that identifies the element,
    /// usually two declarations missing the blank line between them.
    #[error("extension element {element} of module '{contributor}' repeats '{attribute}'")]
    DuplicateAttribute {
        contributor: String,
        element: usize,
        attribute: &'static str,
    },

    /// A module's extension file could not be tokenized.
    #[error("invalid extension declarations in module '{contributor}': {source}")]
    InvalidExtensions {
        contributor: String,
        #[source]
        source: modhost_manifest::Error,
    },

    /// The runtime configuration could not be loaded.
    #[error("invalid configuration {path}: {message}")]
    Config { path: PathBuf, message: String },
}

impl Error {
    pub fn unknown(name: impl Into<String>) -> Self {
        Self::UnknownModule { name: name.into() }
    }

    /// The module this error is about, when it concerns a single module.
    pub fn module(&self) -> Option<&str> {
        match self {
            Self::DuplicateModule { symbolic_name, .. } => Some(symbolic_name),
            Self::UnresolvedDependency { module, .. }
            | Self::ActivationFailed { module, .. }
            | Self::StopFailed { module, .. }
            | Self::DeactivationFailed { module, .. } => Some(module),
            Self::UnknownModule { name }
            | Self::NotDiscovered { name, .. }
            | Self::ModuleDisposed { name } => Some(name),
            Self::MissingAttribute { contributor, .. }
            | Self::DuplicateAttribute { contributor, .. }
            | Self::InvalidExtensions { contributor, .. } => Some(contributor),
            _ => None,
        }
    }
}
