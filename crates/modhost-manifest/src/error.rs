//! Error types for modhost-manifest

/// Result type for manifest operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while tokenizing or interpreting a manifest.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A chunk could not be split into key and value. The whole parse is
    /// aborted; no partial document is produced.
    #[error("parse error in chunk {position} ('{chunk}'): {reason}")]
    Parse {
        position: usize,
        chunk: String,
        reason: String,
    },

    /// A mandatory manifest field is absent or blank.
    #[error("missing mandatory manifest field '{field}'")]
    MissingField { field: &'static str },

    /// The `version` field is not a usable version.
    #[error("invalid version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    /// The `symbolicName` field cannot serve as a module identifier.
    #[error("invalid symbolic name '{name}': {reason}")]
    InvalidSymbolicName { name: String, reason: String },
}
