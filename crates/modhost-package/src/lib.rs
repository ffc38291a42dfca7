//! Module packaging for the modhost runtime.
//!
//! A module package (`.mpk`) is a gzip-compressed tar archive with a fixed
//! layout:
//!
//! ```text
//! META-INF/MANIFEST.MF      module manifest (required)
//! META-INF/EXTENSIONS.MF    extension declarations (optional)
//! bin/<artifact>            primary binary artifact
//! resources/<path>          auxiliary resources declared in the manifest
//! ```
//!
//! [`pack`] builds such an archive from a project directory and
//! [`ModuleArchive`] reads one back.

pub mod archive;
pub mod builder;
pub mod error;

/// Archive entry holding the module manifest.
pub const MANIFEST_ENTRY: &str = "META-INF/MANIFEST.MF";

/// Archive entry holding the extension declarations.
pub const EXTENSIONS_ENTRY: &str = "META-INF/EXTENSIONS.MF";

/// Archive directory holding the primary artifact.
pub const ARTIFACT_DIR: &str = "bin";

/// Archive directory holding auxiliary resources.
pub const RESOURCES_DIR: &str = "resources";

/// Default file extension of module archives.
pub const ARCHIVE_EXTENSION: &str = "mpk";

pub use archive::ModuleArchive;
pub use builder::{PackOptions, PackageBuilder, pack};
pub use error::{Error, Result};
