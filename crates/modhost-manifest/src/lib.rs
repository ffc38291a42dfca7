//! Manifest parsing for the modhost module runtime.
//!
//! Two layers live here:
//!
//! - [`parser`]: a generic tokenizer that turns `key: value[, value]*` text
//!   into an ordered [`ManifestDocument`], parameterised by delimiter sets so
//!   the same engine reads module manifests, property files and the block
//!   structured extension declarations.
//! - [`descriptor`]: interprets a parsed manifest as [`ModuleDescriptor`]
//!   metadata (symbolic name, version, activator, dependencies).
//!
//! # Example
//!
//! ```
//! use modhost_manifest::ModuleDescriptor;
//!
//! let descriptor = ModuleDescriptor::from_text(
//!     "symbolicName: org.example.ui\nversion: 1.2\ndependencies: org.example.core",
//! )
//! .unwrap();
//! assert_eq!(descriptor.version.to_string(), "1.2.0");
//! assert_eq!(descriptor.dependencies, vec!["org.example.core"]);
//! ```

pub mod descriptor;
pub mod document;
pub mod error;
pub mod parser;

/// Canonical file name of a module manifest.
pub const MANIFEST_FILENAME: &str = "MANIFEST.MF";

/// Canonical file name of a module's extension declarations.
pub const EXTENSIONS_FILENAME: &str = "EXTENSIONS.MF";

pub use descriptor::ModuleDescriptor;
pub use document::{Chunk, ManifestDocument};
pub use error::{Error, Result};
pub use parser::{Dialect, ParseOptions, parse, parse_dialect};
