//! Module metadata read from a parsed manifest.
//!
//! # Example manifest
//!
//! ```text
//! name: Workbench UI
//! symbolicName: org.example.ui
//! version: 1.4.0
//! vendor: Example, Inc.
//! activator: org.example.ui.Activator
//! dependencies: org.example.core, org.example.resources
//! resources: icons/app.png, help/index.html
//! ```

use std::fmt;

use semver::Version;

use crate::document::ManifestDocument;
use crate::error::{Error, Result};
use crate::parser::{Dialect, parse_dialect};

/// Manifest keys understood by [`ModuleDescriptor`].
pub mod fields {
    pub const NAME: &str = "name";
    pub const SYMBOLIC_NAME: &str = "symbolicName";
    pub const VERSION: &str = "version";
    pub const VENDOR: &str = "vendor";
    pub const ACTIVATOR: &str = "activator";
    pub const DEPENDENCIES: &str = "dependencies";
    pub const RESOURCES: &str = "resources";
    pub const DESCRIPTION: &str = "description";
}

/// Value of a list field meaning "empty list".
pub const NONE_SENTINEL: &str = "-";

/// Immutable metadata of one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDescriptor {
    /// Human-readable name; defaults to the symbolic name.
    pub name: String,
    /// Globally unique module identifier.
    pub symbolic_name: String,
    pub version: Version,
    pub vendor: Option<String>,
    /// Identifier of the activator factory, if the module has one.
    pub activator: Option<String>,
    /// Symbolic names this module depends on, in declared order.
    pub dependencies: Vec<String>,
    /// Auxiliary resource paths, relative to the module project.
    pub resources: Vec<String>,
    pub description: Option<String>,
}

impl ModuleDescriptor {
    /// Parse manifest text with the manifest dialect and build a descriptor.
    pub fn from_text(text: &str) -> Result<Self> {
        match parse_dialect(text, Dialect::Manifest)? {
            Some(document) => Self::from_document(&document),
            None => Err(Error::MissingField {
                field: fields::SYMBOLIC_NAME,
            }),
        }
    }

    /// Interpret a parsed manifest.
    pub fn from_document(document: &ManifestDocument) -> Result<Self> {
        let symbolic_name = required(document, fields::SYMBOLIC_NAME)?.to_string();
        validate_symbolic_name(&symbolic_name)?;
        let version = parse_version(required(document, fields::VERSION)?)?;

        let name = optional(document, fields::NAME).unwrap_or_else(|| symbolic_name.clone());

        Ok(Self {
            name,
            version,
            vendor: optional(document, fields::VENDOR),
            activator: optional(document, fields::ACTIVATOR),
            dependencies: list(document, fields::DEPENDENCIES),
            resources: list(document, fields::RESOURCES),
            description: optional(document, fields::DESCRIPTION),
            symbolic_name,
        })
    }

    pub fn depends_on(&self, symbolic_name: &str) -> bool {
        self.dependencies.iter().any(|d| d == symbolic_name)
    }

    /// File name of this module's archive: `<symbolicName>-<version>.<extension>`.
    pub fn archive_file_name(&self, extension: &str) -> String {
        format!("{}-{}.{}", self.symbolic_name, self.version, extension)
    }

    /// Render the descriptor back to manifest text.
    pub fn to_manifest_text(&self) -> String {
        let mut out = String::new();
        let mut line = |key: &str, value: &str| {
            out.push_str(key);
            out.push_str(": ");
            out.push_str(value);
            out.push('\n');
        };

        line(fields::NAME, &self.name);
        line(fields::SYMBOLIC_NAME, &self.symbolic_name);
        line(fields::VERSION, &self.version.to_string());
        if let Some(vendor) = &self.vendor {
            line(fields::VENDOR, vendor);
        }
        if let Some(activator) = &self.activator {
            line(fields::ACTIVATOR, activator);
        }
        line(fields::DEPENDENCIES, &render_list(&self.dependencies));
        if !self.resources.is_empty() {
            line(fields::RESOURCES, &render_list(&self.resources));
        }
        if let Some(description) = &self.description {
            line(fields::DESCRIPTION, description);
        }
        out
    }
}

impl fmt::Display for ModuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.symbolic_name, self.version)
    }
}

fn required<'a>(document: &'a ManifestDocument, field: &'static str) -> Result<&'a str> {
    document
        .get(field)
        .filter(|v| !v.is_empty())
        .ok_or(Error::MissingField { field })
}

fn optional(document: &ManifestDocument, field: &str) -> Option<String> {
    document
        .get(field)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn list(document: &ManifestDocument, field: &str) -> Vec<String> {
    let Some(values) = document.get_all(field) else {
        return Vec::new();
    };
    if values.len() == 1 && values[0] == NONE_SENTINEL {
        return Vec::new();
    }

    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values.iter().filter(|v| !v.is_empty()) {
        if !out.contains(value) {
            out.push(value.clone());
        }
    }
    out
}

fn render_list(values: &[String]) -> String {
    if values.is_empty() {
        NONE_SENTINEL.to_string()
    } else {
        values.join(", ")
    }
}

fn validate_symbolic_name(name: &str) -> Result<()> {
    if name.contains(',') || name.chars().any(char::is_whitespace) {
        return Err(Error::InvalidSymbolicName {
            name: name.to_string(),
            reason: "must not contain whitespace or commas".to_string(),
        });
    }
    if name == NONE_SENTINEL {
        return Err(Error::InvalidSymbolicName {
            name: name.to_string(),
            reason: "'-' is reserved".to_string(),
        });
    }
    Ok(())
}

/// Parse a version, padding `1` and `1.2` to full semver.
fn parse_version(raw: &str) -> Result<Version> {
    if let Ok(version) = Version::parse(raw) {
        return Ok(version);
    }

    let parts: Vec<&str> = raw.split('.').collect();
    let padded = match parts.len() {
        1 => format!("{raw}.0.0"),
        2 => format!("{raw}.0"),
        _ => String::new(),
    };

    Version::parse(&padded).map_err(|e| Error::InvalidVersion {
        version: raw.to_string(),
        reason: e.to_string(),
    })
}
