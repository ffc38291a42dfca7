//! Per-module bookkeeping owned by the lifecycle engine.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use modhost_manifest::ModuleDescriptor;

use crate::activator::Activator;
use crate::error::Error;

/// Lifecycle state of a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleState {
    /// Discovered and parsed, dependencies not (yet) satisfied.
    Found,
    /// Every dependency is present and resolvable.
    Provided,
    /// The activation hook completed.
    Activated,
    /// Terminal.
    Disposed,
}

impl ModuleState {
    pub fn is_terminal(self) -> bool {
        self == Self::Disposed
    }
}

impl fmt::Display for ModuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Found => write!(f, "found"),
            Self::Provided => write!(f, "provided"),
            Self::Activated => write!(f, "activated"),
            Self::Disposed => write!(f, "disposed"),
        }
    }
}

/// Why a module could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionFailure {
    /// Dependencies that are absent or themselves unresolvable.
    Unresolved { missing: Vec<String> },
    /// The module is part of a dependency cycle with these members.
    Cyclic { members: Vec<String> },
}

impl ResolutionFailure {
    pub fn to_error(&self, module: &str) -> Error {
        match self {
            Self::Unresolved { missing } => Error::UnresolvedDependency {
                module: module.to_string(),
                missing: missing.clone(),
            },
            Self::Cyclic { members } => Error::CyclicDependency {
                members: members.clone(),
            },
        }
    }
}

impl fmt::Display for ResolutionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unresolved { missing } => write!(f, "unresolved: {}", missing.join(", ")),
            Self::Cyclic { members } => write!(f, "cycle: {}", members.join(" -> ")),
        }
    }
}

pub(crate) struct ModuleRecord {
    pub(crate) descriptor: Arc<ModuleDescriptor>,
    pub(crate) archive: PathBuf,
    pub(crate) state: ModuleState,
    pub(crate) activator: Option<Box<dyn Activator>>,
    pub(crate) failure: Option<ResolutionFailure>,
}

impl ModuleRecord {
    pub(crate) fn new(descriptor: ModuleDescriptor, archive: PathBuf) -> Self {
        Self {
            descriptor: Arc::new(descriptor),
            archive,
            state: ModuleState::Found,
            activator: None,
            failure: None,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.descriptor.symbolic_name
    }

    pub(crate) fn snapshot(&self) -> ModuleSnapshot {
        ModuleSnapshot {
            descriptor: Arc::clone(&self.descriptor),
            archive: self.archive.clone(),
            state: self.state,
            failure: self.failure.clone(),
        }
    }
}

/// A point-in-time copy of a module's record.
#[derive(Debug, Clone)]
pub struct ModuleSnapshot {
    descriptor: Arc<ModuleDescriptor>,
    archive: PathBuf,
    state: ModuleState,
    failure: Option<ResolutionFailure>,
}

impl ModuleSnapshot {
    pub fn symbolic_name(&self) -> &str {
        &self.descriptor.symbolic_name
    }

    pub fn descriptor(&self) -> &ModuleDescriptor {
        &self.descriptor
    }

    pub fn archive(&self) -> &Path {
        &self.archive
    }

    pub fn state(&self) -> ModuleState {
        self.state
    }

    /// The last resolution failure, for modules left in Found.
    pub fn failure(&self) -> Option<&ResolutionFailure> {
        self.failure.as_ref()
    }
}
