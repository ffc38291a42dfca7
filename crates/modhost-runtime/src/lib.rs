//! Module runtime for modhost
//!
//! Discovers module archives, resolves their dependencies, and drives every
//! module through its lifecycle:
//!
//! ```text
//! Found ──resolve──▶ Provided ──activate──▶ Activated
//!                       ▲                      │
//!                       └─────────stop─────────┘
//!             any state ──dispose──▶ Disposed
//! ```
//!
//! [`Runtime`] ties the pieces together: a [`ModuleRegistry`] scan feeds the
//! [`LifecycleEngine`], which resolves with [`resolver::resolve`], runs
//! [`Activator`] hooks built by [`ActivatorFactories`], and reports
//! transitions through the [`Notifier`]. Extension contributions land in the
//! shared [`ExtensionRegistry`].

pub mod activator;
mod boundary;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod extensions;
pub mod notifier;
pub mod record;
pub mod registry;
pub mod resolver;

pub use activator::{Activator, ActivatorError, ActivatorFactories, ModuleContext, NoopActivator};
pub use config::{CONFIG_FILENAME, RuntimeConfig};
pub use context::{Runtime, StartupReport};
pub use engine::{ActivationReport, LifecycleEngine, StopOutcome};
pub use error::{Error, Result};
pub use extensions::{ConfigurationElement, ExtensionRegistry};
pub use notifier::{ModuleEvent, ModuleObserver, Notifier, ObserverError};
pub use record::{ModuleSnapshot, ModuleState, ResolutionFailure};
pub use registry::{DiscoveredModule, ModuleRegistry, ScanFailure, ScanReport};
pub use resolver::Resolution;
