//! Module activators and the factory registry that creates them.
//!
//! A manifest names its activator by a stable identifier
//! (`activator: org.example.core.Activator`). The host registers a factory
//! for every identifier it can run before startup; the engine looks the
//! identifier up when the module is first activated.

use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use modhost_manifest::ModuleDescriptor;

use crate::extensions::{ConfigurationElement, ExtensionRegistry};

/// Error a hook returns to refuse a transition.
pub type ActivatorError = Box<dyn StdError + Send + Sync>;

/// Hooks a module implements to join and leave the running system.
///
/// Hooks run on the caller's thread while the engine's state lock is held,
/// so they must not call back into the engine.
pub trait Activator: Send {
    fn on_activate(&mut self, ctx: &ModuleContext) -> Result<(), ActivatorError>;

    /// Called when the module is stopped but not disposed.
    fn on_stop(&mut self, _ctx: &ModuleContext) -> Result<(), ActivatorError> {
        Ok(())
    }

    fn on_dispose(&mut self, ctx: &ModuleContext) -> Result<(), ActivatorError>;
}

/// Activator for modules that declare none.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopActivator;

impl Activator for NoopActivator {
    fn on_activate(&mut self, _ctx: &ModuleContext) -> Result<(), ActivatorError> {
        Ok(())
    }

    fn on_dispose(&mut self, _ctx: &ModuleContext) -> Result<(), ActivatorError> {
        Ok(())
    }
}

/// What an activator hook can see of its module and the runtime.
#[derive(Clone)]
pub struct ModuleContext {
    descriptor: Arc<ModuleDescriptor>,
    archive: PathBuf,
    extensions: Arc<ExtensionRegistry>,
}

impl ModuleContext {
    pub(crate) fn new(
        descriptor: Arc<ModuleDescriptor>,
        archive: PathBuf,
        extensions: Arc<ExtensionRegistry>,
    ) -> Self {
        Self {
            descriptor,
            archive,
            extensions,
        }
    }

    pub fn symbolic_name(&self) -> &str {
        &self.descriptor.symbolic_name
    }

    pub fn descriptor(&self) -> &ModuleDescriptor {
        &self.descriptor
    }

    pub fn archive_path(&self) -> &Path {
        &self.archive
    }

    pub fn extensions(&self) -> &Arc<ExtensionRegistry> {
        &self.extensions
    }

    /// Shorthand for [`ExtensionRegistry::configuration_elements`].
    pub fn configuration_elements(&self, point: &str) -> Vec<ConfigurationElement> {
        self.extensions.configuration_elements(point)
    }
}

impl fmt::Debug for ModuleContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleContext")
            .field("module", &self.descriptor.symbolic_name)
            .field("archive", &self.archive)
            .finish()
    }
}

type FactoryFn = dyn Fn(&ModuleDescriptor) -> Box<dyn Activator> + Send + Sync;

/// Activator factories keyed by activator identifier.
#[derive(Clone, Default)]
pub struct ActivatorFactories {
    factories: HashMap<String, Arc<FactoryFn>>,
}

impl ActivatorFactories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory. A later registration for the same id replaces it.
    pub fn register<F>(&mut self, id: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&ModuleDescriptor) -> Box<dyn Activator> + Send + Sync + 'static,
    {
        self.factories.insert(id.into(), Arc::new(factory));
        self
    }

    /// Register a factory that builds `A::default()`.
    pub fn register_default<A>(&mut self, id: impl Into<String>) -> &mut Self
    where
        A: Activator + Default + 'static,
    {
        self.register(id, |_: &ModuleDescriptor| -> Box<dyn Activator> {
            Box::new(A::default())
        })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    /// Build a fresh activator for `descriptor`, if `id` is registered.
    pub fn create(&self, id: &str, descriptor: &ModuleDescriptor) -> Option<Box<dyn Activator>> {
        self.factories.get(id).map(|factory| factory(descriptor))
    }

    /// Registered identifiers, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.factories.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for ActivatorFactories {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivatorFactories")
            .field("ids", &self.ids())
            .finish()
    }
}
