//! The runtime context: one value owning everything a running host needs.

use std::fmt;
use std::sync::Arc;

use crate::activator::ActivatorFactories;
use crate::config::RuntimeConfig;
use crate::engine::{LifecycleEngine, StopOutcome};
use crate::error::{Error, Result};
use crate::extensions::{ConfigurationElement, ExtensionRegistry};
use crate::notifier::{ModuleObserver, Notifier};
use crate::record::{ModuleSnapshot, ModuleState};
use crate::registry::ModuleRegistry;

/// What [`Runtime::startup`] did.
#[derive(Debug, Default)]
pub struct StartupReport {
    /// Modules loaded into the engine, in discovery order.
    pub discovered: Vec<String>,
    /// Modules activated, in activation order.
    pub activated: Vec<String>,
    /// Every failure met on the way. None of them stopped startup.
    pub errors: Vec<Error>,
}

/// A module host: configuration, lifecycle engine, extension registry and
/// notifier, created once at process start and passed by reference.
pub struct Runtime {
    config: RuntimeConfig,
    engine: LifecycleEngine,
    extensions: Arc<ExtensionRegistry>,
    notifier: Arc<Notifier>,
}

impl Runtime {
    pub fn new(config: RuntimeConfig, factories: ActivatorFactories) -> Self {
        let extensions = Arc::new(ExtensionRegistry::new());
        let notifier = Arc::new(Notifier::new());
        let engine =
            LifecycleEngine::new(factories, Arc::clone(&extensions), Arc::clone(&notifier));
        Self {
            config,
            engine,
            extensions,
            notifier,
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn engine(&self) -> &LifecycleEngine {
        &self.engine
    }

    pub fn extensions(&self) -> &Arc<ExtensionRegistry> {
        &self.extensions
    }

    pub fn add_observer(&self, observer: Arc<dyn ModuleObserver>) {
        self.notifier.subscribe(observer);
    }

    fn registry(&self) -> ModuleRegistry {
        ModuleRegistry::new(&self.config.modules_dir)
            .with_extension(&self.config.archive_extension)
    }

    /// Scan, resolve and activate.
    ///
    /// Only an unreadable modules directory fails the call; every other
    /// failure is collected in the report.
    pub fn startup(&self) -> Result<StartupReport> {
        tracing::info!(dir = %self.config.modules_dir.display(), "starting module runtime");
        let mut report = StartupReport::default();

        let (discovered, errors) = self.refresh()?;
        report.discovered = discovered;
        report.errors = errors;

        if self.config.activate_on_startup {
            if self.config.auto_start.is_empty() {
                let activation = self.engine.activate_all();
                report.activated = activation.activated;
                report.errors.extend(activation.failures);
            } else {
                for name in &self.config.auto_start {
                    match self.engine.activate(name) {
                        Ok(()) => report.activated.push(name.clone()),
                        Err(error) => report.errors.push(error),
                    }
                }
            }
        }

        tracing::info!(
            discovered = report.discovered.len(),
            activated = report.activated.len(),
            errors = report.errors.len(),
            "module runtime started"
        );
        Ok(report)
    }

    /// Rescan the modules directory, load modules not seen before and
    /// resolve. Returns the newly loaded names and every failure.
    pub fn refresh(&self) -> Result<(Vec<String>, Vec<Error>)> {
        let scan = self.registry().scan()?;
        let mut errors: Vec<Error> = scan.failures.into_iter().map(|f| f.error).collect();

        let (added, load_errors) = self.engine.load(scan.modules);
        errors.extend(load_errors);
        errors.extend(self.engine.resolve().errors());
        Ok((added, errors))
    }

    /// Activate a module, rescanning first when the name is unknown.
    ///
    /// When the rescan still does not find the module, the problems it ran
    /// into come back as [`Error::NotDiscovered`].
    pub fn start(&self, name: &str) -> Result<()> {
        if !self.engine.contains(name) {
            let (added, problems) = self.refresh()?;
            tracing::debug!(module = name, added = added.len(), "rescanned for module");
            for problem in &problems {
                tracing::warn!(module = name, error = %problem, "rescan reported a problem");
            }
            if !self.engine.contains(name) && !problems.is_empty() {
                return Err(Error::NotDiscovered {
                    name: name.to_string(),
                    problems,
                });
            }
        }
        self.engine.activate(name)
    }

    pub fn stop(&self, name: &str) -> Result<StopOutcome> {
        self.engine.stop(name)
    }

    pub fn dispose(&self, name: &str) -> Result<()> {
        self.engine.dispose(name)
    }

    /// Dispose every module and drop all extension contributions.
    pub fn shutdown(&self) -> Vec<Error> {
        let errors = self.engine.dispose_all();
        self.extensions.clear();
        tracing::info!(errors = errors.len(), "module runtime stopped");
        errors
    }

    pub fn configuration_elements(&self, point: &str) -> Vec<ConfigurationElement> {
        self.extensions.configuration_elements(point)
    }

    pub fn modules(&self) -> Vec<ModuleSnapshot> {
        self.engine.modules()
    }

    pub fn state_of(&self, name: &str) -> Option<ModuleState> {
        self.engine.state_of(name)
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("config", &self.config)
            .field("engine", &self.engine)
            .field("observers", &self.notifier.len())
            .finish()
    }
}
