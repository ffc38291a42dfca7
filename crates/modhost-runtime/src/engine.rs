//! The module lifecycle engine.
//!
//! Every module moves through `Found -> Provided -> Activated -> Disposed`.
//! Stopping an active module returns it to `Provided`; `Disposed` is final.
//!
//! All transitions are serialized behind one mutex. Activator hooks run on
//! the caller's thread while that lock is held; observer notifications are
//! queued and delivered only after it is released, so observers may query
//! the engine.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::activator::{Activator, ActivatorFactories, ModuleContext, NoopActivator};
use crate::boundary::guarded;
use crate::error::{Error, Result};
use crate::extensions::ExtensionRegistry;
use crate::notifier::{ModuleEvent, Notifier};
use crate::record::{ModuleRecord, ModuleSnapshot, ModuleState};
use crate::registry::DiscoveredModule;
use crate::resolver::{self, Resolution};

/// Result of [`LifecycleEngine::activate_all`].
#[derive(Debug, Default)]
pub struct ActivationReport {
    /// Modules activated by this call, in activation order.
    pub activated: Vec<String>,
    pub failures: Vec<Error>,
}

/// Result of a successful [`LifecycleEngine::stop`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopOutcome {
    /// False when the module was not active.
    pub stopped: bool,
    /// Active modules that depend on the stopped one. They keep running.
    pub orphaned: Vec<String>,
}

#[derive(Default)]
struct EngineState {
    records: Vec<ModuleRecord>,
    index: HashMap<String, usize>,
    /// Activation order from the last resolution.
    order: Vec<String>,
    /// Modules currently active, in the order they were activated.
    active: Vec<String>,
    /// Records were loaded since the last resolution.
    dirty: bool,
}

impl EngineState {
    fn position(&self, name: &str) -> Result<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| Error::unknown(name))
    }
}

/// Owns every module record and drives its transitions.
pub struct LifecycleEngine {
    state: Mutex<EngineState>,
    factories: ActivatorFactories,
    extensions: Arc<ExtensionRegistry>,
    notifier: Arc<Notifier>,
}

impl LifecycleEngine {
    pub fn new(
        factories: ActivatorFactories,
        extensions: Arc<ExtensionRegistry>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            state: Mutex::new(EngineState::default()),
            factories,
            extensions,
            notifier,
        }
    }

    pub fn notifier(&self) -> &Arc<Notifier> {
        &self.notifier
    }

    pub fn extensions(&self) -> &Arc<ExtensionRegistry> {
        &self.extensions
    }

    /// Add discovered modules in state Found and register the extension
    /// contributions they carry.
    ///
    /// A module already loaded from the same archive is skipped silently; one
    /// whose symbolic name is taken by another archive is rejected with
    /// [`Error::DuplicateModule`]. A module whose extension file is malformed is
    /// still loaded. Returns the names that were added.
    pub fn load(&self, modules: Vec<DiscoveredModule>) -> (Vec<String>, Vec<Error>) {
        let mut state = self.lock();
        let mut added = Vec::new();
        let mut errors = Vec::new();

        for module in modules {
            let name = module.descriptor.symbolic_name.clone();
            if let Some(&existing) = state.index.get(&name) {
                let first = &state.records[existing].archive;
                if *first != module.archive {
                    errors.push(Error::DuplicateModule {
                        symbolic_name: name,
                        first: first.clone(),
                        duplicate: module.archive,
                    });
                }
                continue;
            }

            tracing::debug!(module = %module.descriptor, "module found");
            if let Some(text) = &module.extensions {
                if let Err(error) = self.extensions.add_contributions(&name, text) {
                    tracing::warn!(%error, "rejected extension declarations");
                    errors.push(error);
                }
            }
            let position = state.records.len();
            state
                .records
                .push(ModuleRecord::new(module.descriptor, module.archive));
            state.index.insert(name.clone(), position);
            state.dirty = true;
            added.push(name);
        }
        (added, errors)
    }

    /// Resolve every module that is not disposed.
    ///
    /// Resolvable Found modules become Provided; Provided modules that lost a
    /// dependency fall back to Found. Active modules are left alone.
    pub fn resolve(&self) -> Resolution {
        let mut state = self.lock();
        Self::resolve_locked(&mut state)
    }

    fn resolve_locked(state: &mut EngineState) -> Resolution {
        let resolution = {
            let live: Vec<_> = state
                .records
                .iter()
                .filter(|r| r.state != ModuleState::Disposed)
                .map(|r| r.descriptor.as_ref())
                .collect();
            resolver::resolve(&live)
        };

        for record in state
            .records
            .iter_mut()
            .filter(|r| r.state != ModuleState::Disposed)
        {
            match resolution.failure(record.name()) {
                Some(failure) => {
                    if record.state == ModuleState::Provided {
                        record.state = ModuleState::Found;
                    }
                    if record.state == ModuleState::Found {
                        tracing::warn!(module = record.name(), %failure, "module not resolved");
                    }
                    record.failure = Some(failure.clone());
                }
                None => {
                    if record.state == ModuleState::Found {
                        tracing::info!(module = record.name(), "module provided");
                        record.state = ModuleState::Provided;
                    }
                    record.failure = None;
                }
            }
        }

        state.order = resolution.order.clone();
        state.dirty = false;
        resolution
    }

    /// Activation order of the last resolution.
    pub fn activation_order(&self) -> Vec<String> {
        self.lock().order.clone()
    }

    /// Activate a module, activating its dependencies first.
    ///
    /// Activating an active module is a no-op. A failing or panicking hook
    /// leaves the module Provided and is reported as
    /// [`Error::ActivationFailed`].
    pub fn activate(&self, name: &str) -> Result<()> {
        let mut events = Vec::new();
        let result = {
            let mut state = self.lock();
            if state.dirty {
                Self::resolve_locked(&mut state);
            }
            self.activate_locked(&mut state, name, &mut events)
        };
        self.notifier.notify_all(&events);
        result
    }

    /// Activate every Provided module in activation order.
    pub fn activate_all(&self) -> ActivationReport {
        let mut events = Vec::new();
        let mut report = ActivationReport::default();
        {
            let mut state = self.lock();
            if state.dirty {
                Self::resolve_locked(&mut state);
            }
            for name in state.order.clone() {
                let Ok(position) = state.position(&name) else {
                    continue;
                };
                if state.records[position].state != ModuleState::Provided {
                    continue;
                }
                match self.activate_locked(&mut state, &name, &mut events) {
                    Ok(()) => report.activated.push(name),
                    Err(error) => report.failures.push(error),
                }
            }
        }
        self.notifier.notify_all(&events);
        report
    }

    fn activate_locked(
        &self,
        state: &mut EngineState,
        name: &str,
        events: &mut Vec<ModuleEvent>,
    ) -> Result<()> {
        let position = state.position(name)?;
        match state.records[position].state {
            ModuleState::Activated => return Ok(()),
            ModuleState::Disposed => {
                return Err(Error::ModuleDisposed {
                    name: name.to_string(),
                });
            }
            ModuleState::Found => {
                let record = &state.records[position];
                return Err(match &record.failure {
                    Some(failure) => failure.to_error(name),
                    None => Error::UnresolvedDependency {
                        module: name.to_string(),
                        missing: Vec::new(),
                    },
                });
            }
            ModuleState::Provided => {}
        }

        let descriptor = Arc::clone(&state.records[position].descriptor);
        for dependency in &descriptor.dependencies {
            if let Err(error) = self.activate_locked(state, dependency, events) {
                let error = Error::ActivationFailed {
                    module: name.to_string(),
                    reason: format!("dependency '{dependency}' did not activate: {error}"),
                };
                tracing::error!(%error, "module activation failed");
                return Err(error);
            }
        }

        let record = &mut state.records[position];
        let ctx = ModuleContext::new(
            Arc::clone(&descriptor),
            record.archive.clone(),
            Arc::clone(&self.extensions),
        );
        let mut activator = match record.activator.take() {
            Some(activator) => activator,
            None => self.instantiate(name, &descriptor)?,
        };

        match guarded(|| activator.on_activate(&ctx)) {
            Ok(()) => {
                record.activator = Some(activator);
                record.state = ModuleState::Activated;
                state.active.push(name.to_string());
                events.push(ModuleEvent::Started(name.to_string()));
                tracing::info!(module = %descriptor, "module activated");
                Ok(())
            }
            Err(reason) => {
                let error = Error::ActivationFailed {
                    module: name.to_string(),
                    reason,
                };
                tracing::error!(%error, "module activation failed");
                Err(error)
            }
        }
    }

    fn instantiate(
        &self,
        name: &str,
        descriptor: &modhost_manifest::ModuleDescriptor,
    ) -> Result<Box<dyn Activator>> {
        let Some(id) = descriptor.activator.as_deref() else {
            return Ok(Box::new(NoopActivator));
        };
        self.factories
            .create(id, descriptor)
            .ok_or_else(|| Error::ActivationFailed {
                module: name.to_string(),
                reason: format!("no activator factory registered for '{id}'"),
            })
    }

    /// Stop an active module, returning it to Provided.
    ///
    /// Active dependents are not stopped; they are listed in the outcome.
    /// A failing stop hook is reported as [`Error::StopFailed`] but the module
    /// is stopped regardless.
    pub fn stop(&self, name: &str) -> Result<StopOutcome> {
        let mut events = Vec::new();
        let result = {
            let mut state = self.lock();
            self.stop_locked(&mut state, name, &mut events)
        };
        self.notifier.notify_all(&events);
        result
    }

    fn stop_locked(
        &self,
        state: &mut EngineState,
        name: &str,
        events: &mut Vec<ModuleEvent>,
    ) -> Result<StopOutcome> {
        let position = state.position(name)?;
        match state.records[position].state {
            ModuleState::Disposed => {
                return Err(Error::ModuleDisposed {
                    name: name.to_string(),
                });
            }
            ModuleState::Found | ModuleState::Provided => return Ok(StopOutcome::default()),
            ModuleState::Activated => {}
        }

        let orphaned: Vec<String> = state
            .records
            .iter()
            .filter(|r| r.state == ModuleState::Activated && r.descriptor.depends_on(name))
            .map(|r| r.name().to_string())
            .collect();

        let record = &mut state.records[position];
        let ctx = ModuleContext::new(
            Arc::clone(&record.descriptor),
            record.archive.clone(),
            Arc::clone(&self.extensions),
        );
        let outcome = match record.activator.as_mut() {
            Some(activator) => guarded(|| activator.on_stop(&ctx)),
            None => Ok(()),
        };
        record.state = ModuleState::Provided;
        state.active.retain(|n| n != name);
        events.push(ModuleEvent::Stopped(name.to_string()));
        tracing::info!(module = name, "module stopped");

        if !orphaned.is_empty() {
            tracing::warn!(
                module = name,
                dependents = ?orphaned,
                "stopped module still has active dependents"
            );
        }

        match outcome {
            Ok(()) => Ok(StopOutcome {
                stopped: true,
                orphaned,
            }),
            Err(reason) => {
                let error = Error::StopFailed {
                    module: name.to_string(),
                    reason,
                };
                tracing::error!(%error, "module stop hook failed");
                Err(error)
            }
        }
    }

    /// Dispose a module. Disposed modules can never be activated again.
    ///
    /// A failing deactivation hook is reported as
    /// [`Error::DeactivationFailed`] but the module is disposed regardless.
    pub fn dispose(&self, name: &str) -> Result<()> {
        let mut events = Vec::new();
        let result = {
            let mut state = self.lock();
            self.dispose_locked(&mut state, name, &mut events)
        };
        self.notifier.notify_all(&events);
        result
    }

    /// Dispose everything: active modules in reverse activation order, then
    /// the rest in reverse discovery order.
    pub fn dispose_all(&self) -> Vec<Error> {
        let mut events = Vec::new();
        let mut errors = Vec::new();
        {
            let mut state = self.lock();
            let mut names: Vec<String> = state.active.iter().rev().cloned().collect();
            names.extend(
                state
                    .records
                    .iter()
                    .rev()
                    .filter(|r| r.state != ModuleState::Activated)
                    .map(|r| r.name().to_string()),
            );
            for name in names {
                if let Err(error) = self.dispose_locked(&mut state, &name, &mut events) {
                    errors.push(error);
                }
            }
        }
        self.notifier.notify_all(&events);
        errors
    }

    fn dispose_locked(
        &self,
        state: &mut EngineState,
        name: &str,
        events: &mut Vec<ModuleEvent>,
    ) -> Result<()> {
        let position = state.position(name)?;
        let record = &mut state.records[position];
        if record.state == ModuleState::Disposed {
            return Ok(());
        }

        let was_active = record.state == ModuleState::Activated;
        let ctx = ModuleContext::new(
            Arc::clone(&record.descriptor),
            record.archive.clone(),
            Arc::clone(&self.extensions),
        );
        let outcome = match record.activator.take() {
            Some(mut activator) => guarded(|| activator.on_dispose(&ctx)),
            None => Ok(()),
        };
        record.state = ModuleState::Disposed;
        record.failure = None;
        state.active.retain(|n| n != name);
        state.order.retain(|n| n != name);
        self.extensions.remove_contributions(name);
        if was_active {
            events.push(ModuleEvent::Stopped(name.to_string()));
        }
        tracing::info!(module = name, "module disposed");

        outcome.map_err(|reason| {
            let error = Error::DeactivationFailed {
                module: name.to_string(),
                reason,
            };
            tracing::error!(%error, "module deactivation hook failed");
            error
        })
    }

    /// Every module, in discovery order.
    pub fn modules(&self) -> Vec<ModuleSnapshot> {
        self.lock().records.iter().map(ModuleRecord::snapshot).collect()
    }

    pub fn found(&self) -> Vec<ModuleSnapshot> {
        self.in_state(ModuleState::Found)
    }

    pub fn provided(&self) -> Vec<ModuleSnapshot> {
        self.in_state(ModuleState::Provided)
    }

    pub fn activated(&self) -> Vec<ModuleSnapshot> {
        self.in_state(ModuleState::Activated)
    }

    pub fn state_of(&self, name: &str) -> Option<ModuleState> {
        let state = self.lock();
        state
            .index
            .get(name)
            .map(|&position| state.records[position].state)
    }

    pub fn snapshot(&self, name: &str) -> Option<ModuleSnapshot> {
        let state = self.lock();
        state
            .index
            .get(name)
            .map(|&position| state.records[position].snapshot())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lock().index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn in_state(&self, wanted: ModuleState) -> Vec<ModuleSnapshot> {
        self.lock()
            .records
            .iter()
            .filter(|r| r.state == wanted)
            .map(ModuleRecord::snapshot)
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for LifecycleEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleEngine")
            .field("modules", &self.len())
            .field("factories", &self.factories)
            .finish()
    }
}
