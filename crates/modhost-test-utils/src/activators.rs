//! Activators that record their hooks or fail on demand.

use std::sync::{Arc, Mutex};

use modhost_manifest::ModuleDescriptor;
use modhost_runtime::{Activator, ActivatorError, ModuleContext};

/// Shared, ordered log of hook invocations such as `activate:org.a`.
#[derive(Debug, Clone, Default)]
pub struct HookLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl HookLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, hook: &str, module: &str) {
        self.entries.lock().unwrap().push(format!("{hook}:{module}"));
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    /// Modules whose `hook` ran, in order.
    pub fn modules_for(&self, hook: &str) -> Vec<String> {
        let prefix = format!("{hook}:");
        self.entries()
            .iter()
            .filter_map(|e| e.strip_prefix(&prefix).map(str::to_string))
            .collect()
    }

    pub fn count(&self, hook: &str, module: &str) -> usize {
        let entry = format!("{hook}:{module}");
        self.entries().iter().filter(|e| **e == entry).count()
    }
}

/// Records `activate`, `stop` and `dispose` calls into a [`HookLog`].
pub struct RecordingActivator {
    log: HookLog,
}

impl RecordingActivator {
    pub fn new(log: HookLog) -> Self {
        Self { log }
    }

    /// A factory closure for [`modhost_runtime::ActivatorFactories::register`].
    pub fn factory(
        log: &HookLog,
    ) -> impl Fn(&ModuleDescriptor) -> Box<dyn Activator> + Send + Sync + 'static {
        let log = log.clone();
        move |_: &ModuleDescriptor| -> Box<dyn Activator> {
            Box::new(RecordingActivator::new(log.clone()))
        }
    }
}

impl Activator for RecordingActivator {
    fn on_activate(&mut self, ctx: &ModuleContext) -> Result<(), ActivatorError> {
        self.log.push("activate", ctx.symbolic_name());
        Ok(())
    }

    fn on_stop(&mut self, ctx: &ModuleContext) -> Result<(), ActivatorError> {
        self.log.push("stop", ctx.symbolic_name());
        Ok(())
    }

    fn on_dispose(&mut self, ctx: &ModuleContext) -> Result<(), ActivatorError> {
        self.log.push("dispose", ctx.symbolic_name());
        Ok(())
    }
}

/// Which hook a [`FailingActivator`] breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    Activate,
    Stop,
    Dispose,
}

/// Returns an error from (or panics in) one hook and records the others.
pub struct FailingActivator {
    hook: Hook,
    panic: bool,
    log: HookLog,
}

impl FailingActivator {
    pub fn erroring(hook: Hook, log: HookLog) -> Self {
        Self {
            hook,
            panic: false,
            log,
        }
    }

    pub fn panicking(hook: Hook, log: HookLog) -> Self {
        Self {
            hook,
            panic: true,
            log,
        }
    }

    fn run(&self, hook: Hook, name: &str, ctx: &ModuleContext) -> Result<(), ActivatorError> {
        self.log.push(name, ctx.symbolic_name());
        if hook != self.hook {
            return Ok(());
        }
        if self.panic {
            panic!("{name} hook of {} panicked", ctx.symbolic_name());
        }
        Err(format!("{name} hook of {} refused", ctx.symbolic_name()).into())
    }
}

impl Activator for FailingActivator {
    fn on_activate(&mut self, ctx: &ModuleContext) -> Result<(), ActivatorError> {
        self.run(Hook::Activate, "activate", ctx)
    }

    fn on_stop(&mut self, ctx: &ModuleContext) -> Result<(), ActivatorError> {
        self.run(Hook::Stop, "stop", ctx)
    }

    fn on_dispose(&mut self, ctx: &ModuleContext) -> Result<(), ActivatorError> {
        self.run(Hook::Dispose, "dispose", ctx)
    }
}
