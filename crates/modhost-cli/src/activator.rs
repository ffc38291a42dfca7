//! Activators built into the `modhost` binary.

use std::sync::Arc;

use modhost_runtime::{
    Activator, ActivatorError, ActivatorFactories, ModuleContext, ModuleObserver, ObserverError,
};

/// Activator id modules can name to get [`LoggingActivator`].
pub const LOGGING_ACTIVATOR: &str = "modhost.LoggingActivator";

/// Logs every hook and the module's extension contributions.
#[derive(Debug, Default)]
pub struct LoggingActivator;

impl Activator for LoggingActivator {
    fn on_activate(&mut self, ctx: &ModuleContext) -> Result<(), ActivatorError> {
        let contributions = ctx.extensions().contributions_of(ctx.symbolic_name()).len();
        tracing::info!(
            module = %ctx.descriptor(),
            archive = %ctx.archive_path().display(),
            contributions,
            "activating"
        );
        Ok(())
    }

    fn on_stop(&mut self, ctx: &ModuleContext) -> Result<(), ActivatorError> {
        tracing::info!(module = ctx.symbolic_name(), "stopping");
        Ok(())
    }

    fn on_dispose(&mut self, ctx: &ModuleContext) -> Result<(), ActivatorError> {
        tracing::info!(module = ctx.symbolic_name(), "disposing");
        Ok(())
    }
}

pub fn builtin_factories() -> ActivatorFactories {
    let mut factories = ActivatorFactories::new();
    factories.register_default::<LoggingActivator>(LOGGING_ACTIVATOR);
    factories
}

/// Prints lifecycle notifications to stdout.
#[derive(Debug, Default)]
pub struct ConsoleObserver;

impl ConsoleObserver {
    pub fn shared() -> Arc<dyn ModuleObserver> {
        Arc::new(Self)
    }
}

impl ModuleObserver for ConsoleObserver {
    fn on_module_started(&self, name: &str) -> Result<(), ObserverError> {
        use colored::Colorize;
        println!("{} {name}", "started".green());
        Ok(())
    }

    fn on_module_stopped(&self, name: &str) -> Result<(), ObserverError> {
        use colored::Colorize;
        println!("{} {name}", "stopped".yellow());
        Ok(())
    }
}
