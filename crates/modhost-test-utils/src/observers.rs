//! Observers that record or reject notifications.

use std::sync::Mutex;

use modhost_runtime::{ModuleEvent, ModuleObserver, ObserverError};

/// Keeps every event it receives.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ModuleEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ModuleEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn started(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ModuleEvent::Started(name) => Some(name),
                ModuleEvent::Stopped(_) => None,
            })
            .collect()
    }

    pub fn stopped(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ModuleEvent::Stopped(name) => Some(name),
                ModuleEvent::Started(_) => None,
            })
            .collect()
    }
}

impl ModuleObserver for RecordingObserver {
    fn on_module_started(&self, name: &str) -> Result<(), ObserverError> {
        self.events
            .lock()
            .unwrap()
            .push(ModuleEvent::Started(name.to_string()));
        Ok(())
    }

    fn on_module_stopped(&self, name: &str) -> Result<(), ObserverError> {
        self.events
            .lock()
            .unwrap()
            .push(ModuleEvent::Stopped(name.to_string()));
        Ok(())
    }
}

/// Errors on every start and panics on every stop.
#[derive(Debug, Default)]
pub struct FailingObserver;

impl ModuleObserver for FailingObserver {
    fn on_module_started(&self, name: &str) -> Result<(), ObserverError> {
        Err(format!("cannot handle start of {name}").into())
    }

    fn on_module_stopped(&self, name: &str) -> Result<(), ObserverError> {
        panic!("observer panicked on stop of {name}")
    }
}
