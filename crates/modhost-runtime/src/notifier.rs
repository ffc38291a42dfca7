//! Started/stopped notification fan-out.

use std::error::Error as StdError;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::boundary::guarded;

/// Error an observer returns when it cannot handle a notification.
pub type ObserverError = Box<dyn StdError + Send + Sync>;

/// Host-side consumer of module lifecycle notifications.
pub trait ModuleObserver: Send + Sync {
    fn on_module_started(&self, symbolic_name: &str) -> Result<(), ObserverError>;

    fn on_module_stopped(&self, symbolic_name: &str) -> Result<(), ObserverError>;
}

/// A lifecycle notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleEvent {
    Started(String),
    Stopped(String),
}

impl ModuleEvent {
    pub fn symbolic_name(&self) -> &str {
        match self {
            Self::Started(name) | Self::Stopped(name) => name,
        }
    }
}

impl fmt::Display for ModuleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started(name) => write!(f, "started {name}"),
            Self::Stopped(name) => write!(f, "stopped {name}"),
        }
    }
}

/// Delivers events to every subscribed observer.
///
/// Each delivery runs inside its own error boundary: an observer that
/// returns an error or panics is logged and skipped, and the remaining
/// observers still receive the event.
#[derive(Default)]
pub struct Notifier {
    observers: RwLock<Vec<Arc<dyn ModuleObserver>>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, observer: Arc<dyn ModuleObserver>) {
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    /// Remove a previously subscribed observer. Returns whether it was found.
    pub fn unsubscribe(&self, observer: &Arc<dyn ModuleObserver>) -> bool {
        let mut observers = self.observers.write().unwrap_or_else(PoisonError::into_inner);
        let before = observers.len();
        observers.retain(|o| !Arc::ptr_eq(o, observer));
        observers.len() != before
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver `event`; returns how many observers accepted it.
    pub fn notify(&self, event: &ModuleEvent) -> usize {
        let mut delivered = 0;
        for observer in self.snapshot() {
            let outcome = guarded(|| match event {
                ModuleEvent::Started(name) => observer.on_module_started(name),
                ModuleEvent::Stopped(name) => observer.on_module_stopped(name),
            });
            match outcome {
                Ok(()) => delivered += 1,
                Err(reason) => tracing::warn!(%event, %reason, "module observer failed"),
            }
        }
        delivered
    }

    pub fn notify_all(&self, events: &[ModuleEvent]) {
        for event in events {
            self.notify(event);
        }
    }

    fn snapshot(&self) -> Vec<Arc<dyn ModuleObserver>> {
        self.observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("observers", &self.len())
            .finish()
    }
}
