//! Shared test utilities for the modhost workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`project`]: [`ModuleProject`] and [`TestHost`] for building module
//!   archives in scratch directories
//! - [`activators`]: activators that record or fail their hooks
//! - [`observers`]: observers that record or fail notifications

pub mod activators;
pub mod observers;
pub mod project;

pub use activators::{FailingActivator, Hook, HookLog, RecordingActivator};
pub use observers::{FailingObserver, RecordingObserver};
pub use project::{ModuleProject, TestHost};
