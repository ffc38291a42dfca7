//! Filesystem helpers for the modhost module runtime
//!
//! Provides atomic writes, plain reads, flat directory listing and a
//! format-agnostic configuration store.

pub mod config;
pub mod error;
pub mod io;

pub use config::ConfigStore;
pub use error::{Error, Result};
