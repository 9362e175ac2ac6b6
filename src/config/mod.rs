//! Configuration loading and management for the shift ledger.
//!
//! This module loads the attendance and payroll policy from YAML: grace
//! windows, the discipline threshold, the withholding rate and the archive
//! retention window, with optional per-branch overrides.
//!
//! # Example
//!
//! ```no_run
//! use shift_ledger::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config").unwrap();
//! println!("Suspend after {} absences", config.defaults().discipline_threshold);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{PolicyConfig, PolicyFile, PolicyOverride};
