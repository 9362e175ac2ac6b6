//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the attendance
//! and payroll policy from YAML.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{EngineError, EngineResult};

use super::types::{PolicyConfig, PolicyFile};

/// Loads and provides access to policy configuration.
///
/// # Directory Structure
///
/// ```text
/// config/
/// └── policy.yaml   # defaults + per-branch overrides
/// ```
///
/// # Example
///
/// ```no_run
/// use shift_ledger::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config").unwrap();
/// let policy = loader.policy_for("gangnam");
/// println!("Late after {} minutes", policy.late_after_minutes);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    file: PolicyFile,
}

impl ConfigLoader {
    /// Loads `policy.yaml` from the specified directory.
    ///
    /// # Errors
    ///
    /// - `ConfigNotFound` if the file is missing
    /// - `ConfigParseError` if the file is not valid policy YAML
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let policy_path = path.as_ref().join("policy.yaml");
        let file = Self::load_yaml::<PolicyFile>(&policy_path)?;
        debug!(
            path = %policy_path.display(),
            branches = file.branches.len(),
            "Loaded policy configuration"
        );
        Ok(Self { file })
    }

    /// Wraps an already-built policy with no branch overrides.
    pub fn from_policy(defaults: PolicyConfig) -> Self {
        Self {
            file: PolicyFile {
                defaults,
                ..PolicyFile::default()
            },
        }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// The policy shared by every branch.
    pub fn defaults(&self) -> &PolicyConfig {
        &self.file.defaults
    }

    /// The effective policy for a branch: defaults plus that branch's overrides.
    pub fn policy_for(&self, branch_id: &str) -> PolicyConfig {
        match self.file.branches.get(branch_id) {
            Some(over) => self.file.defaults.with_override(over),
            None => self.file.defaults.clone(),
        }
    }
}
