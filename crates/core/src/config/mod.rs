// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration
//!
//! Loaded once from TOML and passed to every constructor that needs it.
//! Every field has a default, so an empty document is a valid config.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors from loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Engine binary, resolved through `PATH` when relative
    pub binary_path: PathBuf,
    /// Binary used for mount/umount; falls back to `binary_path`
    pub mount_binary_path: Option<PathBuf>,
    pub ssh_private_keys: Vec<PathBuf>,
    /// Overrides the platform runtime directory mounts are created under
    pub mount_root: Option<PathBuf>,
    /// How long a cancelled process may take to exit before it is killed
    #[serde(with = "humantime_serde")]
    pub termination_grace: Duration,
    pub auth: AuthConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            binary_path: PathBuf::from("borg"),
            mount_binary_path: None,
            ssh_private_keys: Vec::new(),
            mount_root: None,
            termination_grace: Duration::from_secs(30),
            auth: AuthConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn mount_binary(&self) -> &Path {
        self.mount_binary_path.as_deref().unwrap_or(&self.binary_path)
    }

    pub fn with_binary_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.binary_path = path.into();
        self
    }

    pub fn with_termination_grace(mut self, grace: Duration) -> Self {
        self.termination_grace = grace;
        self
    }
}

/// Timing of authentication session polling
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Wait between attempts to (re)open the status stream
    #[serde(with = "humantime_serde")]
    pub retry_interval: Duration,
    pub max_retries: u32,
    #[serde(with = "humantime_serde")]
    pub session_lifetime: Duration,
    /// Delay before a finished session is forgotten
    #[serde(with = "humantime_serde")]
    pub gc_delay: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            retry_interval: Duration::from_secs(30),
            max_retries: 20,
            session_lifetime: Duration::from_secs(10 * 60),
            gc_delay: Duration::from_secs(5 * 60),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
