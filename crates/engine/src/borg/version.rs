// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `--version` of the engine and mount binaries

use super::Borg;
use arco_adapters::{CommandRunner, CommandSpec};
use arco_core::{BorgError, BorgEnv, Clock, Status};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use tokio_util::sync::CancellationToken;

/// Release of an installed engine, ordered by version number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BorgVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl BorgVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse `--version` output such as `borg 1.4.3`
    pub fn parse(output: &str) -> Option<Self> {
        static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
        let pattern = PATTERN
            .get_or_init(|| Regex::new(r"(?m)^\S+\s+(\d+)\.(\d+)\.(\d+)").ok())
            .as_ref()?;
        let caps = pattern.captures(output.trim())?;
        Some(Self {
            major: caps[1].parse().ok()?,
            minor: caps[2].parse().ok()?,
            patch: caps[3].parse().ok()?,
        })
    }
}

impl fmt::Display for BorgVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl<R: CommandRunner, C: Clock> Borg<R, C> {
    /// Version of the engine binary
    pub async fn version(&self, cancel: &CancellationToken) -> (Status, Option<BorgVersion>) {
        let spec = self.command(&BorgEnv::default(), ["--version"]);
        self.query_version(spec, cancel).await
    }

    /// Version of the binary used for mount and umount
    pub async fn mount_version(&self, cancel: &CancellationToken) -> (Status, Option<BorgVersion>) {
        let spec = self.mount_command(&BorgEnv::default(), ["--version"]);
        self.query_version(spec, cancel).await
    }

    async fn query_version(
        &self,
        spec: CommandSpec,
        cancel: &CancellationToken,
    ) -> (Status, Option<BorgVersion>) {
        let (status, output) = self.buffered(spec, cancel).await;
        let Some(output) = output.filter(|_| status.is_completed_with_success()) else {
            return (status, None);
        };
        match BorgVersion::parse(&output.stdout) {
            Some(version) => (status, Some(version)),
            None => {
                tracing::warn!(stdout = %output.stdout.trim(), "unrecognized version output");
                let error = BorgError::runtime(format!(
                    "unrecognized version output: {}",
                    output.stdout.trim()
                ));
                (Status::failed(error), None)
            }
        }
    }
}

#[cfg(test)]
#[path = "version_tests.rs"]
mod tests;
