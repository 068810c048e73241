// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The engine's verbs as typed async calls.
//!
//! Every verb takes a cancellation token and returns a [`Status`] (plus a
//! payload where the verb produces one). Process failures never surface as
//! `Err`: they are classified once, in `exec`, and passed through unchanged.

mod check;
mod create;
mod exec;
mod mount;
mod prune;
mod repo;
mod version;

pub use check::CheckMode;
pub use mount::{
    archive_mount_dir, default_mount_root, repository_mount_dir, MountTableError, Mounts,
};
pub use repo::EncryptionMode;
pub use version::BorgVersion;

use arco_adapters::{CommandRunner, CommandSpec, ProcessRunner, TracedRunner};
use arco_core::{BorgEnv, Clock, EngineConfig, Status, SystemClock};
use std::path::PathBuf;
use std::sync::Arc;

/// Engine client bound to one configuration
#[derive(Clone)]
pub struct Borg<R, C = SystemClock> {
    runner: R,
    clock: C,
    config: Arc<EngineConfig>,
}

impl Borg<TracedRunner<ProcessRunner>, SystemClock> {
    /// Client running real processes with the configured termination grace
    pub fn from_config(config: EngineConfig) -> Self {
        let runner = TracedRunner::new(ProcessRunner::new(config.termination_grace));
        Self::new(runner, SystemClock, config)
    }
}

impl<R: CommandRunner, C: Clock> Borg<R, C> {
    pub fn new(runner: R, clock: C, config: EngineConfig) -> Self {
        Self {
            runner,
            clock,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub(crate) fn clock(&self) -> &C {
        &self.clock
    }

    fn env(&self, passphrase: &str) -> BorgEnv {
        BorgEnv::new(self.config.ssh_private_keys.iter().cloned()).with_passphrase(passphrase)
    }

    fn command<I>(&self, env: &BorgEnv, args: I) -> CommandSpec
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        CommandSpec::new(&self.config.binary_path)
            .args(args)
            .env(env.build())
    }

    fn mount_command<I>(&self, env: &BorgEnv, args: I) -> CommandSpec
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        CommandSpec::new(self.config.mount_binary())
            .args(args)
            .env(env.build())
    }

    fn mount_root(&self) -> PathBuf {
        self.config
            .mount_root
            .clone()
            .unwrap_or_else(default_mount_root)
    }
}

/// Status for a request rejected before any process was started
fn invalid_request(message: &'static str) -> Status {
    Status::failed(arco_core::BorgError::runtime(message))
}
