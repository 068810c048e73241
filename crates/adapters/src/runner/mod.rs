// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine process execution

mod process;

pub use process::ProcessRunner;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeResponse, FakeRunner, RunMode, RunnerCall};

use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Errors from starting or supervising a process
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to start {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed waiting for process: {0}")]
    Wait(#[source] std::io::Error),
    #[error("failed reading process output: {0}")]
    Output(#[source] std::io::Error),
}

/// Program, arguments and the complete environment of one invocation
#[derive(Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Replaces the inherited environment entirely
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I>(mut self, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, env: Vec<(String, String)>) -> Self {
        self.env = env;
        self
    }

    /// First non-flag argument, or the first argument when all are flags
    pub fn verb(&self) -> &str {
        self.args
            .iter()
            .find(|a| !a.starts_with('-'))
            .or(self.args.first())
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Printable command line. Never includes the environment.
    pub fn command_line(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

impl fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSpec")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("env_count", &self.env.len())
            .finish()
    }
}

/// How a supervised process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitState {
    /// Exit code; `None` when the process was ended by a signal
    pub code: Option<i32>,
    /// The caller cancelled the run before the process exited on its own
    pub cancelled: bool,
}

impl ExitState {
    pub fn exited(code: i32) -> Self {
        Self {
            code: Some(code),
            cancelled: false,
        }
    }

    pub fn cancelled(code: Option<i32>) -> Self {
        Self {
            code,
            cancelled: true,
        }
    }
}

/// Result of a buffered run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit: ExitState,
    pub stdout: String,
    pub stderr: String,
}

/// Runs engine processes.
///
/// Both modes honour `cancel`: the process tree is asked to stop, and the
/// call returns only after the process has exited and its output has been
/// drained.
#[async_trait]
pub trait CommandRunner: Clone + Send + Sync + 'static {
    /// Run to completion and collect stdout and stderr
    async fn run(
        &self,
        spec: &CommandSpec,
        cancel: &CancellationToken,
    ) -> Result<CommandOutput, RunError>;

    /// Run with stdout discarded, forwarding each stderr line in order
    async fn stream(
        &self,
        spec: &CommandSpec,
        cancel: &CancellationToken,
        lines: mpsc::Sender<String>,
    ) -> Result<ExitState, RunError>;
}

#[cfg(test)]
#[path = "spec_tests.rs"]
mod tests;
