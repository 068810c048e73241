// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted command runner for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{CommandOutput, CommandRunner, CommandSpec, ExitState, RunError};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Which runner entry point a call used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Buffered,
    Streaming,
}

/// Recorded runner call
#[derive(Debug, Clone)]
pub struct RunnerCall {
    pub mode: RunMode,
    pub program: PathBuf,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

impl RunnerCall {
    pub fn env_var(&self, key: &str) -> Option<&str> {
        self.env
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Scripted reply to one invocation
#[derive(Debug, Clone, Default)]
pub struct FakeResponse {
    code: i32,
    stdout: String,
    lines: Vec<String>,
    hang: bool,
    spawn_error: Option<String>,
}

impl FakeResponse {
    pub fn exit(code: i32) -> Self {
        Self {
            code,
            ..Self::default()
        }
    }

    /// Fail as if the binary could not be started
    pub fn spawn_failure(message: impl Into<String>) -> Self {
        Self {
            spawn_error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn stdout(mut self, stdout: impl Into<String>) -> Self {
        self.stdout = stdout.into();
        self
    }

    /// Append one stderr line
    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    pub fn lines<I>(mut self, lines: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.lines.extend(lines.into_iter().map(Into::into));
        self
    }

    /// Emit the lines, then block until the run is cancelled
    pub fn hang_until_cancelled(mut self) -> Self {
        self.hang = true;
        self
    }
}

/// Fake runner replaying scripted responses per engine verb.
///
/// Responses for a verb are consumed in order; an unscripted call exits 0
/// with no output.
#[derive(Clone, Default)]
pub struct FakeRunner {
    responses: Arc<Mutex<HashMap<String, VecDeque<FakeResponse>>>>,
    calls: Arc<Mutex<Vec<RunnerCall>>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next invocation of `verb`
    pub fn respond(&self, verb: &str, response: FakeResponse) -> &Self {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(verb.to_string())
            .or_default()
            .push_back(response);
        self
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<RunnerCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Argument vectors of all recorded calls
    pub fn invocations(&self) -> Vec<Vec<String>> {
        self.calls().into_iter().map(|c| c.args).collect()
    }

    fn record(&self, mode: RunMode, spec: &CommandSpec) -> Result<FakeResponse, RunError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RunnerCall {
                mode,
                program: spec.program.clone(),
                args: spec.args.clone(),
                env: spec.env.clone(),
            });
        let response = self
            .responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get_mut(spec.verb())
            .and_then(VecDeque::pop_front)
            .unwrap_or_default();
        match &response.spawn_error {
            Some(message) => Err(RunError::Spawn {
                program: spec.program.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, message.clone()),
            }),
            None => Ok(response),
        }
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(
        &self,
        spec: &CommandSpec,
        cancel: &CancellationToken,
    ) -> Result<CommandOutput, RunError> {
        let response = self.record(RunMode::Buffered, spec)?;
        let mut stderr = response.lines.join("\n");
        if !stderr.is_empty() {
            stderr.push('\n');
        }
        let exit = if response.hang {
            cancel.cancelled().await;
            ExitState::cancelled(None)
        } else {
            ExitState::exited(response.code)
        };
        Ok(CommandOutput {
            exit,
            stdout: response.stdout,
            stderr,
        })
    }

    async fn stream(
        &self,
        spec: &CommandSpec,
        cancel: &CancellationToken,
        lines: mpsc::Sender<String>,
    ) -> Result<ExitState, RunError> {
        let response = self.record(RunMode::Streaming, spec)?;
        for line in response.lines {
            if lines.send(line).await.is_err() {
                break;
            }
        }
        if response.hang {
            cancel.cancelled().await;
            return Ok(ExitState::cancelled(None));
        }
        Ok(ExitState::exited(response.code))
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
