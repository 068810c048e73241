// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Real process runner built on tokio

use super::{CommandOutput, CommandRunner, CommandSpec, ExitState, RunError};
use crate::terminate::{ProcessGroupTerminator, Terminator};
use async_trait::async_trait;
use std::future::Future;
use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Runs commands as child processes in their own process group
#[derive(Clone, Debug)]
pub struct ProcessRunner<T = ProcessGroupTerminator> {
    terminator: T,
    grace: Duration,
}

impl ProcessRunner {
    /// `grace` bounds how long a cancelled process may take to exit
    pub fn new(grace: Duration) -> Self {
        Self::with_terminator(ProcessGroupTerminator, grace)
    }
}

impl<T: Terminator> ProcessRunner<T> {
    pub fn with_terminator(terminator: T, grace: Duration) -> Self {
        Self { terminator, grace }
    }

    fn command(spec: &CommandSpec) -> Command {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .env_clear()
            .envs(spec.env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);
        cmd
    }

    fn spawn(spec: &CommandSpec, mut cmd: Command) -> Result<Child, RunError> {
        cmd.spawn().map_err(|source| RunError::Spawn {
            program: spec.program.clone(),
            source,
        })
    }

    /// Wait for exit; on cancellation interrupt the group, then kill it
    /// once the grace period runs out. Returns whether cancellation fired.
    async fn supervise(
        &self,
        child: &mut Child,
        cancel: &CancellationToken,
    ) -> Result<(ExitStatus, bool), RunError> {
        tokio::select! {
            status = child.wait() => return Ok((status.map_err(RunError::Wait)?, false)),
            _ = cancel.cancelled() => {}
        }

        if let Some(pid) = child.id() {
            tracing::debug!(pid, "interrupting process group");
            if let Err(e) = self.terminator.terminate(pid) {
                tracing::warn!(pid, error = %e, "interrupt failed");
            }
        }

        let status = match tokio::time::timeout(self.grace, child.wait()).await {
            Ok(status) => status.map_err(RunError::Wait)?,
            Err(_) => {
                tracing::warn!(
                    grace_ms = self.grace.as_millis() as u64,
                    "process ignored interrupt, killing"
                );
                if let Some(pid) = child.id() {
                    if let Err(e) = self.terminator.force_kill(pid) {
                        tracing::warn!(pid, error = %e, "group kill failed");
                    }
                }
                // Reaches the direct child even if the group signal failed
                let _ = child.start_kill();
                child.wait().await.map_err(RunError::Wait)?
            }
        };
        Ok((status, true))
    }

    /// Wait for `output` to reach end of file.
    ///
    /// Descendants of an exited child can keep its pipes open. When `cancel`
    /// fires first the process group `pid` led is interrupted, then killed
    /// once the grace period runs out. Returns whether cancellation fired.
    async fn drain<F, O>(
        &self,
        pid: Option<u32>,
        cancel: &CancellationToken,
        output: F,
    ) -> Result<(O, bool), RunError>
    where
        F: Future<Output = Result<O, RunError>>,
    {
        tokio::pin!(output);
        tokio::select! {
            biased;
            out = &mut output => return Ok((out?, false)),
            _ = cancel.cancelled() => {}
        }

        let Some(pid) = pid else {
            return Ok((output.await?, true));
        };
        tracing::debug!(pid, "interrupting processes holding output open");
        if let Err(e) = self.terminator.terminate(pid) {
            tracing::warn!(pid, error = %e, "interrupt failed");
        }
        if let Ok(out) = tokio::time::timeout(self.grace, &mut output).await {
            return Ok((out?, true));
        }
        tracing::warn!(pid, "output still open after interrupt, killing group");
        if let Err(e) = self.terminator.force_kill(pid) {
            tracing::warn!(pid, error = %e, "group kill failed");
        }
        Ok((output.await?, true))
    }
}

#[async_trait]
impl<T: Terminator> CommandRunner for ProcessRunner<T> {
    async fn run(
        &self,
        spec: &CommandSpec,
        cancel: &CancellationToken,
    ) -> Result<CommandOutput, RunError> {
        if cancel.is_cancelled() {
            return Ok(CommandOutput {
                exit: ExitState::cancelled(None),
                stdout: String::new(),
                stderr: String::new(),
            });
        }

        let mut cmd = Self::command(spec);
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        let mut child = Self::spawn(spec, cmd)?;
        let pid = child.id();

        let stdout = tokio::spawn(read_to_string(child.stdout.take()));
        let stderr = tokio::spawn(read_to_string(child.stderr.take()));
        let (status, cancelled) = self.supervise(&mut child, cancel).await?;

        let output = async move {
            let stdout = join(stdout).await?;
            Ok::<_, RunError>((stdout, join(stderr).await?))
        };
        let ((stdout, stderr), late_cancel) = self.drain(pid, cancel, output).await?;
        Ok(CommandOutput {
            exit: ExitState {
                code: status.code(),
                cancelled: cancelled || late_cancel,
            },
            stdout,
            stderr,
        })
    }

    async fn stream(
        &self,
        spec: &CommandSpec,
        cancel: &CancellationToken,
        lines: mpsc::Sender<String>,
    ) -> Result<ExitState, RunError> {
        if cancel.is_cancelled() {
            return Ok(ExitState::cancelled(None));
        }

        let mut cmd = Self::command(spec);
        cmd.stdout(Stdio::null()).stderr(Stdio::piped());
        let mut child = Self::spawn(spec, cmd)?;
        let pid = child.id();

        let reader = tokio::spawn(forward_lines(child.stderr.take(), lines));
        let (status, cancelled) = self.supervise(&mut child, cancel).await?;

        // Every line is delivered before the exit state is reported
        let ((), late_cancel) = self.drain(pid, cancel, join(reader)).await?;
        Ok(ExitState {
            code: status.code(),
            cancelled: cancelled || late_cancel,
        })
    }
}

async fn join<T>(handle: tokio::task::JoinHandle<io::Result<T>>) -> Result<T, RunError> {
    handle
        .await
        .map_err(|e| RunError::Output(io::Error::other(e)))?
        .map_err(RunError::Output)
}

async fn read_to_string<R>(reader: Option<R>) -> io::Result<String>
where
    R: AsyncRead + Unpin,
{
    let Some(mut reader) = reader else {
        return Ok(String::new());
    };
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf).await?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

async fn forward_lines<R>(reader: Option<R>, lines: mpsc::Sender<String>) -> io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return Ok(());
    };
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    let mut receiver_alive = true;
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            return Ok(());
        }
        if !receiver_alive {
            continue;
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\n', '\r']).to_string();
        if lines.send(line).await.is_err() {
            receiver_alive = false;
        }
    }
}

#[cfg(all(test, unix))]
#[path = "process_tests.rs"]
mod tests;
