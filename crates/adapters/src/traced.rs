// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced runner wrapper for consistent observability

use crate::runner::{CommandOutput, CommandRunner, CommandSpec, ExitState, RunError};
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Wrapper that adds tracing to any CommandRunner.
///
/// Logs the command line only; the environment carries credentials.
#[derive(Clone)]
pub struct TracedRunner<R> {
    inner: R,
}

impl<R> TracedRunner<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }
}

fn log_exit(exit: &ExitState, elapsed_ms: u64) {
    match exit.code {
        _ if exit.cancelled => tracing::info!(elapsed_ms, exit_code = ?exit.code, "cancelled"),
        Some(0) => tracing::info!(elapsed_ms, "finished"),
        Some(code) if code == 1 || code >= 100 => {
            tracing::warn!(elapsed_ms, exit_code = code, "finished with warning")
        }
        Some(code) => tracing::error!(elapsed_ms, exit_code = code, "failed"),
        None => tracing::error!(elapsed_ms, "terminated by signal"),
    }
}

#[async_trait]
impl<R: CommandRunner> CommandRunner for TracedRunner<R> {
    async fn run(
        &self,
        spec: &CommandSpec,
        cancel: &CancellationToken,
    ) -> Result<CommandOutput, RunError> {
        let span = tracing::info_span!("borg.run", verb = spec.verb());
        async {
            tracing::info!(cmd = %spec.command_line(), "starting");
            let start = std::time::Instant::now();
            let result = self.inner.run(spec, cancel).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(out) => {
                    log_exit(&out.exit, elapsed_ms);
                    tracing::debug!(
                        stdout_len = out.stdout.len(),
                        stderr_len = out.stderr.len(),
                        "captured"
                    );
                }
                Err(e) => tracing::error!(elapsed_ms, error = %e, "run failed"),
            }

            result
        }
        .instrument(span)
        .await
    }

    async fn stream(
        &self,
        spec: &CommandSpec,
        cancel: &CancellationToken,
        lines: mpsc::Sender<String>,
    ) -> Result<ExitState, RunError> {
        let span = tracing::info_span!("borg.stream", verb = spec.verb());
        async {
            tracing::info!(cmd = %spec.command_line(), "starting");
            let start = std::time::Instant::now();
            let result = self.inner.stream(spec, cancel, lines).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(exit) => log_exit(exit, elapsed_ms),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "stream failed"),
            }

            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
