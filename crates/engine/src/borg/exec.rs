// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Running one engine command and classifying how it ended

use super::Borg;
use arco_adapters::{CommandOutput, CommandRunner, CommandSpec, ExitState, RunError};
use arco_core::{decode_stream, sanitize_output, BorgError, Clock, LogRecord, Status};
use serde::de::DeserializeOwned;
use std::future::Future;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const LINE_BUFFER: usize = 256;
const RECORD_BUFFER: usize = 64;

/// The single mapping from a process ending to a [`Status`]
pub(crate) fn exit_status(exit: ExitState) -> Status {
    if exit.cancelled {
        return Status::cancelled();
    }
    match exit.code {
        Some(code) => Status::from_exit_code(code),
        None => Status::failed(BorgError::runtime("engine process terminated by signal")),
    }
}

pub(crate) fn run_error_status(err: RunError) -> Status {
    Status::failed(BorgError::runtime("failed to run engine process").with_cause(err))
}

/// Decode the JSON document of a buffered `--json` verb
pub(crate) fn decode_json<T: DeserializeOwned>(stdout: &str) -> Result<T, Status> {
    let sanitized = sanitize_output(stdout);
    if !sanitized.banner.is_empty() {
        tracing::warn!(banner = sanitized.banner, "engine printed text before its JSON output");
    }
    serde_json::from_str(sanitized.json).map_err(|e| {
        Status::failed(BorgError::runtime("failed to decode engine output").with_cause(e))
    })
}

impl<R: CommandRunner, C: Clock> Borg<R, C> {
    /// Run to completion. Output is returned only when the process exited.
    pub(crate) async fn buffered(
        &self,
        spec: CommandSpec,
        cancel: &CancellationToken,
    ) -> (Status, Option<CommandOutput>) {
        match self.runner.run(&spec, cancel).await {
            Ok(output) => (exit_status(output.exit), Some(output)),
            Err(e) => (run_error_status(e), None),
        }
    }

    /// Buffered run of a verb that prints one JSON document on stdout
    pub(crate) async fn buffered_json<T: DeserializeOwned>(
        &self,
        spec: CommandSpec,
        cancel: &CancellationToken,
    ) -> (Status, Option<T>) {
        let (status, output) = self.buffered(spec, cancel).await;
        let Some(output) = output.filter(|_| status.is_completed_with_success()) else {
            return (status, None);
        };
        match decode_json(&output.stdout) {
            Ok(value) => (status, Some(value)),
            Err(failed) => (failed, None),
        }
    }

    /// Run while decoding stderr into records for `consume`.
    ///
    /// Returns once the process has exited and `consume` has seen every
    /// record, so nothing emitted just before exit is lost.
    pub(crate) async fn streaming<F, Fut, T>(
        &self,
        spec: CommandSpec,
        cancel: &CancellationToken,
        consume: F,
    ) -> (Status, T)
    where
        F: FnOnce(mpsc::Receiver<LogRecord>) -> Fut,
        Fut: Future<Output = T>,
    {
        let (line_tx, line_rx) = mpsc::channel(LINE_BUFFER);
        let (record_tx, record_rx) = mpsc::channel(RECORD_BUFFER);
        let (exit, decoded, value) = tokio::join!(
            self.runner.stream(&spec, cancel, line_tx),
            decode_stream(line_rx, record_tx),
            consume(record_rx),
        );
        tracing::trace!(verb = spec.verb(), decoded, "record stream closed");
        let status = match exit {
            Ok(exit) => exit_status(exit),
            Err(e) => run_error_status(e),
        };
        (status, value)
    }
}

#[cfg(test)]
#[path = "exec_tests.rs"]
mod tests;
