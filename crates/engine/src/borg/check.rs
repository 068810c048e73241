// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Repository consistency check

use super::Borg;
use arco_adapters::CommandRunner;
use arco_core::{CheckResult, Clock, LogMessage, LogRecord};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// How thorough a check is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckMode {
    /// Repository segments only
    #[default]
    Quick,
    /// Read and verify every chunk of every archive
    Full,
}

impl CheckMode {
    fn flag(self) -> &'static str {
        match self {
            CheckMode::Quick => "--repository-only",
            CheckMode::Full => "--verify-data",
        }
    }
}

impl<R: CommandRunner, C: Clock> Borg<R, C> {
    /// Check a repository.
    ///
    /// Findings exit with the warning code, which still completes
    /// successfully; they are listed in `error_logs`.
    pub async fn check(
        &self,
        cancel: &CancellationToken,
        repository: &str,
        passphrase: &str,
        mode: CheckMode,
    ) -> CheckResult {
        let spec = self.command(
            &self.env(passphrase),
            ["check", mode.flag(), "--log-json", repository],
        );
        let (status, error_logs) = self.streaming(spec, cancel, collect_errors).await;
        if !error_logs.is_empty() {
            tracing::warn!(repository, findings = error_logs.len(), "check reported problems");
        }
        CheckResult { status, error_logs }
    }
}

async fn collect_errors(mut records: mpsc::Receiver<LogRecord>) -> Vec<LogMessage> {
    let mut errors = Vec::new();
    while let Some(record) = records.recv().await {
        if let LogRecord::LogMessage(msg) = record {
            if msg.level.is_error() {
                errors.push(msg);
            }
        }
    }
    errors
}

#[cfg(test)]
#[path = "check_tests.rs"]
mod tests;
