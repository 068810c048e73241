// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retention pruning and the compaction that must follow it

use super::{invalid_request, Borg};
use arco_adapters::CommandRunner;
use arco_core::{
    Clock, KeepArchive, LogRecord, PruneArchive, PruneJob, PruneResult, Status,
};
use regex::Regex;
use std::sync::OnceLock;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// One `--list` line of a prune run
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PruneLine {
    Pruned(PruneArchive),
    Kept(KeepArchive),
}

struct Patterns {
    pruned: Regex,
    kept: Regex,
}

fn patterns() -> Option<&'static Patterns> {
    static PATTERNS: OnceLock<Option<Patterns>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| {
            Some(Patterns {
                pruned: Regex::new(r"^(?:Would prune|Pruning archive(?: \(\d+/\d+\))?):\s+(\S+)")
                    .ok()?,
                kept: Regex::new(r"^Keeping archive(?: \(rule: ([^)]*)\))?:\s+(\S+)").ok()?,
            })
        })
        .as_ref()
}

pub(crate) fn parse_prune_line(text: &str) -> Option<PruneLine> {
    let patterns = patterns()?;
    if let Some(caps) = patterns.pruned.captures(text) {
        let name = caps.get(1)?.as_str().to_string();
        return Some(PruneLine::Pruned(PruneArchive { name }));
    }
    let caps = patterns.kept.captures(text)?;
    Some(PruneLine::Kept(KeepArchive {
        name: caps.get(2)?.as_str().to_string(),
        reason: caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default(),
    }))
}

impl<R: CommandRunner, C: Clock> Borg<R, C> {
    /// Prune the job's archives, then compact the repository.
    ///
    /// A dry run only reports what would be pruned and skips compaction. A
    /// failed compaction is the returned status.
    pub async fn prune(&self, cancel: &CancellationToken, job: &PruneJob) -> (Status, PruneResult) {
        let mut result = PruneResult {
            is_dry_run: job.dry_run,
            ..PruneResult::default()
        };
        if job.rule.is_empty() {
            return (invalid_request("prune requires at least one retention rule"), result);
        }

        let mut args = vec![
            "prune".to_string(),
            "--list".to_string(),
            "--log-json".to_string(),
            "--glob-archives".to_string(),
            format!("{}*", job.prefix),
        ];
        if job.dry_run {
            args.push("--dry-run".to_string());
        }
        args.extend(job.rule.to_args());
        args.push(job.repository.clone());

        let spec = self.command(&self.env(&job.passphrase), args);
        let (status, lines) = self.streaming(spec, cancel, collect_prune_lines).await;
        for line in lines {
            match line {
                PruneLine::Pruned(archive) => result.pruned.push(archive),
                PruneLine::Kept(archive) => result.kept.push(archive),
            }
        }
        tracing::info!(
            repository = %job.repository,
            pruned = result.pruned.len(),
            kept = result.kept.len(),
            dry_run = job.dry_run,
            "prune finished"
        );
        if job.dry_run || !status.is_completed_with_success() {
            return (status, result);
        }

        let compacted = self.compact(cancel, &job.repository, &job.passphrase).await;
        if compacted.is_completed_with_success() {
            (status, result)
        } else {
            (compacted, result)
        }
    }

    /// Free the space of deleted archives
    pub async fn compact(
        &self,
        cancel: &CancellationToken,
        repository: &str,
        passphrase: &str,
    ) -> Status {
        let spec = self.command(&self.env(passphrase), ["compact", repository]);
        self.buffered(spec, cancel).await.0
    }
}

async fn collect_prune_lines(mut records: mpsc::Receiver<LogRecord>) -> Vec<PruneLine> {
    let mut lines = Vec::new();
    while let Some(record) = records.recv().await {
        if let LogRecord::LogMessage(msg) = record {
            match parse_prune_line(&msg.text) {
                Some(line) => lines.push(line),
                None if msg.level.is_error() => {
                    tracing::warn!(message = %msg.text, "engine reported an error");
                }
                None => {}
            }
        }
    }
    lines
}

#[cfg(test)]
#[path = "prune_tests.rs"]
mod tests;
