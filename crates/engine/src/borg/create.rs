// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Archive creation: a dry-run file count followed by the real run

use super::Borg;
use arco_adapters::{CommandRunner, CommandSpec};
use arco_core::{ArchivePath, BackupJob, BackupProgress, Clock, LogRecord, Status};
use chrono::Local;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::{SendTimeoutError, TrySendError};
use tokio_util::sync::CancellationToken;

const ARCHIVE_TIME_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// How long the final tick waits for room in a full progress channel
const FINAL_TICK_WAIT: Duration = Duration::from_secs(5);

impl<R: CommandRunner, C: Clock> Borg<R, C> {
    /// Create an archive of the job's paths.
    ///
    /// Progress ticks are sent on `progress`, which is dropped when the call
    /// returns. The archive name is returned even when the run failed so the
    /// caller can clean up a partial archive.
    pub async fn create(
        &self,
        cancel: &CancellationToken,
        job: &BackupJob,
        progress: mpsc::Sender<BackupProgress>,
    ) -> (Status, String) {
        let name = self.archive_name(&job.prefix);
        let target = ArchivePath::archive(&job.repository, &name);
        let env = self.env(&job.passphrase);

        let dry_run = self.command(
            &env,
            create_args(&["--dry-run", "--list", "--log-json"], &target, job),
        );
        let (status, total) = self.count_files(dry_run, cancel).await;
        if !status.is_completed_with_success() {
            return (status, name);
        }
        tracing::debug!(archive = %name, total, "counted files");

        let real = self.command(&env, create_args(&["--progress", "--log-json"], &target, job));
        let (status, ()) = self
            .streaming(real, cancel, |records| {
                forward_progress(records, total, progress, cancel.clone())
            })
            .await;
        (status, name)
    }

    fn archive_name(&self, prefix: &str) -> String {
        let stamp = self.clock().now().with_timezone(&Local);
        format!("{prefix}{}", stamp.format(ARCHIVE_TIME_FORMAT))
    }

    /// Number of entries the dry run lists that exist and are not
    /// directories. Paths that cannot be inspected are skipped.
    async fn count_files(&self, spec: CommandSpec, cancel: &CancellationToken) -> (Status, u64) {
        let (status, output) = self.buffered(spec, cancel).await;
        let Some(output) = output.filter(|_| status.is_completed_with_success()) else {
            return (status, 0);
        };
        let mut total = 0;
        for record in output.stderr.lines().filter_map(arco_core::decode_line) {
            let LogRecord::FileStatus(entry) = record else {
                continue;
            };
            match tokio::fs::metadata(&entry.path).await {
                Ok(meta) if !meta.is_dir() => total += 1,
                Ok(_) => {}
                Err(e) => tracing::trace!(path = %entry.path, error = %e, "skipping listed path"),
            }
        }
        (status, total)
    }
}

fn create_args(flags: &[&str], target: &ArchivePath, job: &BackupJob) -> Vec<String> {
    let mut args = vec!["create".to_string()];
    args.extend(flags.iter().map(|f| f.to_string()));
    args.push(target.to_string());
    args.extend(job.backup_paths.iter().map(|p| p.to_string_lossy().into_owned()));
    for exclude in &job.exclude_paths {
        args.push("--exclude".to_string());
        args.push(exclude.to_string_lossy().into_owned());
    }
    args
}

/// Turn archive progress records into monotonic `(total, processed)` ticks.
///
/// Intermediate ticks are dropped while the receiver is full. The final tick
/// waits for room until `cancel` fires or [`FINAL_TICK_WAIT`] passes, so a
/// receiver that stops reading never holds up the run.
async fn forward_progress(
    mut records: mpsc::Receiver<LogRecord>,
    total: u64,
    progress: mpsc::Sender<BackupProgress>,
    cancel: CancellationToken,
) {
    let mut processed = 0;
    let mut receiver_alive = true;
    while let Some(record) = records.recv().await {
        let (tick, last) = match record {
            LogRecord::ArchiveProgress(p) if p.finished => {
                processed = processed.max(total);
                (BackupProgress::new(total, processed), true)
            }
            LogRecord::ArchiveProgress(p) if total > 0 && p.file_count > 0 => {
                processed = processed.max(p.file_count);
                (BackupProgress::new(total, processed), false)
            }
            LogRecord::LogMessage(msg) if msg.level.is_error() => {
                tracing::warn!(msgid = ?msg.msgid, message = %msg.text, "engine reported an error");
                continue;
            }
            _ => continue,
        };
        if !receiver_alive {
            continue;
        }
        if last {
            receiver_alive = send_final(&progress, tick, &cancel).await;
            continue;
        }
        match progress.try_send(tick) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => tracing::trace!(?tick, "progress receiver full"),
            Err(TrySendError::Closed(_)) => receiver_alive = false,
        }
    }
}

/// Returns whether the receiver may still take ticks
async fn send_final(
    progress: &mpsc::Sender<BackupProgress>,
    tick: BackupProgress,
    cancel: &CancellationToken,
) -> bool {
    tokio::select! {
        biased;
        sent = progress.send_timeout(tick, FINAL_TICK_WAIT) => match sent {
            Ok(()) => true,
            Err(SendTimeoutError::Timeout(_)) => {
                tracing::warn!(?tick, "progress receiver not reading, final tick dropped");
                false
            }
            Err(SendTimeoutError::Closed(_)) => false,
        },
        _ = cancel.cancelled() => {
            tracing::debug!(?tick, "cancelled while delivering final tick");
            false
        }
    }
}

#[cfg(test)]
#[path = "create_tests.rs"]
mod tests;
