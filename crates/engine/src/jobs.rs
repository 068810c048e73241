// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Arbitrated background jobs.
//!
//! A job reserves its repository before anything is spawned, runs on its own
//! task, releases the reservation and then always reports a [`JobOutcome`].

use crate::arbiter::{Arbiter, Reservation};
use crate::borg::Borg;
use crate::error::EngineError;
use arco_adapters::CommandRunner;
use arco_core::{
    BackupJob, BackupProgress, Clock, DeleteJob, DeleteTarget, JobOutcome, OperationId,
    OperationKind, PruneJob, Status,
};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

type Tokens = Arc<Mutex<HashMap<(OperationKind, OperationId), CancellationToken>>>;

/// Partial result of one job body
struct JobReport {
    status: Status,
    archive_name: Option<String>,
    prune: Option<arco_core::PruneResult>,
}

impl From<Status> for JobReport {
    fn from(status: Status) -> Self {
        Self {
            status,
            archive_name: None,
            prune: None,
        }
    }
}

/// Handle to a started job
#[derive(Debug)]
pub struct JobHandle {
    id: OperationId,
    kind: OperationKind,
    cancel: CancellationToken,
    task: JoinHandle<JobOutcome>,
}

impl JobHandle {
    pub fn id(&self) -> OperationId {
        self.id
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Ask the job to stop. Its outcome is still delivered.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the job's outcome
    pub async fn wait(self) -> Option<JobOutcome> {
        match self.task.await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                tracing::error!(id = %self.id, kind = %self.kind, error = %e, "job task failed");
                None
            }
        }
    }
}

/// Runs backup, prune and delete jobs against the engine
#[derive(Clone)]
pub struct JobService<R, C> {
    borg: Borg<R, C>,
    arbiter: Arbiter,
    tokens: Tokens,
    outcomes: mpsc::Sender<JobOutcome>,
}

impl<R: CommandRunner, C: Clock> JobService<R, C> {
    /// Create a service reporting finished jobs on `outcomes`.
    ///
    /// Outcomes are sent with backpressure; a slow consumer delays the
    /// sending task, never the loss of an outcome.
    pub fn new(borg: Borg<R, C>, arbiter: Arbiter, outcomes: mpsc::Sender<JobOutcome>) -> Self {
        Self {
            borg,
            arbiter,
            tokens: Arc::default(),
            outcomes,
        }
    }

    pub fn arbiter(&self) -> &Arbiter {
        &self.arbiter
    }

    /// Start a backup. Progress ticks go to `progress` when given.
    pub fn start_backup(
        &self,
        job: BackupJob,
        progress: Option<mpsc::Sender<BackupProgress>>,
    ) -> Result<JobHandle, EngineError> {
        if job.backup_paths.is_empty() {
            return Err(invalid(job.id, "no paths to back up"));
        }
        let reservation = self.arbiter.reserve(OperationKind::Backup, job.id)?;
        let borg = self.borg.clone();
        Ok(self.spawn(reservation, move |cancel| async move {
            let progress = progress.unwrap_or_else(|| mpsc::channel(1).0);
            let (status, name) = borg.create(&cancel, &job, progress).await;
            JobReport {
                status,
                archive_name: Some(name),
                prune: None,
            }
        }))
    }

    pub fn start_prune(&self, job: PruneJob) -> Result<JobHandle, EngineError> {
        if job.rule.is_empty() {
            return Err(invalid(job.id, "no retention rule"));
        }
        let reservation = self.arbiter.reserve(OperationKind::Prune, job.id)?;
        let borg = self.borg.clone();
        Ok(self.spawn(reservation, move |cancel| async move {
            let (status, result) = borg.prune(&cancel, &job).await;
            JobReport {
                status,
                archive_name: None,
                prune: Some(result),
            }
        }))
    }

    pub fn start_delete(&self, job: DeleteJob) -> Result<JobHandle, EngineError> {
        if matches!(&job.target, DeleteTarget::Prefix(p) if p.is_empty()) {
            return Err(invalid(job.id, "empty archive prefix"));
        }
        let reservation = self.arbiter.reserve(OperationKind::Delete, job.id)?;
        let borg = self.borg.clone();
        Ok(self.spawn(reservation, move |cancel| async move {
            let (repo, pass) = (job.repository.as_str(), job.passphrase.as_str());
            let status = match &job.target {
                DeleteTarget::Archive(name) => borg.delete_archive(&cancel, repo, pass, name).await,
                DeleteTarget::Prefix(prefix) => {
                    borg.delete_archives(&cancel, repo, pass, prefix).await
                }
                DeleteTarget::Repository => borg.delete_repository(&cancel, repo, pass).await,
            };
            JobReport::from(status)
        }))
    }

    /// Cancel a running job. Returns false if no such job is running.
    pub fn cancel(&self, kind: OperationKind, id: OperationId) -> bool {
        let token = self
            .tokens
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&(kind, id))
            .cloned();
        match token {
            Some(token) => {
                tracing::info!(%kind, %id, "cancelling job");
                token.cancel();
                true
            }
            None => false,
        }
    }

    fn spawn<F, Fut>(&self, reservation: Reservation, body: F) -> JobHandle
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = JobReport> + Send + 'static,
    {
        let (kind, id) = (reservation.kind(), reservation.id());
        let cancel = CancellationToken::new();
        self.tokens
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert((kind, id), cancel.clone());

        let clock = self.borg.clock().clone();
        let tokens = Arc::clone(&self.tokens);
        let outcomes = self.outcomes.clone();
        let token = cancel.clone();
        let task = tokio::spawn(async move {
            let started_at = clock.now();
            tracing::info!(%kind, %id, "job started");
            let report = body(token).await;
            tokens
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .remove(&(kind, id));
            reservation.release();

            let outcome = JobOutcome {
                id,
                kind,
                started_at,
                finished_at: clock.now(),
                archive_name: report.archive_name,
                prune: report.prune,
                status: report.status,
            };
            log_outcome(&outcome);
            if outcomes.send(outcome.clone()).await.is_err() {
                tracing::warn!(%kind, %id, "outcome receiver dropped");
            }
            outcome
        });

        JobHandle {
            id,
            kind,
            cancel,
            task,
        }
    }
}

fn invalid(id: OperationId, message: &str) -> EngineError {
    EngineError::InvalidJob {
        id,
        message: message.to_string(),
    }
}

fn log_outcome(outcome: &JobOutcome) {
    let (kind, id) = (outcome.kind, outcome.id);
    let status = &outcome.status;
    if status.is_cancelled() {
        tracing::info!(%kind, %id, "job cancelled");
    } else if let Some(error) = status.error() {
        tracing::error!(%kind, %id, category = %error.category(), error = %error, "job failed");
    } else if let Some(warning) = status.warning() {
        tracing::warn!(%kind, %id, warning = %warning, "job finished with warning");
    } else {
        tracing::info!(%kind, %id, "job finished");
    }
}

#[cfg(test)]
#[path = "jobs_tests.rs"]
mod tests;
