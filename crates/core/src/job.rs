// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job descriptors handed to the engine layer, and what comes back

use crate::id::{OperationId, OperationKind};
use crate::response::PruneResult;
use crate::status::{Status, StatusSummary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A backup of a profile's paths into one repository
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupJob {
    pub id: OperationId,
    pub repository: String,
    #[serde(default, skip_serializing)]
    pub passphrase: String,
    /// Archive names are this prefix followed by a local timestamp
    pub prefix: String,
    pub backup_paths: Vec<PathBuf>,
    #[serde(default)]
    pub exclude_paths: Vec<PathBuf>,
}

/// Archive retention rules; each maps onto one engine `--keep-*` flag
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PruneRule {
    #[serde(default)]
    pub keep_hourly: u32,
    #[serde(default)]
    pub keep_daily: u32,
    #[serde(default)]
    pub keep_weekly: u32,
    #[serde(default)]
    pub keep_monthly: u32,
    #[serde(default)]
    pub keep_yearly: u32,
    #[serde(default)]
    pub keep_within_days: u32,
}

impl PruneRule {
    /// Engine flags for every non-zero rule
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.keep_within_days > 0 {
            args.push(format!("--keep-within={}d", self.keep_within_days));
        }
        for (flag, count) in [
            ("--keep-hourly", self.keep_hourly),
            ("--keep-daily", self.keep_daily),
            ("--keep-weekly", self.keep_weekly),
            ("--keep-monthly", self.keep_monthly),
            ("--keep-yearly", self.keep_yearly),
        ] {
            if count > 0 {
                args.push(format!("{flag}={count}"));
            }
        }
        args
    }

    pub fn is_empty(&self) -> bool {
        self.to_args().is_empty()
    }
}

/// Retention run over the archives of one profile
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PruneJob {
    pub id: OperationId,
    pub repository: String,
    #[serde(default, skip_serializing)]
    pub passphrase: String,
    pub prefix: String,
    pub rule: PruneRule,
    #[serde(default)]
    pub dry_run: bool,
}

/// What a delete job removes
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "name")]
pub enum DeleteTarget {
    /// A single archive by name
    Archive(String),
    /// Every archive whose name starts with the prefix
    Prefix(String),
    /// The whole repository
    Repository,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteJob {
    pub id: OperationId,
    pub repository: String,
    #[serde(default, skip_serializing)]
    pub passphrase: String,
    pub target: DeleteTarget,
}

/// Backup progress: processed files never decrease within one run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupProgress {
    pub total_files: u64,
    pub processed_files: u64,
}

impl BackupProgress {
    pub fn new(total_files: u64, processed_files: u64) -> Self {
        Self {
            total_files,
            processed_files,
        }
    }
}

/// Terminal report of a background job. Always delivered, even on cancel.
#[derive(Clone, Debug, PartialEq)]
pub struct JobOutcome {
    pub id: OperationId,
    pub kind: OperationKind,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Archive name a backup used, reported even when the backup failed
    pub archive_name: Option<String>,
    /// Archives a prune job removed and kept
    pub prune: Option<PruneResult>,
    pub status: Status,
}

impl JobOutcome {
    pub fn summary(&self) -> StatusSummary {
        StatusSummary::from(&self.status)
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
