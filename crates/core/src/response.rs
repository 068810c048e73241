// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed results of engine verbs

use crate::log::time::{naive_time, seconds};
use crate::log::LogMessage;
use crate::status::Status;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// `info --json` payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InfoResponse {
    #[serde(default)]
    pub archives: Vec<ArchiveInfo>,
    pub cache: Cache,
    pub encryption: Encryption,
    pub repository: RepositoryInfo,
    #[serde(default)]
    pub security_dir: String,
}

/// `list --json` payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListResponse {
    #[serde(default)]
    pub archives: Vec<ArchiveListEntry>,
    pub encryption: Encryption,
    pub repository: RepositoryInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveListEntry {
    pub archive: String,
    #[serde(default)]
    pub barchive: String,
    pub id: String,
    pub name: String,
    #[serde(with = "naive_time")]
    pub start: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "naive_time::option")]
    pub end: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveInfo {
    #[serde(default)]
    pub chunker_params: Vec<serde_json::Value>,
    #[serde(default)]
    pub command_line: Vec<String>,
    #[serde(default)]
    pub comment: String,
    #[serde(with = "seconds")]
    pub duration: Duration,
    #[serde(with = "naive_time")]
    pub end: NaiveDateTime,
    #[serde(default)]
    pub hostname: String,
    pub id: String,
    #[serde(default)]
    pub limits: Limits,
    pub name: String,
    #[serde(with = "naive_time")]
    pub start: NaiveDateTime,
    #[serde(default)]
    pub stats: ArchiveStats,
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Limits {
    pub max_archive_size: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveStats {
    pub compressed_size: u64,
    pub deduplicated_size: u64,
    pub nfiles: u64,
    pub original_size: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cache {
    pub path: String,
    pub stats: CacheStats,
}

/// Chunk statistics of the local cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_chunks: u64,
    pub total_csize: u64,
    pub total_size: u64,
    pub total_unique_chunks: u64,
    pub unique_csize: u64,
    pub unique_size: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Encryption {
    pub mode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyfile: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryInfo {
    pub id: String,
    #[serde(default)]
    pub last_modified: String,
    pub location: String,
}

/// Archives a prune run removed (or would remove) and those it kept
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PruneResult {
    pub is_dry_run: bool,
    pub pruned: Vec<PruneArchive>,
    pub kept: Vec<KeepArchive>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PruneArchive {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeepArchive {
    pub name: String,
    /// Retention rule that kept the archive, e.g. `daily #1`
    pub reason: String,
}

/// Outcome of a repository check.
///
/// A check that finds problems can still complete successfully; findings
/// are reported through `error_logs` (error and critical lines only).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckResult {
    pub status: Status,
    pub error_logs: Vec<LogMessage>,
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
