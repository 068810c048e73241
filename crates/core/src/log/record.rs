// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed records of the engine's `--log-json` line protocol

use super::time::unix_time;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminator read from the `type` field before decoding a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    ArchiveProgress,
    ProgressMessage,
    ProgressPercent,
    FileStatus,
    LogMessage,
    #[serde(other)]
    Unknown,
}

/// Running totals of an archive being created
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArchiveProgress {
    #[serde(default)]
    pub original_size: u64,
    #[serde(default)]
    pub compressed_size: u64,
    #[serde(default, rename = "deduplicated_size")]
    pub deduped_size: u64,
    #[serde(default, rename = "nfiles")]
    pub file_count: u64,
    #[serde(default, rename = "path")]
    pub current_path: String,
    #[serde(default, with = "unix_time")]
    pub time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressMessage {
    #[serde(rename = "operation")]
    pub operation_id: u64,
    #[serde(default)]
    pub msgid: Option<String>,
    #[serde(default)]
    pub finished: bool,
    #[serde(default, rename = "message")]
    pub text: String,
    #[serde(default, with = "unix_time")]
    pub time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressPercent {
    #[serde(rename = "operation")]
    pub operation_id: u64,
    #[serde(default)]
    pub msgid: Option<String>,
    #[serde(default)]
    pub finished: bool,
    #[serde(default, rename = "message")]
    pub text: String,
    #[serde(default)]
    pub current: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub info: Vec<String>,
    #[serde(default, with = "unix_time")]
    pub time: Option<DateTime<Utc>>,
}

/// One entry of `--list` output: a status letter and the path it applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStatus {
    pub status: String,
    pub path: String,
}

/// Severity of a [`LogMessage`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
    #[serde(other)]
    Other,
}

impl LogLevel {
    pub fn is_error(self) -> bool {
        matches!(self, LogLevel::Error | LogLevel::Critical)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
            LogLevel::Other => "OTHER",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogMessage {
    #[serde(default, with = "unix_time")]
    pub time: Option<DateTime<Utc>>,
    #[serde(rename = "levelname")]
    pub level: LogLevel,
    #[serde(default, rename = "name")]
    pub logger_name: String,
    #[serde(rename = "message")]
    pub text: String,
    #[serde(default)]
    pub msgid: Option<String>,
}

/// One decoded structured line
#[derive(Debug, Clone, PartialEq)]
pub enum LogRecord {
    ArchiveProgress(ArchiveProgress),
    ProgressMessage(ProgressMessage),
    ProgressPercent(ProgressPercent),
    FileStatus(FileStatus),
    LogMessage(LogMessage),
}

impl LogRecord {
    pub fn kind(&self) -> RecordKind {
        match self {
            LogRecord::ArchiveProgress(_) => RecordKind::ArchiveProgress,
            LogRecord::ProgressMessage(_) => RecordKind::ProgressMessage,
            LogRecord::ProgressPercent(_) => RecordKind::ProgressPercent,
            LogRecord::FileStatus(_) => RecordKind::FileStatus,
            LogRecord::LogMessage(_) => RecordKind::LogMessage,
        }
    }
}
