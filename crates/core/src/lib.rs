// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! arco-core: types shared by the backup orchestration crates
//!
//! This crate provides:
//! - The exit-code taxonomy and the `Status` result envelope
//! - The subprocess environment builder
//! - Records and decoder for the engine's structured log protocol
//! - Job descriptors, typed verb responses and auth session data
//! - Configuration and a testable clock

pub mod archive;
pub mod clock;
pub mod config;
pub mod env;
pub mod id;
pub mod job;
pub mod log;
pub mod output;
pub mod response;
pub mod session;
pub mod status;

pub use archive::ArchivePath;
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{AuthConfig, ConfigError, EngineConfig};
pub use env::BorgEnv;
pub use id::{OperationId, OperationKind};
pub use job::{
    BackupJob, BackupProgress, DeleteJob, DeleteTarget, JobOutcome, PruneJob, PruneRule,
};
pub use log::{decode_line, decode_stream, LogLevel, LogMessage, LogRecord};
pub use output::{sanitize_output, Sanitized};
pub use response::{
    ArchiveInfo, ArchiveListEntry, CheckResult, InfoResponse, KeepArchive, ListResponse,
    PruneArchive, PruneResult,
};
pub use session::{AuthSession, AuthStatusUpdate, SessionStatus, TokenPair};
pub use status::{classify, BorgError, BorgWarning, ErrorCategory, ExitClass, Status};
