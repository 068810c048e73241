// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured log protocol emitted by the engine on stderr

mod decode;
mod record;
pub mod time;

pub use decode::{decode_line, decode_stream};
pub use record::{
    ArchiveProgress, FileStatus, LogLevel, LogMessage, LogRecord, ProgressMessage,
    ProgressPercent, RecordKind,
};
