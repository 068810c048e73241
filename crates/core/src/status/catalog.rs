// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exit-code catalogue of the backup engine (modern exit codes)
//!
//! Messages are fixed and independent of the engine's own output so callers
//! can rely on them across engine versions and locales.

use super::error::ErrorCategory::{self, *};

/// One catalogued exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub code: i32,
    pub message: &'static str,
    pub category: ErrorCategory,
}

const fn entry(code: i32, message: &'static str, category: ErrorCategory) -> Entry {
    Entry {
        code,
        message,
        category,
    }
}

/// Message and category used for exit codes missing from the catalogue
pub const GENERIC_ERROR: Entry = entry(2, "error", General);

pub const ERRORS: &[Entry] = &[
    entry(2, "error", General),
    entry(3, "cancelled by user", General),
    entry(4, "command error", General),
    entry(5, "placeholder error", General),
    entry(6, "invalid placeholder", General),
    entry(10, "repository already exists", Repository),
    entry(11, "attic repository detected", Repository),
    entry(12, "repository check needed", Repository),
    entry(13, "repository does not exist", Repository),
    entry(14, "insufficient free space", Repository),
    entry(15, "invalid repository", Repository),
    entry(16, "invalid repository config", Repository),
    entry(17, "object not found in repository", Repository),
    entry(18, "parent path does not exist", Repository),
    entry(19, "path already exists", Repository),
    entry(20, "storage quota exceeded", Repository),
    entry(21, "permission denied to path", Permission),
    entry(25, "unsupported repository feature", Repository),
    entry(26, "repository has no manifest", Repository),
    entry(27, "unsupported manifest envelope", Repository),
    entry(30, "archive already exists", Archive),
    entry(31, "archive does not exist", Archive),
    entry(32, "failed to encode filename", Archive),
    entry(40, "invalid key data", Key),
    entry(41, "mismatch between repository and key file", Key),
    entry(42, "no key file found", Key),
    entry(43, "not a borg key backup", Key),
    entry(44, "no key entry found", Key),
    entry(45, "key backup for different repository", Key),
    entry(46, "key management not available", Key),
    entry(47, "unknown key type", Key),
    entry(48, "unsupported payload type", Key),
    entry(50, "cannot acquire a passphrase", Passphrase),
    entry(51, "passcommand failed", Passphrase),
    entry(52, "incorrect passphrase", Passphrase),
    entry(53, "exceeded password retries", Passphrase),
    entry(60, "cache initialization aborted", Cache),
    entry(61, "encryption method mismatch", Cache),
    entry(62, "repository access aborted", Cache),
    entry(63, "repository ID not unique", Cache),
    entry(64, "cache newer than repository", Cache),
    entry(70, "failed to acquire lock", Lock),
    entry(71, "failed to acquire lock with traceback", Lock),
    entry(72, "failed to create/acquire lock", Lock),
    entry(73, "lock timeout", Lock),
    entry(74, "failed to release lock (not locked)", Lock),
    entry(75, "failed to release lock (not by me)", Lock),
    entry(80, "connection closed by remote host", Connection),
    entry(81, "connection closed by remote host with hint", Connection),
    entry(82, "invalid RPC method", Connection),
    entry(83, "repository path not allowed", Permission),
    entry(84, "borg server too old", Connection),
    entry(85, "unexpected RPC data format from client", Connection),
    entry(86, "unexpected RPC data format from server", Connection),
    entry(87, "connection to remote host broken", Connection),
    entry(90, "data integrity error", Integrity),
    entry(91, "file integrity check failed", Integrity),
    entry(92, "decompression error", Integrity),
    entry(95, "archive TAM invalid", Integrity),
    entry(96, "archive unauthenticated", Integrity),
    entry(97, "TAM invalid", Integrity),
    entry(98, "manifest unauthenticated", Integrity),
    entry(99, "unsupported suite", Integrity),
];

pub const WARNINGS: &[Entry] = &[
    entry(1, "warning", General),
    entry(100, "file changed during backup", Backup),
    entry(101, "include pattern never matched", Backup),
    entry(102, "backup error", Backup),
    entry(103, "file type or inode changed during backup", Backup),
    entry(104, "backup OS error", Backup),
    entry(105, "backup permission error", Backup),
    entry(106, "backup IO error", Backup),
    entry(107, "backup file not found", Backup),
];

pub fn find_error(code: i32) -> Option<&'static Entry> {
    ERRORS.iter().find(|e| e.code == code)
}

pub fn find_warning(code: i32) -> Option<&'static Entry> {
    WARNINGS.iter().find(|e| e.code == code)
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
