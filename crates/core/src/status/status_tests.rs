// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;
use std::error::Error as _;
use yare::parameterized;

#[test]
fn zero_is_success() {
    assert_eq!(classify(0), ExitClass::Success);
    let status = Status::from_exit_code(0);
    assert!(status.is_completed_with_success());
    assert!(!status.has_error());
    assert!(!status.has_warning());
}

#[parameterized(
    general_error = { 2, "error", ErrorCategory::General },
    repo_exists = { 10, "repository already exists", ErrorCategory::Repository },
    repo_missing = { 13, "repository does not exist", ErrorCategory::Repository },
    path_permission = { 21, "permission denied to path", ErrorCategory::Permission },
    archive_exists = { 30, "archive already exists", ErrorCategory::Archive },
    key_missing = { 42, "no key file found", ErrorCategory::Key },
    wrong_passphrase = { 52, "incorrect passphrase", ErrorCategory::Passphrase },
    cache_mismatch = { 61, "encryption method mismatch", ErrorCategory::Cache },
    lock_timeout = { 73, "lock timeout", ErrorCategory::Lock },
    connection_closed = { 80, "connection closed by remote host", ErrorCategory::Connection },
    remote_path_denied = { 83, "repository path not allowed", ErrorCategory::Permission },
    integrity = { 90, "data integrity error", ErrorCategory::Integrity },
)]
fn catalogued_errors(code: i32, message: &str, category: ErrorCategory) {
    let ExitClass::Error(err) = classify(code) else {
        panic!("expected error for {code}");
    };
    assert_eq!(err.exit_code(), Some(code));
    assert_eq!(err.message(), message);
    assert_eq!(err.category(), category);
    assert_eq!(err.to_string(), message);
}

#[parameterized(
    generic_warning = { 1, "warning", ErrorCategory::General },
    file_changed = { 100, "file changed during backup", ErrorCategory::Backup },
    backup_error = { 102, "backup error", ErrorCategory::Backup },
    file_not_found = { 107, "backup file not found", ErrorCategory::Backup },
)]
fn catalogued_warnings(code: i32, message: &str, category: ErrorCategory) {
    let ExitClass::Warning(w) = classify(code) else {
        panic!("expected warning for {code}");
    };
    assert_eq!(w.exit_code(), code);
    assert_eq!(w.message(), message);
    assert_eq!(w.category(), category);
}

#[parameterized(
    unassigned_general = { 7 },
    gap_in_repository_range = { 22 },
    above_backup_range = { 108 },
    far_out = { 255 },
    negative = { -1 },
)]
fn unknown_codes_fall_back_to_generic_error(code: i32) {
    let ExitClass::Error(err) = classify(code) else {
        panic!("expected error for {code}");
    };
    assert_eq!(err.exit_code(), Some(code));
    assert_eq!(err.category(), ErrorCategory::General);
    assert_eq!(err.message(), "error");
}

#[test]
fn warning_still_counts_as_success() {
    let status = Status::from_exit_code(1);
    assert!(status.has_warning());
    assert!(!status.has_error());
    assert!(status.is_completed_with_success());
}

#[test]
fn cancellation_is_neither_success_nor_error() {
    let status = Status::cancelled();
    assert!(status.is_cancelled());
    assert!(!status.has_error());
    assert!(!status.is_completed_with_success());
}

#[test]
fn runtime_error_exposes_cause() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such binary");
    let err = BorgError::runtime("failed to start engine").with_cause(io);
    assert_eq!(err.category(), ErrorCategory::Runtime);
    assert_eq!(err.exit_code(), None);
    let source = err.source().map(|s| s.to_string());
    assert_eq!(source.as_deref(), Some("no such binary"));

    let status = Status::failed(err);
    assert!(status.has_error());
    assert!(!status.is_completed_with_success());
}

#[test]
fn summary_reflects_status() {
    let summary = StatusSummary::from(&Status::from_exit_code(52));
    assert!(!summary.success);
    let error = summary.error.unwrap();
    assert_eq!(error.exit_code, Some(52));
    assert_eq!(error.category, ErrorCategory::Passphrase);

    let json = serde_json::to_value(StatusSummary::from(&Status::from_exit_code(100))).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["warning"]["category"], "backup");
    assert_eq!(json["warning"]["exitCode"], 100);
}

proptest! {
    #[test]
    fn classify_is_exclusive_and_deterministic(code in any::<i32>()) {
        let first = classify(code);
        let second = classify(code);
        prop_assert_eq!(&first, &second);
        match first {
            ExitClass::Success => prop_assert_eq!(code, 0),
            ExitClass::Warning(w) => prop_assert_eq!(w.exit_code(), code),
            ExitClass::Error(e) => prop_assert_eq!(e.exit_code(), Some(code)),
        }
        let status = Status::from_exit_code(code);
        prop_assert!(!(status.has_error() && status.has_warning()));
        prop_assert_eq!(status.is_completed_with_success(), !status.has_error());
    }
}
