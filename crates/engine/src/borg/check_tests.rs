// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::super::test_helpers::{borg, log_line, PASSPHRASE, REPO};
use super::*;
use arco_adapters::{FakeResponse, RunMode};
use arco_core::{ErrorCategory, LogLevel};

#[tokio::test]
async fn findings_complete_successfully_with_error_logs() {
    let (borg, runner) = borg();
    runner.respond(
        "check",
        FakeResponse::exit(1)
            .line("Starting repository check")
            .line(log_line("WARNING", "segment 12 has trailing bytes"))
            .line(log_line("ERROR", "Index object count mismatch.")),
    );

    let result = borg
        .check(&CancellationToken::new(), REPO, PASSPHRASE, CheckMode::Quick)
        .await;

    assert!(result.status.is_completed_with_success());
    assert!(result.status.has_warning());
    assert_eq!(result.error_logs.len(), 1);
    assert_eq!(result.error_logs[0].level, LogLevel::Error);
    assert_eq!(result.error_logs[0].text, "Index object count mismatch.");
}

#[tokio::test]
async fn critical_lines_are_captured() {
    let (borg, runner) = borg();
    runner.respond(
        "check",
        FakeResponse::exit(1)
            .line(log_line("INFO", "Checking segments"))
            .line(log_line("CRITICAL", "Repository manifest not found")),
    );

    let result = borg
        .check(&CancellationToken::new(), REPO, PASSPHRASE, CheckMode::Full)
        .await;

    let levels: Vec<_> = result.error_logs.iter().map(|m| m.level).collect();
    assert_eq!(levels, vec![LogLevel::Critical]);
}

#[tokio::test]
async fn clean_check_has_no_logs() {
    let (borg, runner) = borg();
    runner.respond(
        "check",
        FakeResponse::exit(0).line(log_line("INFO", "Archive consistency check complete")),
    );

    let result = borg
        .check(&CancellationToken::new(), REPO, PASSPHRASE, CheckMode::Quick)
        .await;

    assert!(result.status.is_completed_with_success());
    assert!(!result.status.has_warning());
    assert!(result.error_logs.is_empty());
}

#[tokio::test]
async fn integrity_error_fails() {
    let (borg, runner) = borg();
    runner.respond(
        "check",
        FakeResponse::exit(90).line(log_line("ERROR", "Data integrity error")),
    );

    let result = borg
        .check(&CancellationToken::new(), REPO, PASSPHRASE, CheckMode::Full)
        .await;

    assert_eq!(
        result.status.error().unwrap().category(),
        ErrorCategory::Integrity
    );
    assert_eq!(result.error_logs.len(), 1);
}

#[tokio::test]
async fn mode_selects_flag() {
    let (borg, runner) = borg();
    let cancel = CancellationToken::new();

    borg.check(&cancel, REPO, PASSPHRASE, CheckMode::Quick).await;
    borg.check(&cancel, REPO, PASSPHRASE, CheckMode::Full).await;

    let calls = runner.calls();
    assert!(calls.iter().all(|c| c.mode == RunMode::Streaming));
    assert_eq!(calls[0].args, vec!["check", "--repository-only", "--log-json", REPO]);
    assert_eq!(calls[1].args, vec!["check", "--verify-data", "--log-json", REPO]);
}

#[tokio::test]
async fn cancelled_check_reports_cancelled() {
    let (borg, runner) = borg();
    runner.respond("check", FakeResponse::exit(0).hang_until_cancelled());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = borg.check(&cancel, REPO, PASSPHRASE, CheckMode::Full).await;

    assert!(result.status.is_cancelled());
    assert!(!result.status.has_error());
}
