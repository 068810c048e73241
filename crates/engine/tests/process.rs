// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine verbs against shell-script stand-ins for the engine binary
#![cfg(unix)]
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use arco_core::{BackupJob, EngineConfig, ErrorCategory, LogLevel, OperationId};
use arco_engine::{Borg, BorgVersion, CheckMode};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const STUB: &str = r#"#!/bin/sh
case "$1" in
  --version)
    echo "borg 1.4.3"
    ;;
  create)
    if [ "$2" = "--dry-run" ]; then
      for i in 1 2 3; do
        echo "{\"type\": \"file_status\", \"status\": \"A\", \"path\": \"$0\"}" >&2
      done
    else
      echo "Creating archive" >&2
      for i in 1 2 3; do
        echo "{\"type\": \"archive_progress\", \"nfiles\": $i, \"finished\": false}" >&2
      done
      echo '{"type": "archive_progress", "finished": true}' >&2
    fi
    ;;
  check)
    echo '{"type": "log_message", "levelname": "INFO", "name": "borg.repository", "message": "Starting repository check"}' >&2
    echo '{"type": "log_message", "levelname": "ERROR", "name": "borg.repository", "message": "Index object count mismatch."}' >&2
    exit 1
    ;;
  info)
    [ "$BORG_PASSPHRASE" = "secret" ] || exit 52
    echo "Using a pure-python msgpack! This will result in lower performance."
    cat <<'JSON'
{
  "cache": {"path": "/c", "stats": {"total_chunks": 1, "total_csize": 2, "total_size": 3, "total_unique_chunks": 4, "unique_csize": 5, "unique_size": 6}},
  "encryption": {"mode": "repokey-blake2"},
  "repository": {"id": "90ce", "last_modified": "2024-12-02T12:14:45.000000", "location": "/repo"},
  "security_dir": "/s"
}
JSON
    ;;
  *)
    exit 2
    ;;
esac
"#;

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn borg(binary: &Path, grace: Duration) -> Borg<arco_adapters::TracedRunner<arco_adapters::ProcessRunner>> {
    Borg::from_config(
        EngineConfig::default()
            .with_binary_path(binary)
            .with_termination_grace(grace),
    )
}

fn stub() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = write_script(dir.path(), "borg", STUB);
    (dir, path)
}

/// Script that records its pid and loops until interrupted
fn hanging_script(dir: &Path, ignore_interrupt: bool) -> PathBuf {
    let pid_file = dir.join("pid");
    let trap = if ignore_interrupt { "trap '' INT" } else { "trap 'exit 2' INT" };
    let body = format!(
        "#!/bin/sh\necho $$ > '{}'\n{trap}\nwhile :; do sleep 0.05; done\n",
        pid_file.display()
    );
    write_script(dir, "borg", &body)
}

async fn wait_for_pid(dir: &Path) -> i32 {
    let pid_file = dir.join("pid");
    for _ in 0..200 {
        if let Ok(text) = std::fs::read_to_string(&pid_file) {
            if let Ok(pid) = text.trim().parse() {
                return pid;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("stub never started");
}

fn is_alive(pid: i32) -> bool {
    nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid), None).is_ok()
}

#[tokio::test]
async fn version_of_stub() {
    let (_dir, binary) = stub();

    let (status, version) = borg(&binary, Duration::from_secs(5))
        .version(&CancellationToken::new())
        .await;

    assert!(status.is_completed_with_success());
    assert_eq!(version, Some(BorgVersion::new(1, 4, 3)));
}

#[tokio::test]
async fn create_streams_progress_from_real_process() {
    let (_dir, binary) = stub();
    let job = BackupJob {
        id: OperationId::new(1, 1),
        repository: "/srv/repo".to_string(),
        passphrase: "secret".to_string(),
        prefix: "stub-".to_string(),
        backup_paths: vec!["/nonexistent/arco".into()],
        exclude_paths: Vec::new(),
    };
    let (tx, mut rx) = mpsc::channel(16);

    let (status, name) = borg(&binary, Duration::from_secs(5))
        .create(&CancellationToken::new(), &job, tx)
        .await;

    assert!(status.is_completed_with_success(), "{status:?}");
    assert!(name.starts_with("stub-"));
    let mut ticks = Vec::new();
    while let Some(p) = rx.recv().await {
        ticks.push((p.total_files, p.processed_files));
    }
    assert_eq!(ticks, vec![(3, 1), (3, 2), (3, 3), (3, 3)]);
}

#[tokio::test]
async fn check_findings_from_real_process() {
    let (_dir, binary) = stub();

    let result = borg(&binary, Duration::from_secs(5))
        .check(&CancellationToken::new(), "/srv/repo", "secret", CheckMode::Quick)
        .await;

    assert!(result.status.is_completed_with_success());
    assert_eq!(result.error_logs.len(), 1);
    assert_eq!(result.error_logs[0].level, LogLevel::Error);
}

#[tokio::test]
async fn info_strips_banner_from_real_process() {
    let (_dir, binary) = stub();
    let borg = borg(&binary, Duration::from_secs(5));

    let (status, info) = borg
        .info(&CancellationToken::new(), "/srv/repo", "secret")
        .await;
    assert!(status.is_completed_with_success(), "{status:?}");
    assert_eq!(info.unwrap().encryption.mode, "repokey-blake2");

    let (status, info) = borg
        .info(&CancellationToken::new(), "/srv/repo", "wrong")
        .await;
    assert_eq!(status.error().unwrap().category(), ErrorCategory::Passphrase);
    assert!(info.is_none());
}

#[tokio::test]
async fn missing_binary_is_runtime_error() {
    let (status, _) = borg(Path::new("/nonexistent/arco/borg"), Duration::from_secs(5))
        .version(&CancellationToken::new())
        .await;

    assert_eq!(status.error().unwrap().category(), ErrorCategory::Runtime);
}

#[tokio::test]
async fn cancelled_check_leaves_no_process_behind() {
    let dir = tempfile::tempdir().unwrap();
    let binary = hanging_script(dir.path(), false);
    let borg = borg(&binary, Duration::from_secs(5));
    let cancel = CancellationToken::new();

    let run = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            borg.check(&cancel, "/srv/repo", "secret", CheckMode::Full)
                .await
        })
    };
    let pid = wait_for_pid(dir.path()).await;
    cancel.cancel();
    let result = run.await.unwrap();

    assert!(result.status.is_cancelled());
    assert!(!result.status.has_error());
    assert!(!is_alive(pid));
}

#[tokio::test]
async fn process_ignoring_interrupt_is_killed_after_grace() {
    let dir = tempfile::tempdir().unwrap();
    let binary = hanging_script(dir.path(), true);
    let borg = borg(&binary, Duration::from_millis(300));
    let cancel = CancellationToken::new();

    let run = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            borg.check(&cancel, "/srv/repo", "secret", CheckMode::Full)
                .await
        })
    };
    let pid = wait_for_pid(dir.path()).await;
    let started = Instant::now();
    cancel.cancel();
    let result = run.await.unwrap();

    assert!(result.status.is_cancelled());
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(!is_alive(pid));
}
