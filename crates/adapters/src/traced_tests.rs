// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::runner::{FakeResponse, FakeRunner};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// A writer that captures log output for testing
#[derive(Clone, Default)]
struct CapturedLogs {
    logs: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    fn contents(&self) -> String {
        let logs = self.logs.lock().unwrap();
        String::from_utf8_lossy(&logs).to_string()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.logs.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run a test with captured tracing output
fn with_tracing<F, Fut>(f: F) -> (String, Fut::Output)
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future,
{
    let logs = CapturedLogs::default();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(logs.clone())
        .with_ansi(false)
        .without_time()
        .finish();

    let result = tracing::subscriber::with_default(subscriber, || {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(f())
    });

    (logs.contents(), result)
}

fn info_spec() -> CommandSpec {
    CommandSpec::new("borg")
        .args(["info", "--json", "/repo"])
        .env(vec![("BORG_PASSPHRASE".to_string(), "hunter2".to_string())])
}

#[test]
fn run_logs_entry_and_completion() {
    let (logs, result) = with_tracing(|| async {
        let traced = TracedRunner::new(FakeRunner::new());
        traced.run(&info_spec(), &CancellationToken::new()).await
    });

    assert!(result.is_ok(), "run should succeed: {:?}", result);
    assert!(logs.contains("borg.run"), "Should log span name. Logs:\n{}", logs);
    assert!(
        logs.contains("borg info --json /repo"),
        "Should log command line. Logs:\n{}",
        logs
    );
    assert!(logs.contains("starting"), "Should log entry. Logs:\n{}", logs);
    assert!(logs.contains("finished"), "Should log completion. Logs:\n{}", logs);
    assert!(logs.contains("elapsed_ms"), "Should log timing. Logs:\n{}", logs);
}

#[test]
fn environment_never_reaches_the_log() {
    let (logs, _) = with_tracing(|| async {
        let traced = TracedRunner::new(FakeRunner::new());
        traced.run(&info_spec(), &CancellationToken::new()).await
    });

    assert!(!logs.contains("hunter2"), "Leaked passphrase. Logs:\n{}", logs);
}

#[test]
fn failing_exit_is_logged_as_error() {
    let (logs, _) = with_tracing(|| async {
        let fake = FakeRunner::new();
        fake.respond("info", FakeResponse::exit(13));
        TracedRunner::new(fake)
            .run(&info_spec(), &CancellationToken::new())
            .await
    });

    assert!(logs.contains("ERROR"), "Should log at error. Logs:\n{}", logs);
    assert!(logs.contains("exit_code=13"), "Should log code. Logs:\n{}", logs);
}

#[test]
fn spawn_failure_is_logged() {
    let (logs, result) = with_tracing(|| async {
        let fake = FakeRunner::new();
        fake.respond("info", FakeResponse::spawn_failure("no such file"));
        TracedRunner::new(fake)
            .run(&info_spec(), &CancellationToken::new())
            .await
    });

    assert!(result.is_err());
    assert!(logs.contains("run failed"), "Should log failure. Logs:\n{}", logs);
}

#[test]
fn cancelled_stream_is_logged() {
    let (logs, result) = with_tracing(|| async {
        let fake = FakeRunner::new();
        fake.respond("create", FakeResponse::default().hang_until_cancelled());
        let cancel = CancellationToken::new();
        cancel.cancel();
        let (tx, _rx) = tokio::sync::mpsc::channel(1);
        TracedRunner::new(fake)
            .stream(&CommandSpec::new("borg").arg("create"), &cancel, tx)
            .await
    });

    assert!(result.unwrap().cancelled);
    assert!(logs.contains("borg.stream"), "Should log span. Logs:\n{}", logs);
    assert!(logs.contains("cancelled"), "Should log cancel. Logs:\n{}", logs);
}
