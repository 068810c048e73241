// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use arco_adapters::{FakeAttempt, FakeAuthSource};
use arco_core::FakeClock;
use std::time::Instant;

#[derive(Clone, Default)]
struct MemorySink {
    stored: Arc<Mutex<Vec<(String, TokenPair)>>>,
    fail: bool,
}

impl MemorySink {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn stored(&self) -> Vec<(String, TokenPair)> {
        self.stored.lock().unwrap().clone()
    }
}

#[async_trait]
impl TokenSink for MemorySink {
    async fn store(&self, session_id: &str, tokens: &TokenPair) -> Result<(), TokenStoreError> {
        if self.fail {
            return Err(TokenStoreError("keyring locked".to_string()));
        }
        self.stored
            .lock()
            .unwrap()
            .push((session_id.to_string(), tokens.clone()));
        Ok(())
    }
}

fn auth_config(lifetime: Duration) -> AuthConfig {
    AuthConfig {
        retry_interval: Duration::from_millis(20),
        max_retries: 3,
        session_lifetime: lifetime,
        gc_delay: Duration::from_secs(300),
    }
}

fn tokens() -> TokenPair {
    TokenPair {
        access_token: "at".to_string(),
        refresh_token: "rt".to_string(),
    }
}

struct Harness {
    monitor: AuthMonitor<FakeAuthSource, MemorySink, FakeClock>,
    source: FakeAuthSource,
    sink: MemorySink,
    clock: FakeClock,
    events: mpsc::Receiver<AuthEvent>,
}

fn harness_with(sink: MemorySink, config: AuthConfig) -> Harness {
    let clock = FakeClock::new();
    let source = FakeAuthSource::new();
    let registry = SessionRegistry::new(clock.clone(), &config);
    let (tx, events) = mpsc::channel(8);
    Harness {
        monitor: AuthMonitor::new(source.clone(), sink.clone(), registry, config, tx),
        source,
        sink,
        clock,
        events,
    }
}

fn harness() -> Harness {
    harness_with(MemorySink::default(), auth_config(Duration::from_secs(600)))
}

// Registry

#[test]
fn new_session_is_pending_until_expiry() {
    let h = harness();
    let registry = h.monitor.registry();

    registry.create("s1");
    assert_eq!(registry.get("s1").unwrap().status, SessionStatus::Pending);

    h.clock.advance(Duration::from_secs(601));
    assert_eq!(registry.get("s1").unwrap().status, SessionStatus::Expired);
}

#[test]
fn session_completes_once() {
    let h = harness();
    let registry = h.monitor.registry();
    registry.create("s1");

    assert_eq!(
        registry.complete("s1", SessionStatus::Authenticated, Some(tokens())),
        Some(SessionStatus::Authenticated)
    );
    assert_eq!(registry.complete("s1", SessionStatus::Cancelled, None), None);

    let session = registry.get("s1").unwrap();
    assert_eq!(session.status, SessionStatus::Authenticated);
    assert_eq!(session.tokens, Some(tokens()));
    assert!(session.finished_at.is_some());
}

#[test]
fn completing_expired_session_records_expiry() {
    let h = harness();
    let registry = h.monitor.registry();
    registry.create("s1");
    h.clock.advance(Duration::from_secs(700));

    let recorded = registry.complete("s1", SessionStatus::Authenticated, Some(tokens()));

    assert_eq!(recorded, Some(SessionStatus::Expired));
    assert_eq!(registry.get("s1").unwrap().tokens, None);
}

#[test]
fn pending_and_unknown_sessions_cannot_complete() {
    let h = harness();
    let registry = h.monitor.registry();
    registry.create("s1");

    assert_eq!(registry.complete("s1", SessionStatus::Pending, None), None);
    assert_eq!(registry.complete("nope", SessionStatus::Expired, None), None);
}

#[test]
fn finished_sessions_are_swept_after_gc_delay() {
    let h = harness();
    let registry = h.monitor.registry();
    registry.create("done");
    registry.create("waiting");
    registry.complete("done", SessionStatus::Cancelled, None);

    h.clock.advance(Duration::from_secs(299));
    assert_eq!(registry.sweep(), 0);

    h.clock.advance(Duration::from_secs(2));
    assert_eq!(registry.sweep(), 1);
    assert!(registry.get("done").is_none());
    assert!(registry.get("waiting").is_some());
}

#[test]
fn expired_sessions_are_swept_after_gc_delay() {
    let h = harness();
    let registry = h.monitor.registry();
    registry.create("s1");

    h.clock.advance(Duration::from_secs(600 + 301));
    registry.create("s2");

    assert!(registry.get("s1").is_none());
    assert_eq!(registry.len(), 1);
}

// Monitor

#[tokio::test]
async fn authenticated_session_stores_tokens_and_notifies() {
    let mut h = harness();
    h.monitor.registry().create("s1");
    h.source.push(FakeAttempt::Hang(vec![
        Ok(AuthStatusUpdate::pending()),
        Ok(AuthStatusUpdate::authenticated(tokens())),
    ]));

    let status = h.monitor.watch("s1", &CancellationToken::new()).await;

    assert_eq!(status, SessionStatus::Authenticated);
    assert_eq!(h.sink.stored(), vec![("s1".to_string(), tokens())]);
    assert_eq!(
        h.events.try_recv().unwrap(),
        AuthEvent::Authenticated {
            session_id: "s1".to_string()
        }
    );
    assert!(h.events.try_recv().is_err());
}

#[tokio::test]
async fn remote_expiry_is_not_authenticated() {
    let mut h = harness();
    h.monitor.registry().create("s1");
    h.source.push(FakeAttempt::Stream(vec![Ok(AuthStatusUpdate::terminal(
        SessionStatus::Expired,
    ))]));

    let status = h.monitor.watch("s1", &CancellationToken::new()).await;

    assert_eq!(status, SessionStatus::Expired);
    assert!(h.sink.stored().is_empty());
    assert_eq!(
        h.events.try_recv().unwrap(),
        AuthEvent::NotAuthenticated {
            session_id: "s1".to_string(),
            status: SessionStatus::Expired,
        }
    );
}

#[tokio::test]
async fn always_failing_stream_stops_within_session_lifetime() {
    let config = AuthConfig {
        max_retries: u32::MAX,
        retry_interval: Duration::from_millis(100),
        ..auth_config(Duration::from_secs(2))
    };
    let mut h = harness_with(MemorySink::default(), config);
    h.monitor.registry().create("s1");
    let started = Instant::now();

    let status = h.monitor.watch("s1", &CancellationToken::new()).await;

    assert!(started.elapsed() < Duration::from_millis(2_500));
    assert_eq!(status, SessionStatus::Expired);
    assert!(h.source.open_count() > 1);
    assert!(matches!(
        h.events.try_recv().unwrap(),
        AuthEvent::NotAuthenticated {
            status: SessionStatus::Expired,
            ..
        }
    ));

    // Watching a finished session sends nothing more
    let again = h.monitor.watch("s1", &CancellationToken::new()).await;
    assert_eq!(again, SessionStatus::Expired);
    assert!(h.events.try_recv().is_err());
}

#[tokio::test]
async fn exhausted_retries_expire_session() {
    let mut h = harness();
    h.monitor.registry().create("s1");

    let status = h.monitor.watch("s1", &CancellationToken::new()).await;

    assert_eq!(status, SessionStatus::Expired);
    assert_eq!(h.source.open_count(), 4);
    assert!(h.events.try_recv().is_ok());
}

#[tokio::test]
async fn failed_token_store_cancels_session() {
    let mut h = harness_with(MemorySink::failing(), auth_config(Duration::from_secs(600)));
    h.monitor.registry().create("s1");
    h.source.push(FakeAttempt::Stream(vec![Ok(AuthStatusUpdate::authenticated(
        tokens(),
    ))]));

    let status = h.monitor.watch("s1", &CancellationToken::new()).await;

    assert_eq!(status, SessionStatus::Cancelled);
    let session = h.monitor.registry().get("s1").unwrap();
    assert_eq!(session.status, SessionStatus::Cancelled);
    assert_eq!(session.tokens, None);
    assert!(matches!(
        h.events.try_recv().unwrap(),
        AuthEvent::NotAuthenticated {
            status: SessionStatus::Cancelled,
            ..
        }
    ));
}

#[tokio::test]
async fn concurrent_watchers_store_tokens_once() {
    let mut h = harness();
    h.monitor.registry().create("s1");
    for _ in 0..2 {
        h.source.push(FakeAttempt::Stream(vec![Ok(AuthStatusUpdate::authenticated(
            tokens(),
        ))]));
    }
    let cancel = CancellationToken::new();

    let (a, b) = tokio::join!(h.monitor.watch("s1", &cancel), h.monitor.watch("s1", &cancel));

    assert_eq!(a, SessionStatus::Authenticated);
    assert_eq!(b, SessionStatus::Authenticated);
    assert_eq!(h.sink.stored().len(), 1);
    assert!(h.events.try_recv().is_ok());
    assert!(h.events.try_recv().is_err());
}

#[tokio::test]
async fn cancelled_watch_cancels_session() {
    let mut h = harness();
    h.monitor.registry().create("s1");
    h.source.push(FakeAttempt::Hang(vec![Ok(AuthStatusUpdate::pending())]));
    let cancel = CancellationToken::new();

    let handle = h.monitor.spawn("s1".to_string(), cancel.clone());
    tokio::time::sleep(Duration::from_millis(20)).await;
    cancel.cancel();

    assert_eq!(handle.await.unwrap(), SessionStatus::Cancelled);
    assert!(matches!(
        h.events.recv().await.unwrap(),
        AuthEvent::NotAuthenticated {
            status: SessionStatus::Cancelled,
            ..
        }
    ));
}

#[tokio::test]
async fn session_expired_before_watch_is_reported_once() {
    let mut h = harness();
    h.monitor.registry().create("s1");
    h.clock.advance(Duration::from_secs(601));

    let status = h.monitor.watch("s1", &CancellationToken::new()).await;

    assert_eq!(status, SessionStatus::Expired);
    assert_eq!(h.source.open_count(), 0);
    assert!(h.events.try_recv().is_ok());
    assert!(h.events.try_recv().is_err());
}

#[tokio::test]
async fn unknown_session_is_expired() {
    let h = harness();

    let status = h.monitor.watch("missing", &CancellationToken::new()).await;

    assert_eq!(status, SessionStatus::Expired);
    assert_eq!(h.source.open_count(), 0);
}
