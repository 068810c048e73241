// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authentication sessions and the monitor that waits on them

use crate::poller::{poll_session, PollOutcome, PollerConfig};
use arco_adapters::AuthStatusSource;
use arco_core::{AuthConfig, AuthSession, AuthStatusUpdate, Clock, SessionStatus, TokenPair};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const FAR_FUTURE: Duration = Duration::from_secs(365 * 24 * 60 * 60);

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to store tokens: {0}")]
pub struct TokenStoreError(pub String);

/// Persists the tokens of an authenticated session
#[async_trait]
pub trait TokenSink: Clone + Send + Sync + 'static {
    async fn store(&self, session_id: &str, tokens: &TokenPair) -> Result<(), TokenStoreError>;
}

/// Terminal notification for one session, sent at most once
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    Authenticated { session_id: String },
    NotAuthenticated { session_id: String, status: SessionStatus },
}

/// In-memory sessions keyed by id.
///
/// A session leaves `Pending` exactly once. Finished and expired sessions
/// are swept `gc_delay` after they ended.
#[derive(Clone)]
pub struct SessionRegistry<C> {
    sessions: Arc<Mutex<HashMap<String, AuthSession>>>,
    clock: C,
    lifetime: Duration,
    gc_delay: Duration,
}

impl<C: Clock> SessionRegistry<C> {
    pub fn new(clock: C, config: &AuthConfig) -> Self {
        Self {
            sessions: Arc::default(),
            clock,
            lifetime: config.session_lifetime,
            gc_delay: config.gc_delay,
        }
    }

    /// Register a pending session, replacing any session with the same id
    pub fn create(&self, id: impl Into<String>) -> AuthSession {
        self.sweep();
        let session = AuthSession::new(id, self.clock.now(), self.lifetime);
        self.lock().insert(session.id.clone(), session.clone());
        session
    }

    /// The session as observed now, with expiry applied
    pub fn get(&self, id: &str) -> Option<AuthSession> {
        let now = self.clock.now();
        self.lock().get(id).map(|session| {
            let mut session = session.clone();
            session.status = session.status_at(now);
            session
        })
    }

    /// Move a pending session to a terminal status.
    ///
    /// Returns the status recorded, or `None` when the session is unknown or
    /// already finished. A session past its expiry is recorded as `Expired`
    /// whatever was requested.
    pub fn complete(
        &self,
        id: &str,
        status: SessionStatus,
        tokens: Option<TokenPair>,
    ) -> Option<SessionStatus> {
        if !status.is_terminal() {
            return None;
        }
        let now = self.clock.now();
        let mut sessions = self.lock();
        let session = sessions.get_mut(id)?;
        if session.status != SessionStatus::Pending {
            return None;
        }
        let status = match session.status_at(now) {
            SessionStatus::Expired => SessionStatus::Expired,
            _ => status,
        };
        session.status = status;
        session.finished_at = Some(now);
        session.tokens = tokens.filter(|_| status == SessionStatus::Authenticated);
        Some(status)
    }

    /// Withdraw an authentication whose tokens could not be kept
    fn revoke(&self, id: &str) {
        if let Some(session) = self.lock().get_mut(id) {
            session.status = SessionStatus::Cancelled;
            session.tokens = None;
        }
    }

    /// Drop sessions that ended more than `gc_delay` ago
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let gc_delay = chrono::Duration::from_std(self.gc_delay).unwrap_or(chrono::Duration::MAX);
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, session| {
            let ended = session.finished_at.unwrap_or(session.expires_at);
            if session.status_at(now) == SessionStatus::Pending {
                return true;
            }
            ended
                .checked_add_signed(gc_delay)
                .map_or(true, |forget_at| now < forget_at)
        });
        let removed = before - sessions.len();
        if removed > 0 {
            tracing::debug!(removed, "swept finished auth sessions");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, AuthSession>> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Waits for sessions to authenticate and stores their tokens
#[derive(Clone)]
pub struct AuthMonitor<S, K, C> {
    source: S,
    sink: K,
    registry: SessionRegistry<C>,
    config: AuthConfig,
    events: mpsc::Sender<AuthEvent>,
}

impl<S, K, C> AuthMonitor<S, K, C>
where
    S: AuthStatusSource,
    K: TokenSink,
    C: Clock,
{
    pub fn new(
        source: S,
        sink: K,
        registry: SessionRegistry<C>,
        config: AuthConfig,
        events: mpsc::Sender<AuthEvent>,
    ) -> Self {
        Self {
            source,
            sink,
            registry,
            config,
            events,
        }
    }

    pub fn registry(&self) -> &SessionRegistry<C> {
        &self.registry
    }

    /// Watch a session on its own task
    pub fn spawn(
        &self,
        session_id: String,
        cancel: CancellationToken,
    ) -> tokio::task::JoinHandle<SessionStatus> {
        let monitor = self.clone();
        tokio::spawn(async move { monitor.watch(&session_id, &cancel).await })
    }

    /// Poll until the session finishes, expires or `cancel` fires.
    ///
    /// Returns the session's final status. Tokens are stored and the event
    /// is sent only by the call that moves the session out of `Pending`.
    pub async fn watch(&self, session_id: &str, cancel: &CancellationToken) -> SessionStatus {
        let Some(session) = self.registry.get(session_id) else {
            tracing::warn!(session_id, "watching unknown auth session");
            return SessionStatus::Expired;
        };
        if session.status != SessionStatus::Pending {
            // Records expiry of a session nobody watched in time
            return self.finish(session_id, session.status, None).await;
        }

        let now = tokio::time::Instant::now();
        let remaining = session.remaining(self.registry.clock.now());
        let config = PollerConfig {
            retry_interval: self.config.retry_interval,
            max_retries: self.config.max_retries,
            deadline: now.checked_add(remaining).unwrap_or(now + FAR_FUTURE),
        };
        let outcome = poll_session(
            config,
            cancel,
            || self.source.open(session_id),
            |update: AuthStatusUpdate| update.status.is_terminal().then_some(update),
        )
        .await;

        let (status, tokens) = match outcome {
            PollOutcome::Terminal(update) => match (update.status, update.tokens) {
                (SessionStatus::Authenticated, Some(tokens)) => {
                    (SessionStatus::Authenticated, Some(tokens))
                }
                (SessionStatus::Authenticated, None) => {
                    tracing::error!(session_id, "session authenticated without tokens");
                    (SessionStatus::Cancelled, None)
                }
                (status, _) => (status, None),
            },
            PollOutcome::Exhausted | PollOutcome::DeadlineReached => (SessionStatus::Expired, None),
            PollOutcome::Cancelled => (SessionStatus::Cancelled, None),
        };
        self.finish(session_id, status, tokens).await
    }

    async fn finish(
        &self,
        session_id: &str,
        status: SessionStatus,
        tokens: Option<TokenPair>,
    ) -> SessionStatus {
        let Some(mut status) = self.registry.complete(session_id, status, tokens.clone()) else {
            let current = self
                .registry
                .get(session_id)
                .map_or(SessionStatus::Expired, |s| s.status);
            tracing::debug!(session_id, %current, "session already finished");
            return current;
        };
        if let Some(tokens) = tokens.filter(|_| status == SessionStatus::Authenticated) {
            if let Err(e) = self.sink.store(session_id, &tokens).await {
                tracing::error!(session_id, error = %e, "failed to store tokens");
                self.registry.revoke(session_id);
                status = SessionStatus::Cancelled;
            }
        }

        tracing::info!(session_id, %status, "auth session finished");
        let event = match status {
            SessionStatus::Authenticated => AuthEvent::Authenticated {
                session_id: session_id.to_string(),
            },
            status => AuthEvent::NotAuthenticated {
                session_id: session_id.to_string(),
                status,
            },
        };
        if self.events.send(event).await.is_err() {
            tracing::warn!(session_id, "auth event receiver dropped");
        }
        status
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
