// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Out-of-band authentication sessions
//!
//! A session starts `Pending` when a login or registration is requested and
//! moves to exactly one terminal status. Sessions past their expiry read as
//! `Expired` even before anything updates them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Pending,
    Authenticated,
    Expired,
    Cancelled,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, SessionStatus::Pending)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionStatus::Pending => "pending",
            SessionStatus::Authenticated => "authenticated",
            SessionStatus::Expired => "expired",
            SessionStatus::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Access and refresh tokens issued once a session authenticates
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// One message of the remote status stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthStatusUpdate {
    pub status: SessionStatus,
    #[serde(default)]
    pub tokens: Option<TokenPair>,
}

impl AuthStatusUpdate {
    pub fn pending() -> Self {
        Self {
            status: SessionStatus::Pending,
            tokens: None,
        }
    }

    pub fn authenticated(tokens: TokenPair) -> Self {
        Self {
            status: SessionStatus::Authenticated,
            tokens: Some(tokens),
        }
    }

    pub fn terminal(status: SessionStatus) -> Self {
        Self {
            status,
            tokens: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub id: String,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// When the session left `Pending`
    pub finished_at: Option<DateTime<Utc>>,
    pub tokens: Option<TokenPair>,
}

impl AuthSession {
    pub fn new(id: impl Into<String>, created_at: DateTime<Utc>, lifetime: Duration) -> Self {
        let lifetime = chrono::Duration::from_std(lifetime).unwrap_or(chrono::Duration::MAX);
        Self {
            id: id.into(),
            status: SessionStatus::Pending,
            created_at,
            expires_at: created_at.checked_add_signed(lifetime).unwrap_or(DateTime::<Utc>::MAX_UTC),
            finished_at: None,
            tokens: None,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Status as observed at `now`, accounting for expiry
    pub fn status_at(&self, now: DateTime<Utc>) -> SessionStatus {
        if self.status == SessionStatus::Pending && self.is_expired(now) {
            SessionStatus::Expired
        } else {
            self.status
        }
    }

    /// Time left before expiry, zero once expired
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        (self.expires_at - now).to_std().unwrap_or(Duration::ZERO)
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
