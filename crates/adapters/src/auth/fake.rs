// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted auth status source for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{AuthStatusSource, SourceError, StatusReceiver};
use arco_core::AuthStatusUpdate;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// What one `open` call does
#[derive(Debug, Clone)]
pub enum FakeAttempt {
    /// Opening fails
    Fail(String),
    /// Opening succeeds, the messages are delivered and the stream ends
    Stream(Vec<Result<AuthStatusUpdate, SourceError>>),
    /// Opening succeeds, the messages are delivered and the stream stays open
    Hang(Vec<Result<AuthStatusUpdate, SourceError>>),
}

/// Fake status source replaying scripted attempts.
///
/// Once the script runs out every further attempt fails to open.
#[derive(Clone, Default)]
pub struct FakeAuthSource {
    attempts: Arc<Mutex<VecDeque<FakeAttempt>>>,
    opened: Arc<Mutex<Vec<String>>>,
    // Keeps hanging streams open
    held: Arc<Mutex<Vec<mpsc::Sender<Result<AuthStatusUpdate, SourceError>>>>>,
}

impl FakeAuthSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, attempt: FakeAttempt) -> &Self {
        self.attempts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(attempt);
        self
    }

    /// Session ids of every `open` call, including failed ones
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn open_count(&self) -> usize {
        self.opened.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl AuthStatusSource for FakeAuthSource {
    async fn open(&self, session_id: &str) -> Result<StatusReceiver, SourceError> {
        self.opened
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(session_id.to_string());

        let attempt = self
            .attempts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| FakeAttempt::Fail("unavailable".to_string()));

        let (messages, hold) = match attempt {
            FakeAttempt::Fail(reason) => return Err(SourceError::Open(reason)),
            FakeAttempt::Stream(messages) => (messages, false),
            FakeAttempt::Hang(messages) => (messages, true),
        };

        let (tx, rx) = mpsc::channel(messages.len().max(1));
        for message in messages {
            let _ = tx.try_send(message);
        }
        if hold {
            self.held
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(tx);
        }
        Ok(rx)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
