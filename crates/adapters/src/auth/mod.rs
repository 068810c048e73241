// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remote authentication status streams

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeAttempt, FakeAuthSource};

use arco_core::AuthStatusUpdate;
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors from the remote status service
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("failed to open status stream: {0}")]
    Open(String),
    #[error("status stream failed: {0}")]
    Stream(String),
}

/// Status updates in the order the service sent them; the channel closes
/// when the service ends the stream.
pub type StatusReceiver = mpsc::Receiver<Result<AuthStatusUpdate, SourceError>>;

/// Opens the server-side "wait for authentication" stream of a session
#[async_trait]
pub trait AuthStatusSource: Clone + Send + Sync + 'static {
    async fn open(&self, session_id: &str) -> Result<StatusReceiver, SourceError>;
}
