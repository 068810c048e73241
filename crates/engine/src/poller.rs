// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded polling of a retryable status stream.
//!
//! Every wait races the retry timer against the deadline and cancellation,
//! so a poller never outlives the session it watches.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    /// Wait before reopening a failed or ended stream
    pub retry_interval: Duration,
    /// Consecutive failed attempts tolerated before giving up
    pub max_retries: u32,
    /// Polling stops when this instant passes
    pub deadline: Instant,
}

/// Why polling stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// A message reached a terminal state
    Terminal(T),
    /// Too many consecutive attempts failed
    Exhausted,
    DeadlineReached,
    Cancelled,
}

/// Poll `open` until `classify` maps a message to a terminal value.
///
/// An attempt fails when the stream cannot be opened, or ends without a
/// terminal message and without any message at all. Receiving a message
/// resets the failure count.
pub async fn poll_session<M, T, E, Open, OpenFut, Classify>(
    config: PollerConfig,
    cancel: &CancellationToken,
    mut open: Open,
    mut classify: Classify,
) -> PollOutcome<T>
where
    E: Display,
    Open: FnMut() -> OpenFut,
    OpenFut: Future<Output = Result<mpsc::Receiver<Result<M, E>>, E>>,
    Classify: FnMut(M) -> Option<T>,
{
    let mut failures: u32 = 0;
    loop {
        if cancel.is_cancelled() {
            return PollOutcome::Cancelled;
        }
        if Instant::now() >= config.deadline {
            return PollOutcome::DeadlineReached;
        }

        let opened = tokio::select! {
            biased;
            _ = cancel.cancelled() => return PollOutcome::Cancelled,
            _ = tokio::time::sleep_until(config.deadline) => return PollOutcome::DeadlineReached,
            opened = open() => opened,
        };

        match opened {
            Err(e) => {
                failures += 1;
                tracing::warn!(error = %e, attempt = failures, "failed to open status stream");
            }
            Ok(mut stream) => {
                let mut received = false;
                loop {
                    let message = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return PollOutcome::Cancelled,
                        _ = tokio::time::sleep_until(config.deadline) => {
                            return PollOutcome::DeadlineReached
                        }
                        message = stream.recv() => message,
                    };
                    match message {
                        Some(Ok(message)) => {
                            received = true;
                            failures = 0;
                            if let Some(terminal) = classify(message) {
                                return PollOutcome::Terminal(terminal);
                            }
                        }
                        Some(Err(e)) => {
                            tracing::warn!(error = %e, "status stream failed");
                            break;
                        }
                        None => break,
                    }
                }
                if !received {
                    failures += 1;
                }
                tracing::debug!(attempt = failures, "status stream ended, reopening");
            }
        }

        if failures > config.max_retries {
            tracing::warn!(attempts = failures, "giving up on status stream");
            return PollOutcome::Exhausted;
        }
        if let Some(stopped) = wait(config, cancel).await {
            return stopped;
        }
    }
}

/// Sleep one retry interval unless polling must stop first
async fn wait<T>(config: PollerConfig, cancel: &CancellationToken) -> Option<PollOutcome<T>> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Some(PollOutcome::Cancelled),
        _ = tokio::time::sleep_until(config.deadline) => Some(PollOutcome::DeadlineReached),
        _ = tokio::time::sleep(config.retry_interval) => None,
    }
}

#[cfg(test)]
#[path = "poller_tests.rs"]
mod tests;
