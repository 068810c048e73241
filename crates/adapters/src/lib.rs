// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for external I/O: engine processes and remote auth status

pub mod auth;
pub mod runner;
pub mod terminate;
pub mod traced;

pub use auth::{AuthStatusSource, SourceError, StatusReceiver};
pub use runner::{CommandOutput, CommandRunner, CommandSpec, ExitState, ProcessRunner, RunError};
pub use terminate::{ProcessGroupTerminator, Terminator};
pub use traced::TracedRunner;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use auth::{FakeAttempt, FakeAuthSource};
#[cfg(any(test, feature = "test-support"))]
pub use runner::{FakeResponse, FakeRunner, RunMode, RunnerCall};
