// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! arco-engine: backup orchestration on top of the engine binary
//!
//! - [`Borg`] runs engine verbs and classifies their results
//! - [`Arbiter`] keeps conflicting operations off a repository
//! - [`JobService`] runs arbitrated backup, prune and delete jobs
//! - [`poll_session`] and [`AuthMonitor`] wait on authentication sessions

pub mod arbiter;
pub mod auth;
pub mod borg;
mod error;
pub mod jobs;
pub mod poller;

pub use arbiter::{Arbiter, ArbiterError, Reservation};
pub use auth::{AuthEvent, AuthMonitor, SessionRegistry, TokenSink, TokenStoreError};
pub use borg::{Borg, BorgVersion, CheckMode, EncryptionMode, MountTableError, Mounts};
pub use error::EngineError;
pub use jobs::{JobHandle, JobService};
pub use poller::{poll_session, PollOutcome, PollerConfig};
