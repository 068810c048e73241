// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine layer

use crate::arbiter::ArbiterError;
use arco_core::OperationId;
use thiserror::Error;

/// Errors returned when a job cannot be started.
///
/// Failures of the engine process itself are never reported here; they
/// arrive as a [`Status`](arco_core::Status) in the job outcome.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Arbiter(#[from] ArbiterError),
    #[error("invalid job {id}: {message}")]
    InvalidJob { id: OperationId, message: String },
}
