// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exit-code classification and the operation result envelope
//!
//! Every engine exit code maps to exactly one of success, a [`BorgWarning`]
//! or a [`BorgError`]. [`Status`] combines at most one of each with a
//! cancellation flag and is immutable once built.

pub mod catalog;
mod error;

pub use error::{BorgError, BorgWarning, Cause, ErrorCategory};

use serde::Serialize;

/// Outcome of classifying a single exit code
#[derive(Debug, Clone, PartialEq)]
pub enum ExitClass {
    Success,
    Warning(BorgWarning),
    Error(BorgError),
}

impl ExitClass {
    pub fn into_status(self) -> Status {
        match self {
            ExitClass::Success => Status::success(),
            ExitClass::Warning(w) => Status::with_warning(w),
            ExitClass::Error(e) => Status::failed(e),
        }
    }
}

/// Classify an engine exit code.
///
/// Total over `i32`: codes missing from the catalogue become a generic
/// [`ErrorCategory::General`] error that still carries the original code.
pub fn classify(code: i32) -> ExitClass {
    if code == 0 {
        return ExitClass::Success;
    }
    if let Some(w) = catalog::find_warning(code) {
        return ExitClass::Warning(BorgWarning::catalogued(code, w.message, w.category));
    }
    let e = catalog::find_error(code).unwrap_or(&catalog::GENERIC_ERROR);
    ExitClass::Error(BorgError::catalogued(code, e.message, e.category))
}

/// Result envelope of one engine operation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Status {
    error: Option<BorgError>,
    warning: Option<BorgWarning>,
    cancelled: bool,
}

impl Status {
    pub fn success() -> Self {
        Self::default()
    }

    pub fn cancelled() -> Self {
        Self {
            cancelled: true,
            ..Self::default()
        }
    }

    pub fn failed(error: BorgError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    pub fn with_warning(warning: BorgWarning) -> Self {
        Self {
            warning: Some(warning),
            ..Self::default()
        }
    }

    pub fn from_exit_code(code: i32) -> Self {
        classify(code).into_status()
    }

    /// No error and not cancelled. A warning alone still counts as success.
    pub fn is_completed_with_success(&self) -> bool {
        self.error.is_none() && !self.cancelled
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn has_warning(&self) -> bool {
        self.warning.is_some()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn error(&self) -> Option<&BorgError> {
        self.error.as_ref()
    }

    pub fn warning(&self) -> Option<&BorgWarning> {
        self.warning.as_ref()
    }
}

/// Serializable projection of a [`Status`] for notification payloads
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSummary {
    pub success: bool,
    pub cancelled: bool,
    pub error: Option<Classification>,
    pub warning: Option<Classification>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub exit_code: Option<i32>,
    pub category: ErrorCategory,
    pub message: String,
}

impl From<&Status> for StatusSummary {
    fn from(status: &Status) -> Self {
        Self {
            success: status.is_completed_with_success(),
            cancelled: status.cancelled,
            error: status.error.as_ref().map(|e| Classification {
                exit_code: e.exit_code(),
                category: e.category(),
                message: e.message().to_string(),
            }),
            warning: status.warning.as_ref().map(|w| Classification {
                exit_code: Some(w.exit_code()),
                category: w.category(),
                message: w.message().to_string(),
            }),
        }
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
