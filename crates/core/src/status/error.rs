// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Classified engine errors and warnings

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Underlying cause attached to a classified error
pub type Cause = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Stable category callers branch on instead of matching engine text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    General,
    Repository,
    Archive,
    Key,
    Passphrase,
    Cache,
    Lock,
    Connection,
    Integrity,
    Backup,
    Permission,
    Runtime,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::General => "general",
            ErrorCategory::Repository => "repository",
            ErrorCategory::Archive => "archive",
            ErrorCategory::Key => "key",
            ErrorCategory::Passphrase => "passphrase",
            ErrorCategory::Cache => "cache",
            ErrorCategory::Lock => "lock",
            ErrorCategory::Connection => "connection",
            ErrorCategory::Integrity => "integrity",
            ErrorCategory::Backup => "backup",
            ErrorCategory::Permission => "permission",
            ErrorCategory::Runtime => "runtime",
        };
        f.write_str(name)
    }
}

/// A fatal classification: the operation did not complete as intended.
///
/// Engine errors carry the exit code they were classified from. Errors that
/// never reached the engine (spawn failures, undecodable output) have no
/// exit code and use [`ErrorCategory::Runtime`].
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct BorgError {
    exit_code: Option<i32>,
    message: Cow<'static, str>,
    category: ErrorCategory,
    #[source]
    cause: Option<Cause>,
}

impl BorgError {
    pub(crate) const fn catalogued(
        exit_code: i32,
        message: &'static str,
        category: ErrorCategory,
    ) -> Self {
        Self {
            exit_code: Some(exit_code),
            message: Cow::Borrowed(message),
            category,
            cause: None,
        }
    }

    /// An error raised outside the engine's exit-code contract
    pub fn runtime(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            exit_code: None,
            message: message.into(),
            category: ErrorCategory::Runtime,
            cause: None,
        }
    }

    /// Attach the underlying cause
    pub fn with_cause<E>(mut self, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.cause = Some(Arc::new(cause));
        self
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn category(&self) -> ErrorCategory {
        self.category
    }

    pub fn cause(&self) -> Option<&Cause> {
        self.cause.as_ref()
    }
}

impl PartialEq for BorgError {
    fn eq(&self, other: &Self) -> bool {
        self.exit_code == other.exit_code
            && self.category == other.category
            && self.message == other.message
    }
}

/// A non-fatal classification: the operation completed with caveats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct BorgWarning {
    exit_code: i32,
    message: &'static str,
    category: ErrorCategory,
}

impl BorgWarning {
    pub(crate) const fn catalogued(
        exit_code: i32,
        message: &'static str,
        category: ErrorCategory,
    ) -> Self {
        Self {
            exit_code,
            message,
            category,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    pub fn message(&self) -> &'static str {
        self.message
    }

    pub fn category(&self) -> ErrorCategory {
        self.category
    }
}
