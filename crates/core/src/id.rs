// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operation identifiers used as arbitration keys

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one in-flight operation: a backup profile acting on a repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationId {
    pub profile_id: i64,
    pub repository_id: i64,
}

impl OperationId {
    pub fn new(profile_id: i64, repository_id: i64) -> Self {
        Self {
            profile_id,
            repository_id,
        }
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.profile_id, self.repository_id)
    }
}

/// The kind of long-running operation holding a repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Backup,
    Prune,
    Delete,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::Backup => "backup",
            OperationKind::Prune => "prune",
            OperationKind::Delete => "delete",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
