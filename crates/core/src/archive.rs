// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Repository and archive path expressions

use std::fmt;

/// `repo` or `repo::archive`, as the engine expects on its command line
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArchivePath {
    repository: String,
    archive: Option<String>,
}

impl ArchivePath {
    pub fn repository(repository: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            archive: None,
        }
    }

    pub fn archive(repository: impl Into<String>, archive: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            archive: Some(archive.into()),
        }
    }

    pub fn repository_url(&self) -> &str {
        &self.repository
    }

    pub fn archive_name(&self) -> Option<&str> {
        self.archive.as_deref()
    }

    pub fn is_archive(&self) -> bool {
        self.archive.is_some()
    }
}

impl fmt::Display for ArchivePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.archive {
            Some(archive) => write!(f, "{}::{}", self.repository, archive),
            None => f.write_str(&self.repository),
        }
    }
}
