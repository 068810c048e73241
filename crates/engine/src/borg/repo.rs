// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-invocation repository and archive verbs

use super::{invalid_request, Borg};
use arco_adapters::CommandRunner;
use arco_core::{ArchivePath, Clock, InfoResponse, ListResponse, Status};
use tokio_util::sync::CancellationToken;

/// Encryption of a new repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncryptionMode {
    /// Key stored in the repository, protected by the passphrase
    #[default]
    RepokeyBlake2,
    None,
}

impl EncryptionMode {
    fn flag(self) -> &'static str {
        match self {
            EncryptionMode::RepokeyBlake2 => "--encryption=repokey-blake2",
            EncryptionMode::None => "--encryption=none",
        }
    }
}

impl<R: CommandRunner, C: Clock> Borg<R, C> {
    /// Initialize a repository. Fails with a repository error if it exists.
    pub async fn init(
        &self,
        cancel: &CancellationToken,
        repository: &str,
        passphrase: &str,
        encryption: EncryptionMode,
    ) -> Status {
        let spec = self.command(
            &self.env(passphrase),
            ["init", encryption.flag(), repository],
        );
        self.buffered(spec, cancel).await.0
    }

    pub async fn info(
        &self,
        cancel: &CancellationToken,
        repository: &str,
        passphrase: &str,
    ) -> (Status, Option<InfoResponse>) {
        let spec = self.command(&self.env(passphrase), ["info", "--json", repository]);
        self.buffered_json(spec, cancel).await
    }

    pub async fn list(
        &self,
        cancel: &CancellationToken,
        repository: &str,
        passphrase: &str,
    ) -> (Status, Option<ListResponse>) {
        let spec = self.command(&self.env(passphrase), ["list", "--json", repository]);
        self.buffered_json(spec, cancel).await
    }

    /// Delete one archive. Space is reclaimed by a later compact.
    pub async fn delete_archive(
        &self,
        cancel: &CancellationToken,
        repository: &str,
        passphrase: &str,
        archive: &str,
    ) -> Status {
        let target = ArchivePath::archive(repository, archive).to_string();
        let spec = self.command(&self.env(passphrase), ["delete".to_string(), target]);
        self.buffered(spec, cancel).await.0
    }

    /// Delete every archive whose name starts with `prefix`, then compact
    pub async fn delete_archives(
        &self,
        cancel: &CancellationToken,
        repository: &str,
        passphrase: &str,
        prefix: &str,
    ) -> Status {
        if prefix.is_empty() {
            return invalid_request("refusing to delete archives without a prefix");
        }
        let pattern = format!("{prefix}*");
        let spec = self.command(
            &self.env(passphrase),
            ["delete", "--glob-archives", pattern.as_str(), repository],
        );
        let (status, _) = self.buffered(spec, cancel).await;
        if !status.is_completed_with_success() {
            return status;
        }
        let compacted = self.compact(cancel, repository, passphrase).await;
        if compacted.is_completed_with_success() {
            status
        } else {
            compacted
        }
    }

    /// Delete the whole repository
    pub async fn delete_repository(
        &self,
        cancel: &CancellationToken,
        repository: &str,
        passphrase: &str,
    ) -> Status {
        let env = self.env(passphrase).with_delete_confirmation();
        let spec = self.command(&env, ["delete", repository]);
        self.buffered(spec, cancel).await.0
    }

    pub async fn rename(
        &self,
        cancel: &CancellationToken,
        repository: &str,
        passphrase: &str,
        archive: &str,
        new_name: &str,
    ) -> Status {
        let target = ArchivePath::archive(repository, archive).to_string();
        let spec = self.command(
            &self.env(passphrase),
            ["rename", target.as_str(), new_name],
        );
        self.buffered(spec, cancel).await.0
    }

    /// Rewrite an archive's comment
    pub async fn recreate(
        &self,
        cancel: &CancellationToken,
        repository: &str,
        passphrase: &str,
        archive: &str,
        comment: &str,
    ) -> Status {
        let target = ArchivePath::archive(repository, archive).to_string();
        let spec = self.command(
            &self.env(passphrase),
            ["recreate", "--comment", comment, target.as_str()],
        );
        self.buffered(spec, cancel).await.0
    }

    pub async fn change_passphrase(
        &self,
        cancel: &CancellationToken,
        repository: &str,
        passphrase: &str,
        new_passphrase: &str,
    ) -> Status {
        if new_passphrase.is_empty() {
            return invalid_request("new passphrase must not be empty");
        }
        let env = self.env(passphrase).with_new_passphrase(new_passphrase);
        let spec = self.command(&env, ["key", "change-passphrase", repository]);
        self.buffered(spec, cancel).await.0
    }

    /// Remove a stale repository and cache lock
    pub async fn break_lock(
        &self,
        cancel: &CancellationToken,
        repository: &str,
        passphrase: &str,
    ) -> Status {
        let spec = self.command(&self.env(passphrase), ["break-lock", repository]);
        self.buffered(spec, cancel).await.0
    }
}

#[cfg(test)]
#[path = "repo_tests.rs"]
mod tests;
