// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess environment for engine invocations

use std::fmt;
use std::path::PathBuf;

pub const BORG_RSH: &str = "BORG_RSH";
pub const BORG_EXIT_CODES: &str = "BORG_EXIT_CODES";
pub const BORG_PASSPHRASE: &str = "BORG_PASSPHRASE";
pub const BORG_NEW_PASSPHRASE: &str = "BORG_NEW_PASSPHRASE";
pub const BORG_DELETE_CONFIRMATION: &str = "BORG_DELETE_I_KNOW_WHAT_I_AM_DOING";

/// Builds the environment an engine process runs with.
///
/// The builder is a value: nothing is read from or written to the current
/// process until [`BorgEnv::build`] copies the parent environment.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct BorgEnv {
    ssh_keys: Vec<PathBuf>,
    passphrase: Option<String>,
    new_passphrase: Option<String>,
    confirm_delete: bool,
}

impl BorgEnv {
    pub fn new<I>(ssh_keys: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<PathBuf>,
    {
        Self {
            ssh_keys: ssh_keys.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Set the repository passphrase. An empty passphrase is not exported.
    pub fn with_passphrase(mut self, passphrase: &str) -> Self {
        self.passphrase = non_empty(passphrase);
        self
    }

    /// Set the passphrase a key change switches to
    pub fn with_new_passphrase(mut self, passphrase: &str) -> Self {
        self.new_passphrase = non_empty(passphrase);
        self
    }

    /// Pre-answer the engine's interactive repository deletion prompt
    pub fn with_delete_confirmation(mut self) -> Self {
        self.confirm_delete = true;
        self
    }

    /// The remote-shell directive handed to the engine
    pub fn remote_shell(&self) -> String {
        let mut rsh = String::from("ssh -oBatchMode=yes -oStrictHostKeyChecking=accept-new");
        for key in &self.ssh_keys {
            rsh.push_str(" -i ");
            rsh.push_str(&shell_quote(&key.to_string_lossy()));
        }
        rsh
    }

    /// Variables this builder sets, in a stable order
    pub fn overrides(&self) -> Vec<(String, String)> {
        let mut vars = vec![
            (BORG_RSH.to_string(), self.remote_shell()),
            (BORG_EXIT_CODES.to_string(), "modern".to_string()),
        ];
        if let Some(passphrase) = &self.passphrase {
            vars.push((BORG_PASSPHRASE.to_string(), passphrase.clone()));
        }
        if let Some(passphrase) = &self.new_passphrase {
            vars.push((BORG_NEW_PASSPHRASE.to_string(), passphrase.clone()));
        }
        if self.confirm_delete {
            vars.push((BORG_DELETE_CONFIRMATION.to_string(), "YES".to_string()));
        }
        vars
    }

    /// Overlay [`BorgEnv::overrides`] on the given parent environment.
    ///
    /// Parent variables the engine reads for credentials or confirmation are
    /// dropped, so a repository without encryption never inherits a passphrase.
    pub fn build_from<I>(&self, parent: I) -> Vec<(String, String)>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut vars: Vec<(String, String)> = parent
            .into_iter()
            .filter(|(key, _)| !is_managed(key))
            .collect();
        vars.extend(self.overrides());
        vars
    }

    /// Overlay on the current process environment
    pub fn build(&self) -> Vec<(String, String)> {
        self.build_from(std::env::vars())
    }
}

impl fmt::Debug for BorgEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BorgEnv")
            .field("ssh_keys", &self.ssh_keys)
            .field("passphrase", &self.passphrase.as_ref().map(|_| "<redacted>"))
            .field(
                "new_passphrase",
                &self.new_passphrase.as_ref().map(|_| "<redacted>"),
            )
            .field("confirm_delete", &self.confirm_delete)
            .finish()
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn is_managed(key: &str) -> bool {
    matches!(
        key,
        BORG_RSH
            | BORG_EXIT_CODES
            | BORG_PASSPHRASE
            | BORG_NEW_PASSPHRASE
            | BORG_DELETE_CONFIRMATION
    )
}

// The engine splits BORG_RSH with shell rules.
fn shell_quote(value: &str) -> String {
    if !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "/._-+:@~".contains(c))
    {
        return value.to_string();
    }
    format!("'{}'", value.replace('\'', r"'\''"))
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
