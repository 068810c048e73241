// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client-side mutual exclusion of operations on a repository.
//!
//! The engine locks a repository exclusively while it works on it. Refusing
//! conflicting requests here avoids spawning a process that would only fail
//! on the lock.

use arco_core::{OperationId, OperationKind};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArbiterError {
    #[error("{kind} is already running for {id}")]
    AlreadyRunning { kind: OperationKind, id: OperationId },
    #[error("repository {repository_id} is busy with a {holder_kind} for {holder}")]
    RepositoryBusy {
        repository_id: i64,
        holder_kind: OperationKind,
        holder: OperationId,
    },
}

#[derive(Default)]
struct State {
    running: HashSet<(OperationKind, OperationId)>,
    occupied: HashMap<i64, (OperationKind, OperationId)>,
}

/// Tracks running operations and the repositories they occupy.
///
/// Cloning shares the same membership state.
#[derive(Clone, Default)]
pub struct Arbiter {
    state: Arc<Mutex<State>>,
}

impl Arbiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the operation's repository.
    ///
    /// Fails if the same operation is already running, or if any operation
    /// occupies the repository. The reservation is released when the
    /// returned guard is dropped.
    pub fn reserve(
        &self,
        kind: OperationKind,
        id: OperationId,
    ) -> Result<Reservation, ArbiterError> {
        let mut state = self.lock();
        if state.running.contains(&(kind, id)) {
            return Err(ArbiterError::AlreadyRunning { kind, id });
        }
        if let Some(&(holder_kind, holder)) = state.occupied.get(&id.repository_id) {
            return Err(ArbiterError::RepositoryBusy {
                repository_id: id.repository_id,
                holder_kind,
                holder,
            });
        }
        state.running.insert((kind, id));
        state.occupied.insert(id.repository_id, (kind, id));
        tracing::debug!(%kind, %id, "reserved repository");
        Ok(Reservation {
            arbiter: self.clone(),
            kind,
            id,
            released: false,
        })
    }

    /// Release by identity. Returns false if the operation held nothing.
    pub fn release(&self, kind: OperationKind, id: OperationId) -> bool {
        let mut state = self.lock();
        if !state.running.remove(&(kind, id)) {
            return false;
        }
        if state.occupied.get(&id.repository_id) == Some(&(kind, id)) {
            state.occupied.remove(&id.repository_id);
        }
        tracing::debug!(%kind, %id, "released repository");
        true
    }

    pub fn is_running(&self, kind: OperationKind, id: OperationId) -> bool {
        self.lock().running.contains(&(kind, id))
    }

    pub fn is_occupied(&self, repository_id: i64) -> bool {
        self.lock().occupied.contains_key(&repository_id)
    }

    /// Snapshot of all running operations
    pub fn running(&self) -> Vec<(OperationKind, OperationId)> {
        self.lock().running.iter().copied().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Guard for one reserved operation
#[derive(Debug)]
pub struct Reservation {
    arbiter: Arbiter,
    kind: OperationKind,
    id: OperationId,
    released: bool,
}

impl Reservation {
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn id(&self) -> OperationId {
        self.id
    }

    /// Release now instead of on drop
    pub fn release(mut self) {
        self.release_once();
    }

    fn release_once(&mut self) {
        if !self.released {
            self.released = true;
            self.arbiter.release(self.kind, self.id);
        }
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        self.release_once();
    }
}

impl std::fmt::Debug for Arbiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arbiter")
            .field("running", &self.lock().running.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "arbiter_tests.rs"]
mod tests;
