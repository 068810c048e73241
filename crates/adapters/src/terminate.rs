// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stopping a process together with the children it spawned
//!
//! The engine delegates network transports to a remote-shell child, so
//! signalling only the direct child would leave that child running.

use std::io;

/// Platform strategy for ending a process tree
pub trait Terminator: Clone + Send + Sync + 'static {
    /// Ask the tree rooted at `pid` to stop
    fn terminate(&self, pid: u32) -> io::Result<()>;

    /// End the tree rooted at `pid` without giving it a chance to clean up
    fn force_kill(&self, pid: u32) -> io::Result<()>;
}

/// Signals the process group on unix (processes are spawned as group
/// leaders) and the process tree on Windows.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessGroupTerminator;

#[cfg(unix)]
impl Terminator for ProcessGroupTerminator {
    fn terminate(&self, pid: u32) -> io::Result<()> {
        signal_group(pid, nix::sys::signal::Signal::SIGINT)
    }

    fn force_kill(&self, pid: u32) -> io::Result<()> {
        signal_group(pid, nix::sys::signal::Signal::SIGKILL)
    }
}

#[cfg(unix)]
fn signal_group(pid: u32, signal: nix::sys::signal::Signal) -> io::Result<()> {
    let pid = i32::try_from(pid)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, format!("invalid pid {pid}")))?;
    nix::sys::signal::killpg(nix::unistd::Pid::from_raw(pid), signal)?;
    Ok(())
}

#[cfg(windows)]
impl Terminator for ProcessGroupTerminator {
    fn terminate(&self, pid: u32) -> io::Result<()> {
        taskkill(pid, false)
    }

    fn force_kill(&self, pid: u32) -> io::Result<()> {
        taskkill(pid, true)
    }
}

#[cfg(windows)]
fn taskkill(pid: u32, force: bool) -> io::Result<()> {
    let mut cmd = std::process::Command::new("taskkill");
    cmd.arg("/T");
    if force {
        cmd.arg("/F");
    }
    let status = cmd.arg("/PID").arg(pid.to_string()).status()?;
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::other(format!("taskkill exited with {status}")))
    }
}

#[cfg(all(test, unix))]
#[path = "terminate_tests.rs"]
mod tests;
