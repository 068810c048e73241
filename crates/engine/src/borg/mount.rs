// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! FUSE mounts of repositories and archives

use super::Borg;
use arco_adapters::CommandRunner;
use arco_core::{ArchivePath, BorgError, Clock, Status};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

const APP_DIR: &str = "arco";

/// Per-user directory mount points are created under
pub fn default_mount_root() -> PathBuf {
    platform_runtime_dir().join(APP_DIR)
}

#[cfg(target_os = "linux")]
fn platform_runtime_dir() -> PathBuf {
    dirs::runtime_dir().unwrap_or_else(|| PathBuf::from("/run/user").join(uid()))
}

#[cfg(target_os = "macos")]
fn platform_runtime_dir() -> PathBuf {
    PathBuf::from("/private/tmp").join(uid())
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
fn platform_runtime_dir() -> PathBuf {
    std::env::temp_dir()
}

#[cfg(any(target_os = "linux", target_os = "macos"))]
fn uid() -> String {
    nix::unistd::getuid().to_string()
}

/// Mount point of a whole repository
pub fn repository_mount_dir(root: &Path, repository_id: i64) -> PathBuf {
    root.join(format!("repo-{repository_id}"))
}

/// Mount point of a single archive
pub fn archive_mount_dir(root: &Path, archive_id: i64) -> PathBuf {
    root.join(format!("archive-{archive_id}"))
}

/// Mount points under the mount root that are currently mounted, by id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mounts {
    pub repositories: BTreeMap<i64, PathBuf>,
    pub archives: BTreeMap<i64, PathBuf>,
}

impl Mounts {
    /// Keep the mount points that are direct `repo-<id>` or `archive-<id>`
    /// children of `root`. Anything else is ignored.
    pub fn from_mount_points<'a>(root: &Path, points: impl IntoIterator<Item = &'a str>) -> Self {
        static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
        let mut mounts = Self::default();
        let Some(pattern) = PATTERN
            .get_or_init(|| Regex::new(r"^(repo|archive)-(\d+)$").ok())
            .as_ref()
        else {
            return mounts;
        };
        for point in points {
            let path = Path::new(point);
            if path.parent() != Some(root) {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(caps) = pattern.captures(name) else {
                continue;
            };
            let Ok(id) = caps[2].parse::<i64>() else {
                continue;
            };
            let map = match &caps[1] {
                "repo" => &mut mounts.repositories,
                _ => &mut mounts.archives,
            };
            map.insert(id, path.to_path_buf());
        }
        mounts
    }

    /// Parse the Linux `/proc/self/mountinfo` table
    pub fn from_mountinfo(root: &Path, table: &str) -> Self {
        let points: Vec<String> = table
            .lines()
            .filter_map(|line| line.split(' ').nth(4))
            .map(unescape_mountinfo)
            .collect();
        Self::from_mount_points(root, points.iter().map(String::as_str))
    }

    /// Parse the output of `mount` as printed on macOS:
    /// `<device> on <mount point> (<options>)`
    pub fn from_mount_output(root: &Path, output: &str) -> Self {
        let points = output.lines().filter_map(|line| {
            let (_, rest) = line.split_once(" on ")?;
            Some(rest.rsplit_once(" (").map_or(rest, |(point, _)| point))
        });
        Self::from_mount_points(root, points)
    }

    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty() && self.archives.is_empty()
    }
}

/// Octal escapes the kernel uses for whitespace and backslashes in mountinfo
fn unescape_mountinfo(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let octal = bytes
            .get(i + 1..i + 4)
            .filter(|_| bytes[i] == b'\\')
            .and_then(|digits| std::str::from_utf8(digits).ok())
            .and_then(|digits| u8::from_str_radix(digits, 8).ok());
        match octal {
            Some(byte) => {
                out.push(byte);
                i += 4;
            }
            None => {
                out.push(bytes[i]);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[derive(Debug, Error)]
pub enum MountTableError {
    #[error("failed to read mount table: {0}")]
    Io(#[from] std::io::Error),
    #[error("mount command failed: {0}")]
    Command(String),
    #[error("mount discovery is not supported on this platform")]
    Unsupported,
}

#[cfg(target_os = "linux")]
async fn read_mounts(root: &Path) -> Result<Mounts, MountTableError> {
    let table = tokio::fs::read_to_string("/proc/self/mountinfo").await?;
    Ok(Mounts::from_mountinfo(root, &table))
}

#[cfg(target_os = "macos")]
async fn read_mounts(root: &Path) -> Result<Mounts, MountTableError> {
    let output = tokio::process::Command::new("mount").output().await?;
    if !output.status.success() {
        return Err(MountTableError::Command(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }
    Ok(Mounts::from_mount_output(
        root,
        &String::from_utf8_lossy(&output.stdout),
    ))
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
async fn read_mounts(_root: &Path) -> Result<Mounts, MountTableError> {
    Err(MountTableError::Unsupported)
}

impl<R: CommandRunner, C: Clock> Borg<R, C> {
    /// Repositories and archives currently mounted under the mount root
    pub async fn mounted(&self) -> Result<Mounts, MountTableError> {
        let mounts = read_mounts(&self.mount_root()).await?;
        tracing::debug!(
            repositories = mounts.repositories.len(),
            archives = mounts.archives.len(),
            "read mount table"
        );
        Ok(mounts)
    }

    /// Mount every archive of a repository. Returns the mount point.
    pub async fn mount_repository(
        &self,
        cancel: &CancellationToken,
        repository: &str,
        passphrase: &str,
        repository_id: i64,
    ) -> (Status, PathBuf) {
        let dir = repository_mount_dir(&self.mount_root(), repository_id);
        let target = ArchivePath::repository(repository);
        (self.mount(cancel, &target, passphrase, &dir).await, dir)
    }

    /// Mount one archive. Returns the mount point.
    pub async fn mount_archive(
        &self,
        cancel: &CancellationToken,
        repository: &str,
        passphrase: &str,
        archive: &str,
        archive_id: i64,
    ) -> (Status, PathBuf) {
        let dir = archive_mount_dir(&self.mount_root(), archive_id);
        let target = ArchivePath::archive(repository, archive);
        (self.mount(cancel, &target, passphrase, &dir).await, dir)
    }

    pub async fn unmount(&self, cancel: &CancellationToken, mount_point: &Path) -> Status {
        let spec = self.mount_command(
            &self.env(""),
            ["umount".to_string(), mount_point.to_string_lossy().into_owned()],
        );
        self.buffered(spec, cancel).await.0
    }

    async fn mount(
        &self,
        cancel: &CancellationToken,
        target: &ArchivePath,
        passphrase: &str,
        dir: &Path,
    ) -> Status {
        if let Err(e) = tokio::fs::create_dir_all(dir).await {
            tracing::error!(dir = %dir.display(), error = %e, "failed to create mount point");
            return Status::failed(
                BorgError::runtime(format!("failed to create mount point {}", dir.display()))
                    .with_cause(e),
            );
        }
        tracing::debug!(%target, dir = %dir.display(), archive = target.is_archive(), "mounting");
        let spec = self.mount_command(
            &self.env(passphrase),
            [
                "mount".to_string(),
                target.to_string(),
                dir.to_string_lossy().into_owned(),
            ],
        );
        self.buffered(spec, cancel).await.0
    }
}

#[cfg(test)]
#[path = "mount_tests.rs"]
mod tests;
