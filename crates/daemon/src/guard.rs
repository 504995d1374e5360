// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-Instance Guard (§4.11): a host-wide named lock acquired at
//! startup, released on `Drop` — open (not truncating until the lock is
//! held), `try_lock_exclusive`, then stamp the file with our PID.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GuardError {
    #[error("another warden agent instance is already running (lock held at {0})")]
    AlreadyRunning(PathBuf),

    #[error("failed to access lock file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Holds the exclusive lock on the PID file for the process lifetime.
/// The lock is released automatically when this value is dropped (file
/// close releases the advisory lock) or when the process is killed by
/// the operating system.
pub struct InstanceGuard {
    file: File,
    path: PathBuf,
}

impl InstanceGuard {
    pub fn acquire(path: &Path) -> Result<Self, GuardError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|source| GuardError::Io { path: path.to_path_buf(), source })?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|source| GuardError::Io { path: path.to_path_buf(), source })?;

        file.try_lock_exclusive().map_err(|_| GuardError::AlreadyRunning(path.to_path_buf()))?;

        let mut file = file;
        file.set_len(0).map_err(|source| GuardError::Io { path: path.to_path_buf(), source })?;
        writeln!(file, "{}", std::process::id())
            .map_err(|source| GuardError::Io { path: path.to_path_buf(), source })?;

        Ok(Self { file, path: path.to_path_buf() })
    }
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
        let _ = std::fs::remove_file(&self.path);
    }
}

#[cfg(test)]
#[path = "guard_tests.rs"]
mod tests;
