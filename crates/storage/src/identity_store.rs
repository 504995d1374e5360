// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Atomic persistence of [`RuntimeIdentity`] under `runtime_config/identity`
//! (§4.2, §3 invariant 6): a crash mid-write must leave either the old or
//! the new file intact, never a partial one.

use std::path::{Path, PathBuf};

use warden_core::RuntimeIdentity;

use crate::error::StorageError;

const MAX_BAK_FILES: u32 = 3;

/// Rotates `path.bak` -> `path.bak.1` -> ... -> `path.bak.{MAX_BAK_FILES}`,
/// dropping the oldest, so `save` never clobbers the last-known-good
/// identity file even if the new write is itself later found corrupt.
fn rotate_bak_path(path: &Path, n: u32) -> PathBuf {
    if n == 0 {
        path.with_extension("bak")
    } else {
        let mut name = path.file_name().unwrap_or_default().to_os_string();
        name.push(format!(".bak.{n}"));
        path.with_file_name(name)
    }
}

fn rotate_backups(path: &Path) -> std::io::Result<()> {
    for n in (0..MAX_BAK_FILES).rev() {
        let from = rotate_bak_path(path, n);
        if from.exists() {
            let to = rotate_bak_path(path, n + 1);
            std::fs::rename(from, to)?;
        }
    }
    Ok(())
}

pub struct IdentityStore {
    path: PathBuf,
}

impl IdentityStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Returns the last persisted runtime identity, or `None` if absent
    /// (§4.2's `load_runtime(force_reload=false)` contract).
    pub fn load(&self) -> Result<Option<RuntimeIdentity>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read(&self.path)?;
        let identity = serde_json::from_slice(&raw)?;
        Ok(Some(identity))
    }

    /// Writes atomically: serialise to a sibling `.tmp` file, `fsync`, then
    /// `rename` over the real path. The rename is what the filesystem
    /// guarantees is atomic; the previous good file is rotated into a
    /// `.bak` chain first so a bad write can be recovered from.
    pub fn save(&self, identity: &RuntimeIdentity) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        if self.path.exists() {
            rotate_backups(&self.path)?;
        }

        let tmp_path = self.path.with_extension("tmp");
        let body = serde_json::to_vec_pretty(identity)?;
        {
            let mut file = std::fs::File::create(&tmp_path)?;
            use std::io::Write;
            file.write_all(&body)?;
            file.sync_all()?;
        }
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "identity_store_tests.rs"]
mod tests;
