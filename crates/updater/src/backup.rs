// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Install-directory backup, deploy, and rollback (§4.10 steps 3, 4, 7).
//! Rename-preferred with a recursive-copy fallback, the same retention
//! shape the runtime identity store uses for its own backups.

use std::path::Path;

fn copy_dir_all(from: &Path, to: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(to)?;
    for entry in std::fs::read_dir(from)? {
        let entry = entry?;
        let dest = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_all(&entry.path(), &dest)?;
        } else {
            std::fs::copy(entry.path(), &dest)?;
        }
    }
    Ok(())
}

/// Moves `install_dir` to `backup_dir`, preferring an atomic rename and
/// falling back to a recursive copy-then-remove when the paths are on
/// different filesystems.
pub fn backup_install_dir(install_dir: &Path, backup_dir: &Path) -> std::io::Result<()> {
    if let Some(parent) = backup_dir.parent() {
        std::fs::create_dir_all(parent)?;
    }
    match std::fs::rename(install_dir, backup_dir) {
        Ok(()) => Ok(()),
        Err(_) => {
            copy_dir_all(install_dir, backup_dir)?;
            std::fs::remove_dir_all(install_dir)
        }
    }
}

/// Deploys the staged new files into `install_dir`, clearing any partial
/// directory left by a prior failed attempt first.
pub fn deploy_new_files(new_agent_path: &Path, install_dir: &Path) -> std::io::Result<()> {
    if install_dir.exists() {
        std::fs::remove_dir_all(install_dir)?;
    }
    copy_dir_all(new_agent_path, install_dir)
}

/// Restores `install_dir` from `backup_dir` during rollback. Used both
/// when deploy fails (install_dir may already be gone) and when the new
/// service fails to start or the watchdog trips.
pub fn restore_from_backup(backup_dir: &Path, install_dir: &Path) -> std::io::Result<()> {
    if install_dir.exists() {
        std::fs::remove_dir_all(install_dir)?;
    }
    match std::fs::rename(backup_dir, install_dir) {
        Ok(()) => Ok(()),
        Err(_) => {
            copy_dir_all(backup_dir, install_dir)?;
            std::fs::remove_dir_all(backup_dir)
        }
    }
}

/// Best-effort cleanup of the backup directory and update staging
/// artifacts once the new service is confirmed stable (§4.10 step 7).
pub fn cleanup(paths: &[&Path]) {
    for path in paths {
        if let Err(e) = std::fs::remove_dir_all(path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), %e, "updater: cleanup failed for path");
            }
        }
    }
}

#[cfg(test)]
#[path = "backup_tests.rs"]
mod tests;
