// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin wrapper over the OS service manager for `start`/`stop`/`uninstall`
//! (§6). Registration of the unit itself is the installer's job (out of
//! scope here, per §1) — this only asks an already-registered unit to
//! start, stop, or disable, via `std::process::Command` rather than
//! linking a platform service-manager crate.

use std::process::Command;

const UNIT_NAME: &str = "warden";

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("the {UNIT_NAME} service is not installed")]
    NotInstalled,

    #[error("insufficient privileges to manage the {UNIT_NAME} service")]
    InsufficientPrivileges,

    #[error("service manager rejected the operation: {0}")]
    OperationFailed(String),
}

pub struct ServiceManager;

impl ServiceManager {
    pub fn new() -> Self {
        Self
    }

    pub fn is_installed(&self) -> Result<bool, ServiceError> {
        let status = Command::new("systemctl")
            .args(["status", UNIT_NAME])
            .status()
            .map_err(|e| ServiceError::OperationFailed(e.to_string()))?;
        // systemctl exits 4 when the unit is not found at all; any other
        // code (running, dead, failed, ...) means the unit is known.
        Ok(status.code() != Some(4))
    }

    pub fn start(&self) -> Result<(), ServiceError> {
        self.run(&["start", UNIT_NAME])
    }

    pub fn stop(&self) -> Result<(), ServiceError> {
        self.run(&["stop", UNIT_NAME])
    }

    pub fn disable_and_remove(&self) -> Result<(), ServiceError> {
        self.run(&["disable", "--now", UNIT_NAME])
    }

    fn run(&self, args: &[&str]) -> Result<(), ServiceError> {
        if !self.is_installed()? {
            return Err(ServiceError::NotInstalled);
        }

        let output = Command::new("systemctl")
            .args(args)
            .output()
            .map_err(|e| ServiceError::OperationFailed(e.to_string()))?;
        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.contains("Access denied") || stderr.contains("Permission denied") {
            return Err(ServiceError::InsufficientPrivileges);
        }
        Err(ServiceError::OperationFailed(stderr.trim().to_string()))
    }
}

impl Default for ServiceManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
