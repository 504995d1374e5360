// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `warden start` / `stop` / `uninstall` — thin commands over the
//! [`crate::service::ServiceManager`], the service control surface named
//! in §6.

use warden_storage::paths;

use crate::exit_error::{
    ExitError, EXIT_INSUFFICIENT_PRIVILEGES, EXIT_SERVICE_NOT_INSTALLED,
    EXIT_SERVICE_OPERATION_FAILED,
};
use crate::service::{ServiceError, ServiceManager};

pub fn start() -> Result<(), ExitError> {
    ServiceManager::new().start().map_err(map_service_error)?;
    println!("warden service started");
    Ok(())
}

pub fn stop() -> Result<(), ExitError> {
    ServiceManager::new().stop().map_err(map_service_error)?;
    println!("warden service stopped");
    Ok(())
}

pub fn uninstall(remove_data: bool) -> Result<(), ExitError> {
    ServiceManager::new().disable_and_remove().map_err(map_service_error)?;

    if remove_data {
        let state_dir = paths::state_dir();
        if state_dir.exists() {
            std::fs::remove_dir_all(&state_dir).map_err(|e| {
                ExitError::new(EXIT_SERVICE_OPERATION_FAILED, format!("failed to remove {}: {e}", state_dir.display()))
            })?;
        }
        println!("warden service uninstalled; persisted state removed");
    } else {
        println!("warden service uninstalled");
    }
    Ok(())
}

fn map_service_error(err: ServiceError) -> ExitError {
    match err {
        ServiceError::NotInstalled => ExitError::new(EXIT_SERVICE_NOT_INSTALLED, err.to_string()),
        ServiceError::InsufficientPrivileges => {
            ExitError::new(EXIT_INSUFFICIENT_PRIVILEGES, err.to_string())
        }
        ServiceError::OperationFailed(_) => {
            ExitError::new(EXIT_SERVICE_OPERATION_FAILED, err.to_string())
        }
    }
}
