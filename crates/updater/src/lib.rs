// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! warden-updater: the out-of-process updater (§4.10). A standalone bin
//! crate with no async runtime — the whole procedure is a short-lived,
//! mostly-blocking linear state machine, so `tokio` would be dead weight.

pub mod args;
pub mod backup;
pub mod exit;
pub mod process;

use std::process::Child;
use std::time::Duration;

use exit::UpdaterExit;
use warden_core::UpdateParameters;

const WAIT_FOR_OLD_AGENT_TIMEOUT: Duration = Duration::from_secs(30);
const WATCHDOG_WINDOW: Duration = Duration::from_secs(90);

/// `Waiting -> BackingUp -> Deploying -> Starting -> Watching ->
/// (CleaningUp -> Done) | (RollingBack -> (Done | Failed))` (§4.10).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Waiting,
    BackingUp,
    Deploying,
    Starting,
    Watching,
    CleaningUp,
    RollingBack,
}

/// Runs the full update procedure described in §4.10 and returns the exit
/// code the binary should terminate with.
pub fn run(params: UpdateParameters) -> UpdaterExit {
    run_inner(params, WATCHDOG_WINDOW)
}

fn run_inner(params: UpdateParameters, watchdog_window: Duration) -> UpdaterExit {
    let lock_path = warden_storage::paths::pid_file();
    let backup_dir = warden_storage::paths::backup_dir(&params.current_agent_version);

    let mut state = State::Waiting;
    let mut child: Option<Child> = None;
    loop {
        tracing::info!(?state, "updater: entering state");
        state = match state {
            State::Waiting => {
                if !process::wait_for_old_agent_exit(&lock_path, WAIT_FOR_OLD_AGENT_TIMEOUT) {
                    tracing::error!("updater: old agent did not exit within the deadline");
                    return UpdaterExit::AgentStopTimeout;
                }
                State::BackingUp
            }
            State::BackingUp => {
                if let Err(e) = backup::backup_install_dir(&params.current_install_dir, &backup_dir)
                {
                    tracing::error!(%e, "updater: backup failed, no deployment attempted");
                    return UpdaterExit::BackupFailed;
                }
                State::Deploying
            }
            State::Deploying => {
                if let Err(e) =
                    backup::deploy_new_files(&params.new_agent_path, &params.current_install_dir)
                {
                    tracing::error!(%e, "updater: deploy failed, rolling back");
                    return match rollback(&backup_dir, &params.current_install_dir) {
                        true => UpdaterExit::DeployFailed,
                        false => UpdaterExit::RollbackFailed,
                    };
                }
                State::Starting
            }
            State::Starting => match process::spawn_agent(&params.current_install_dir) {
                Ok(spawned) => {
                    child = Some(spawned);
                    State::Watching
                }
                Err(e) => {
                    tracing::error!(%e, "updater: new service failed to start, rolling back");
                    return match rollback(&backup_dir, &params.current_install_dir) {
                        true => UpdaterExit::NewServiceStartFailed,
                        false => UpdaterExit::RollbackFailed,
                    };
                }
            },
            State::Watching => {
                let running = child
                    .take()
                    .expect("Watching is only reached after Starting sets the child");
                let install_dir = params.current_install_dir.clone();
                let outcome = process::watch(running, watchdog_window, move || {
                    process::spawn_agent(&install_dir)
                });
                match outcome {
                    process::WatchdogOutcome::Stable => State::CleaningUp,
                    process::WatchdogOutcome::CrashedRepeatedly => {
                        tracing::error!("updater: new service crashed repeatedly, rolling back");
                        State::RollingBack
                    }
                }
            }
            State::CleaningUp => {
                backup::cleanup(&[backup_dir.as_path(), params.new_agent_path.as_path()]);
                tracing::info!("updater: update completed successfully");
                return UpdaterExit::Success;
            }
            State::RollingBack => {
                return match rollback(&backup_dir, &params.current_install_dir) {
                    true => UpdaterExit::WatchdogTriggeredRollback,
                    false => UpdaterExit::RollbackFailed,
                };
            }
        };
    }
}

/// Restores the backed-up install directory and best-effort restarts the
/// old agent. Returns whether the restore itself succeeded.
fn rollback(backup_dir: &std::path::Path, install_dir: &std::path::Path) -> bool {
    match backup::restore_from_backup(backup_dir, install_dir) {
        Ok(()) => {
            if let Err(e) = process::spawn_agent(install_dir) {
                tracing::warn!(%e, "updater: rollback restored files but restarting the old agent failed");
            }
            true
        }
        Err(e) => {
            tracing::error!(%e, "updater: rollback itself failed, install directory may be unusable");
            false
        }
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
