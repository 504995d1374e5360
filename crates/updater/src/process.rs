// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Old-process wait, new-service start, and the post-start watchdog
//! (§4.10 steps 2, 5, 6).

use std::path::Path;
use std::process::{Child, Command};
use std::time::{Duration, Instant};

use fs2::FileExt;

const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Waits for the old agent to release its single-instance lock file,
/// which happens only once its process has actually exited — the same
/// `fs2::try_lock_exclusive` primitive the agent itself uses to guard
/// against a second instance. Returns `true` once released (or if the
/// lock file never existed), `false` on timeout.
pub fn wait_for_old_agent_exit(lock_path: &Path, deadline: Duration) -> bool {
    if !lock_path.exists() {
        return true;
    }
    let Ok(file) = std::fs::OpenOptions::new().write(true).open(lock_path) else {
        return true;
    };
    let start = Instant::now();
    loop {
        if file.try_lock_exclusive().is_ok() {
            let _ = fs2::FileExt::unlock(&file);
            return true;
        }
        if start.elapsed() >= deadline {
            return false;
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

/// Launches the agent binary installed under `install_dir`, detached from
/// the updater's own process group so it survives the updater's exit.
pub fn spawn_agent(install_dir: &Path) -> std::io::Result<Child> {
    Command::new(install_dir.join("wardend")).current_dir(install_dir).spawn()
}

pub enum WatchdogOutcome {
    Stable,
    CrashedRepeatedly,
}

/// Polls `child` for the observation window (§4.10 step 6). A crash within
/// the window is tolerated once — the watchdog respawns via `respawn` — but
/// a second crash within the window trips the rollback.
pub fn watch(
    mut child: Child,
    window: Duration,
    respawn: impl Fn() -> std::io::Result<Child>,
) -> WatchdogOutcome {
    const MAX_RESTARTS: u32 = 1;
    let start = Instant::now();
    let mut restarts = 0u32;

    loop {
        if start.elapsed() >= window {
            return WatchdogOutcome::Stable;
        }
        match child.try_wait() {
            Ok(Some(_status)) => {
                if restarts >= MAX_RESTARTS {
                    return WatchdogOutcome::CrashedRepeatedly;
                }
                restarts += 1;
                match respawn() {
                    Ok(new_child) => child = new_child,
                    Err(_) => return WatchdogOutcome::CrashedRepeatedly,
                }
            }
            Ok(None) => std::thread::sleep(POLL_INTERVAL),
            Err(_) => return WatchdogOutcome::CrashedRepeatedly,
        }
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
