// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Types shared by the Update Pipeline and the out-of-process Updater.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A proposed new version, received from HTTP's `check_update` or the
/// WebSocket's `new_version_available` event. Discarded once the pipeline
/// completes or fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateDescriptor {
    pub version: String,
    pub download_url: String,
    pub sha256: String,
    pub notes: Option<String>,
}

/// Input handed to the Updater process. Created by the Update Pipeline;
/// consumed by the Updater; destroyed on Updater exit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateParameters {
    pub old_pid: u32,
    pub new_agent_path: PathBuf,
    pub current_install_dir: PathBuf,
    pub updater_log_dir: PathBuf,
    pub current_agent_version: String,
}

/// Reason an update attempt did not reach `update_success`, carried in the
/// `update_status` wire event's `reason` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateFailureReason {
    ChecksumMismatch,
    DownloadFailed,
    ExtractionFailed,
    ServiceStartFailed,
    WatchdogTriggeredRollback,
}

/// Outcome of a single update attempt, as reported via `update_status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum UpdateOutcome {
    Started,
    Downloaded,
    UpdaterLaunched,
    Success { version: String },
    Failed { reason: UpdateFailureReason },
}

#[cfg(test)]
#[path = "update_tests.rs"]
mod tests;
