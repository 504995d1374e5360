// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command-line parameters (§4.9 step 6, §4.10 "Parameters", §6).

use std::path::PathBuf;

use clap::Parser;

/// Parameters the Update Pipeline hands to a freshly spawned updater
/// process. Mirrors `warden_core::UpdateParameters` field-for-field; kept
/// as a separate clap type since the pipeline constructs the struct
/// in-process while the updater only ever receives it as argv.
#[derive(Debug, Parser)]
#[command(name = "warden-updater", about = "Performs the in-place Warden agent update")]
pub struct UpdaterArgs {
    /// PID of the agent process being replaced.
    #[arg(long)]
    pub old_pid: u32,

    /// Path to the extracted new-version staging directory.
    #[arg(long)]
    pub new_agent_path: PathBuf,

    /// Path the agent is installed under; cleared and repopulated.
    #[arg(long)]
    pub current_install_dir: PathBuf,

    /// Directory the updater writes its own log file into.
    #[arg(long)]
    pub updater_log_dir: PathBuf,

    /// Version string of the agent being replaced, for the backup path.
    #[arg(long)]
    pub current_agent_version: String,
}

impl From<UpdaterArgs> for warden_core::UpdateParameters {
    fn from(args: UpdaterArgs) -> Self {
        warden_core::UpdateParameters {
            old_pid: args.old_pid,
            new_agent_path: args.new_agent_path,
            current_install_dir: args.current_install_dir,
            updater_log_dir: args.updater_log_dir,
            current_agent_version: args.current_agent_version,
        }
    }
}
