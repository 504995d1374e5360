// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Entry point: parse argv, set up the updater's own log file (it runs
//! after the old agent has stopped logging), then hand off to the state
//! machine in `lib.rs`.

use clap::Parser;
use tracing_subscriber::EnvFilter;
use warden_updater::args::UpdaterArgs;
use warden_updater::exit::UpdaterExit;

fn main() {
    let args = match UpdaterArgs::try_parse() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(UpdaterExit::InvalidArguments.code());
        }
    };

    if let Err(e) = std::fs::create_dir_all(&args.updater_log_dir) {
        eprintln!("warden-updater: failed to create log directory: {e}");
        std::process::exit(UpdaterExit::General.code());
    }
    let file_appender = tracing_appender::rolling::daily(&args.updater_log_dir, "warden-updater.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .json()
        .init();

    tracing::info!(
        old_pid = args.old_pid,
        current_agent_version = %args.current_agent_version,
        "warden-updater: starting"
    );

    let exit = warden_updater::run(args.into());
    tracing::info!(code = exit.code(), "warden-updater: exiting");
    std::process::exit(exit.code());
}
