// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Entry point for `wardend`: sets up logging to the agent's state
//! directory, then hands off to the composition root in `lib.rs`.

use tracing_subscriber::EnvFilter;
use warden_storage::paths;

const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    let logs_dir = paths::logs_dir();
    if let Err(e) = std::fs::create_dir_all(&logs_dir) {
        eprintln!("wardend: failed to create log directory {}: {e}", logs_dir.display());
        std::process::exit(1);
    }
    let file_appender = tracing_appender::rolling::daily(&logs_dir, "wardend.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .json()
        .init();

    let install_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| std::path::PathBuf::from("."));

    tracing::info!(version = CURRENT_VERSION, "wardend: starting");

    let exit_code = match warden_daemon::run(install_dir, CURRENT_VERSION.to_string()).await {
        Ok(()) => {
            tracing::info!("wardend: stopped cleanly");
            0
        }
        Err(e) => {
            tracing::error!(error = %e, "wardend: exiting on error");
            1
        }
    };
    std::process::exit(exit_code);
}
