// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `warden debug` — runs the orchestrator in the foreground with logs on
//! the console instead of the rolling file sink `wardend` uses as a
//! service, so an operator can watch it connect and react live.

use tracing_subscriber::EnvFilter;

use crate::exit_error::{ExitError, EXIT_GENERAL_ERROR};

const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

pub async fn debug() -> Result<(), ExitError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let install_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| std::path::PathBuf::from("."));

    warden_daemon::run(install_dir, CURRENT_VERSION.to_string())
        .await
        .map_err(|e| ExitError::new(EXIT_GENERAL_ERROR, format!("{e}")))
}
