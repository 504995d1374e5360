// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Local control listener: the Unix socket the `warden` CLI dials to
//! check liveness, read current state, and request shutdown. Thin by
//! design — one socket, three requests.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio::net::{UnixListener, UnixStream};
use tokio_util::sync::CancellationToken;
use warden_wire::{read_message, write_message, LocalRequest, LocalResponse};

use crate::orchestrator::Orchestrator;

/// Binds the control socket, removing a stale one left behind by an
/// unclean shutdown, and serves connections until `token` is cancelled.
pub async fn serve(
    socket_path: PathBuf,
    orchestrator: Arc<Orchestrator>,
    agent_version: String,
    start_time: Instant,
    token: CancellationToken,
) {
    if let Some(parent) = socket_path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            tracing::error!(%e, path = %parent.display(), "control: failed to create socket directory");
            return;
        }
    }
    remove_stale_socket(&socket_path);

    let listener = match UnixListener::bind(&socket_path) {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%e, path = %socket_path.display(), "control: failed to bind socket");
            return;
        }
    };

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, _)) => {
                        let orchestrator = Arc::clone(&orchestrator);
                        let agent_version = agent_version.clone();
                        let token = token.clone();
                        tokio::spawn(async move {
                            if let Err(e) =
                                handle_connection(stream, &orchestrator, &agent_version, start_time, &token).await
                            {
                                tracing::debug!(%e, "control: connection ended with an error");
                            }
                        });
                    }
                    Err(e) => tracing::warn!(%e, "control: accept error"),
                }
            }
            _ = token.cancelled() => break,
        }
    }

    let _ = std::fs::remove_file(&socket_path);
}

async fn handle_connection(
    mut stream: UnixStream,
    orchestrator: &Orchestrator,
    agent_version: &str,
    start_time: Instant,
    token: &CancellationToken,
) -> Result<(), warden_wire::ProtocolError> {
    let request: LocalRequest = read_message(&mut stream).await?;
    let response = match request {
        LocalRequest::Ping => LocalResponse::Pong,
        LocalRequest::Status => LocalResponse::Status {
            state: orchestrator.current_state(),
            uptime_secs: start_time.elapsed().as_secs(),
            agent_version: agent_version.to_string(),
        },
        LocalRequest::Shutdown { kill } => {
            if kill {
                write_message(&mut stream, &LocalResponse::ShuttingDown).await?;
                std::process::exit(0);
            }
            token.cancel();
            LocalResponse::ShuttingDown
        }
    };
    write_message(&mut stream, &response).await
}

fn remove_stale_socket(path: &Path) {
    if path.exists() {
        let _ = std::fs::remove_file(path);
    }
}

#[cfg(test)]
#[path = "control_tests.rs"]
mod tests;
