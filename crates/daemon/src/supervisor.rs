// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Supervisor Host (§4.12): adapts the orchestrator to the OS service
//! manager's lifecycle signals. No business logic lives here — it only
//! waits for a stop signal and forwards it as cooperative cancellation.

use tokio_util::sync::CancellationToken;

/// Waits for SIGTERM (systemd `stop`) or Ctrl-C, then cancels `token`.
/// Returns once the cancellation has been requested.
pub async fn run_until_stop_signal(token: CancellationToken) {
    #[cfg(unix)]
    {
        let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            Ok(sig) => sig,
            Err(e) => {
                tracing::error!(%e, "supervisor: failed to install SIGTERM handler");
                token.cancelled().await;
                return;
            }
        };

        tokio::select! {
            _ = sigterm.recv() => {
                tracing::info!("supervisor: received SIGTERM, initiating shutdown");
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("supervisor: received Ctrl-C, initiating shutdown");
            }
            _ = token.cancelled() => {}
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    token.cancel();
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
