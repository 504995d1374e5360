// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! warden-daemon: composition root for `wardend`, the Warden runtime
//! orchestration kernel. Wires the Config Store, Token Vault, HTTP and
//! WebSocket Transports, Command Executor, Update Pipeline, and
//! Persistent Offline Queues behind the Orchestrator/State Machine
//! (§4.1), guarded by a single-instance lock and a supervisor host that
//! turns OS signals into cooperative shutdown.

pub mod control;
pub mod guard;
pub mod orchestrator;
pub mod status;
pub mod supervisor;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use warden_core::AgentError;
use warden_engine::{HandlerRegistry, UpdatePipeline};
use warden_storage::{config, paths, IdentityStore, OfflineQueue, TokenVault};
use warden_transport::HttpTransport;

use guard::{GuardError, InstanceGuard};
use orchestrator::{Orchestrator, OrchestratorError};
use status::NullStatusSampler;

/// Bound on how long `run` waits for the orchestrator to unwind after a
/// shutdown signal before giving up and reporting a timeout.
const SHUTDOWN_DEADLINE: Duration = Duration::from_secs(15);

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("another instance is already running: {0}")]
    AlreadyRunning(#[from] GuardError),
    #[error(transparent)]
    Agent(#[from] AgentError),
    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),
}

/// Loads configuration and the enrolled identity, wires every component,
/// then runs the orchestrator until it reaches a terminal state or the
/// supervisor observes a shutdown signal. `install_dir` and
/// `current_version` are forwarded to the Update Pipeline (§4.9).
pub async fn run(install_dir: PathBuf, current_version: String) -> Result<(), StartupError> {
    let _guard = InstanceGuard::acquire(&paths::pid_file())?;

    let static_config =
        config::load_static(&paths::config_path()).map_err(AgentError::from)?;

    let identity_store = IdentityStore::new(paths::runtime_identity_path());
    let identity = identity_store
        .load()
        .map_err(AgentError::from)?
        .ok_or_else(|| {
            AgentError::ConfigLoadFailed(
                "no enrolled identity found; run `warden configure` first".into(),
            )
        })?;

    let vault = TokenVault::new().map_err(AgentError::from)?;
    let http = Arc::new(
        HttpTransport::new(
            &static_config.server_base_url,
            identity.agent_id,
            static_config.http_request_timeout(),
        )
        .map_err(AgentError::from)?,
    );

    let queue_dir = paths::offline_queue_dir();
    let status_queue =
        OfflineQueue::open(&queue_dir, warden_core::QueueItemKind::StatusReports, &static_config.offline_queue)
            .map_err(AgentError::from)?;
    let result_queue =
        OfflineQueue::open(&queue_dir, warden_core::QueueItemKind::CommandResults, &static_config.offline_queue)
            .map_err(AgentError::from)?;
    let error_queue =
        OfflineQueue::open(&queue_dir, warden_core::QueueItemKind::ErrorReports, &static_config.offline_queue)
            .map_err(AgentError::from)?;

    let orchestrator = Arc::new(Orchestrator::new(
        static_config,
        identity_store,
        identity,
        vault,
        Arc::clone(&http),
        status_queue,
        result_queue,
        error_queue,
        Arc::new(HandlerRegistry::with_defaults()),
        UpdatePipeline::new(http),
        Arc::new(NullStatusSampler),
        current_version.clone(),
        install_dir,
    ));

    let token = orchestrator.cancellation();
    let handle = tokio::spawn({
        let orchestrator = Arc::clone(&orchestrator);
        async move { orchestrator.start().await }
    });

    tokio::spawn(control::serve(
        paths::control_socket(),
        Arc::clone(&orchestrator),
        current_version,
        Instant::now(),
        token.clone(),
    ));

    supervisor::run_until_stop_signal(token).await;

    match tokio::time::timeout(SHUTDOWN_DEADLINE, handle).await {
        Ok(Ok(result)) => result.map_err(StartupError::from),
        Ok(Err(join_err)) => {
            Err(StartupError::Agent(AgentError::UnhandledException(join_err.to_string())))
        }
        Err(_) => Err(StartupError::Orchestrator(OrchestratorError::ShutdownTimeout)),
    }
}
