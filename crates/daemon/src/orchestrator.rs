// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orchestrator / State Machine (§4.1): owns the agent lifecycle. One
//! struct owns the main loop, every other component held as a dependency,
//! driving the authenticate/connect/steady-state/shutdown cycle.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use warden_core::identity::{AgentId, RuntimeIdentity};
use warden_core::queue_item::QueueItemKind;
use warden_core::state::{AgentState, TransitionLog};
use warden_core::{AgentError, UpdateDescriptor};
use warden_engine::{CommandExecutor, HandlerRegistry, PipelineParams, UpdatePipeline};
use warden_storage::{IdentityStore, OfflineQueue, StaticConfig, TokenVault};
use warden_transport::ws::{ConnectionEvent, ReconnectBackoff, WebSocketHandle};
use warden_transport::HttpTransport;
use warden_wire::{AgentEvent, HardwareInventory, IdentifyRequest, IdentifyResponse, ReportErrorRequest, ServerEvent};

use crate::status::StatusSampler;

const SHUTDOWN_DRAIN_DEADLINE: Duration = Duration::from_secs(10);
const STATUS_TIMER_FIRST_DELAY: Duration = Duration::from_secs(5);
const UPDATE_CHECK_FIRST_DELAY: Duration = Duration::from_secs(600);

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("shutdown did not complete within the deadline")]
    ShutdownTimeout,
    #[error(transparent)]
    Agent(#[from] AgentError),
}

/// What an attempted handshake settled on. Mirrors the connection attempt
/// policy in §4.1 steps 1-5.
enum ConnectOutcome {
    ConfigurationError(AgentError),
    Retry,
    Offline,
}

pub struct Orchestrator {
    agent_id: AgentId,
    ws_url: String,
    config: StaticConfig,
    identity_store: IdentityStore,
    identity: Mutex<RuntimeIdentity>,
    vault: TokenVault,
    http: Arc<HttpTransport>,
    status_queue: OfflineQueue,
    result_queue: OfflineQueue,
    error_queue: OfflineQueue,
    handlers: Arc<HandlerRegistry>,
    update_pipeline: UpdatePipeline,
    status_sampler: Arc<dyn StatusSampler>,
    state: Mutex<AgentState>,
    transitions: TransitionLog,
    backoff: Mutex<ReconnectBackoff>,
    failure_count: AtomicU32,
    cancel: CancellationToken,
    stopped: tokio::sync::Notify,
    current_version: String,
    install_dir: PathBuf,
}

impl Orchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: StaticConfig,
        identity_store: IdentityStore,
        identity: RuntimeIdentity,
        vault: TokenVault,
        http: Arc<HttpTransport>,
        status_queue: OfflineQueue,
        result_queue: OfflineQueue,
        error_queue: OfflineQueue,
        handlers: Arc<HandlerRegistry>,
        update_pipeline: UpdatePipeline,
        status_sampler: Arc<dyn StatusSampler>,
        current_version: String,
        install_dir: PathBuf,
    ) -> Self {
        let ws_url = derive_ws_url(&config.server_base_url);
        let backoff = ReconnectBackoff::new(
            Duration::from_secs(config.ws_reconnect_delay_initial_secs),
            Duration::from_secs(config.ws_reconnect_delay_max_secs),
            config.ws_reconnect_max_attempts,
        );
        Self {
            agent_id: identity.agent_id.clone(),
            ws_url,
            config,
            identity_store,
            identity: Mutex::new(identity),
            vault,
            http,
            status_queue,
            result_queue,
            error_queue,
            handlers,
            update_pipeline,
            status_sampler,
            state: Mutex::new(AgentState::Initializing),
            transitions: TransitionLog::new(),
            backoff: Mutex::new(backoff),
            failure_count: AtomicU32::new(0),
            cancel: CancellationToken::new(),
            stopped: tokio::sync::Notify::new(),
            current_version,
            install_dir,
        }
    }

    pub fn current_state(&self) -> AgentState {
        *self.state.lock()
    }

    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn transition(&self, to: AgentState) {
        let from = {
            let mut guard = self.state.lock();
            let from = *guard;
            *guard = to;
            from
        };
        if from != to {
            self.transitions.record(from, to, Instant::now());
            tracing::info!(from = %from, to = %to, "orchestrator: state transition");
        }
    }

    /// §4.1 `start()`: idempotent, blocks until a terminal state is
    /// reached or shutdown is requested.
    pub async fn start(self: &Arc<Self>) -> Result<(), OrchestratorError> {
        self.transition(AgentState::Authenticating);

        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            match self.attempt_connect().await {
                Ok((handle, events)) => {
                    self.reset_backoff();
                    self.transition(AgentState::Connected);
                    self.run_connected(handle, events).await;
                    if self.cancel.is_cancelled() {
                        break;
                    }
                    self.transition(AgentState::Disconnected);
                    self.transition(AgentState::Reconnecting);
                }
                Err(ConnectOutcome::ConfigurationError(e)) => {
                    self.transition(AgentState::ConfigurationError);
                    self.stopped.notify_waiters();
                    return Err(e.into());
                }
                Err(ConnectOutcome::Retry) => {
                    self.transition(AgentState::Reconnecting);
                }
                Err(ConnectOutcome::Offline) => {
                    self.transition(AgentState::Offline);
                }
            }

            if self.current_state().is_terminal() || self.cancel.is_cancelled() {
                break;
            }

            let delay = {
                let mut backoff = self.backoff.lock();
                backoff.next_delay().unwrap_or(Duration::from_secs(self.config.ws_reconnect_delay_max_secs))
            };
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = self.cancel.cancelled() => break,
            }
            if self.cancel.is_cancelled() {
                break;
            }
            self.transition(AgentState::Authenticating);
        }

        self.transition(AgentState::Stopping);
        self.stopped.notify_waiters();
        Ok(())
    }

    /// §4.1 `stop(deadline)`: cooperative shutdown via cancellation.
    pub async fn stop(&self, deadline: Duration) -> Result<(), OrchestratorError> {
        self.cancel.cancel();
        if self.current_state().is_terminal() {
            return Ok(());
        }
        match tokio::time::timeout(deadline, self.stopped.notified()).await {
            Ok(()) => Ok(()),
            Err(_) => Err(OrchestratorError::ShutdownTimeout),
        }
    }

    fn reset_backoff(&self) {
        self.failure_count.store(0, Ordering::SeqCst);
        self.backoff.lock().reset();
    }

    fn record_connect_failure(&self) -> ConnectOutcome {
        let count = self.failure_count.fetch_add(1, Ordering::SeqCst) + 1;
        if count >= self.config.network_retry_max_attempts {
            ConnectOutcome::Offline
        } else {
            ConnectOutcome::Retry
        }
    }

    /// §4.1 Connection attempt policy, steps 1-5.
    async fn attempt_connect(
        &self,
    ) -> Result<(WebSocketHandle, mpsc::Receiver<ConnectionEvent>), ConnectOutcome> {
        let mut refreshed_once = false;

        loop {
            let token = match self.decrypt_token() {
                Ok(token) => token,
                Err(e) => return Err(ConnectOutcome::ConfigurationError(e)),
            };

            let connected = warden_transport::connect(&self.ws_url, &self.agent_id, &token).await;
            let (handle, mut events) = match connected {
                Ok(pair) => pair,
                Err(e) => {
                    tracing::warn!(error = %e, "orchestrator: websocket connect failed");
                    return Err(self.record_connect_failure());
                }
            };

            match events.recv().await {
                Some(ConnectionEvent::Server(ServerEvent::AuthSuccess)) => {
                    self.http.set_token(Some(token.to_string()));
                    return Ok((handle, events));
                }
                Some(ConnectionEvent::Server(ServerEvent::AuthFailed)) | None => {
                    handle.close().await;
                    if refreshed_once {
                        return Err(self.record_connect_failure());
                    }
                    refreshed_once = true;
                    if let Err(e) = self.refresh_token().await {
                        tracing::warn!(error = %e, "orchestrator: token refresh failed");
                        return Err(self.record_connect_failure());
                    }
                }
                Some(_) => {
                    handle.close().await;
                    return Err(self.record_connect_failure());
                }
            }
        }
    }

    fn decrypt_token(&self) -> Result<zeroize::Zeroizing<String>, AgentError> {
        let identity = self.identity.lock().clone();
        self.vault.decrypt(&identity.encrypted_token).map_err(Into::into)
    }

    /// §4.1 step 3: identify/refresh to obtain a new token, persisted.
    async fn refresh_token(&self) -> Result<(), AgentError> {
        let identity = self.identity.lock().clone();
        let request = IdentifyRequest {
            agent_id: identity.agent_id.clone(),
            location: identity.location.clone(),
            force_renew: true,
        };
        let response = self.http.identify(&request).await?;
        match response {
            IdentifyResponse::Success { token: Some(plaintext) } => {
                let ciphertext = self.vault.encrypt(&plaintext)?;
                let mut guard = self.identity.lock();
                guard.encrypted_token = ciphertext;
                let updated = guard.clone();
                drop(guard);
                self.identity_store.save(&updated)?;
                Ok(())
            }
            IdentifyResponse::Success { token: None } => Ok(()),
            IdentifyResponse::MfaRequired => {
                Err(AgentError::WebSocketAuthFailed("mfa required during refresh".into()))
            }
            IdentifyResponse::PositionError { message } | IdentifyResponse::Error { message } => {
                Err(AgentError::WebSocketAuthFailed(message))
            }
        }
    }

    /// §4.1 steady-state on `CONNECTED`.
    async fn run_connected(
        self: &Arc<Self>,
        handle: WebSocketHandle,
        mut events: mpsc::Receiver<ConnectionEvent>,
    ) {
        let handle = Arc::new(handle);

        self.submit_hardware_inventory_best_effort().await;
        self.drain_offline_queues(&handle).await;
        self.status_sampler.initialize().await;

        let (results_tx, mut results_rx) = mpsc::channel(64);
        let executor = CommandExecutor::spawn(
            self.config.command_queue_max_size,
            self.config.command_max_parallel,
            self.config.command_default_timeout(),
            Arc::clone(&self.handlers),
            results_tx,
        );

        let mut status_timer = tokio::time::interval_at(
            tokio::time::Instant::now() + STATUS_TIMER_FIRST_DELAY,
            Duration::from_secs(self.config.status_report_interval_secs.max(1)),
        );
        let mut token_timer = tokio::time::interval_at(
            tokio::time::Instant::now()
                + Duration::from_secs(self.config.token_refresh_interval_secs / 2),
            Duration::from_secs(self.config.token_refresh_interval_secs.max(1)),
        );
        let mut update_timer = tokio::time::interval_at(
            tokio::time::Instant::now() + UPDATE_CHECK_FIRST_DELAY,
            Duration::from_secs(self.config.auto_update_interval_secs.max(1)),
        );

        loop {
            tokio::select! {
                event = events.recv() => {
                    match event {
                        Some(ConnectionEvent::Server(server_event)) => {
                            self.dispatch_server_event(server_event, &executor, &handle).await;
                        }
                        Some(ConnectionEvent::Disconnected) | None => break,
                    }
                }
                Some(result) = results_rx.recv() => {
                    self.deliver_command_result(&handle, result).await;
                }
                _ = status_timer.tick() => {
                    self.send_status_update(&handle).await;
                }
                _ = token_timer.tick() => {
                    if let Err(e) = self.refresh_token().await {
                        tracing::warn!(error = %e, "orchestrator: proactive token refresh failed");
                        self.report_error(e.kind(), e.to_string()).await;
                    }
                }
                _ = update_timer.tick(), if self.config.auto_update_enabled => {
                    if let Some(descriptor) = self.check_for_update().await {
                        self.run_update(descriptor).await;
                        break;
                    }
                }
                _ = self.cancel.cancelled() => break,
            }
        }

        executor.shutdown(SHUTDOWN_DRAIN_DEADLINE).await;
        if let Ok(handle) = Arc::try_unwrap(handle) {
            handle.close().await;
        }
    }

    async fn dispatch_server_event(
        &self,
        event: ServerEvent,
        executor: &CommandExecutor,
        _handle: &Arc<WebSocketHandle>,
    ) {
        match event {
            ServerEvent::CommandExecute(cmd) => executor.submit(cmd),
            ServerEvent::NewVersionAvailable(_descriptor) => {
                tracing::info!("orchestrator: update notification received mid-steady-state");
            }
            ServerEvent::AuthSuccess | ServerEvent::AuthFailed => {
                tracing::debug!("orchestrator: unexpected auth event after handshake");
            }
        }
    }

    async fn deliver_command_result(
        &self,
        handle: &Arc<WebSocketHandle>,
        result: warden_core::command::CommandResult,
    ) {
        let event = AgentEvent::CommandResult {
            command_id: result.command_id,
            kind: result.kind,
            success: result.success,
            stdout: result.stdout,
            stderr: result.stderr,
            exit_code: result.exit_code,
            error_kind: result.error_kind,
            error_message: result.error_message,
        };
        if !handle.emit(event.clone()).await {
            self.enqueue_offline(QueueItemKind::CommandResults, &self.result_queue, &event);
        }
    }

    async fn send_status_update(&self, handle: &Arc<WebSocketHandle>) {
        let sample = self.status_sampler.sample().await;
        let event = AgentEvent::StatusUpdate(warden_wire::StatusUpdate {
            cpu_pct: sample.cpu_pct,
            ram_pct: sample.ram_pct,
            disk_pct: sample.disk_pct,
        });
        if !handle.emit(event.clone()).await {
            self.enqueue_offline(QueueItemKind::StatusReports, &self.status_queue, &event);
        }
    }

    async fn submit_hardware_inventory_best_effort(&self) {
        let inventory = HardwareInventory {
            os: std::env::consts::OS.to_string(),
            cpu: "unknown".to_string(),
            gpu: None,
            total_ram_bytes: 0,
            total_disk_bytes: 0,
        };
        if let Err(e) = self.http.submit_hardware_inventory(&inventory).await {
            tracing::warn!(error = %e, "orchestrator: hardware inventory submission failed");
            let err: AgentError = e.into();
            self.report_error(err.kind(), err.to_string()).await;
        }
    }

    async fn check_for_update(&self) -> Option<UpdateDescriptor> {
        match self.http.check_update(&self.current_version).await {
            Ok(Some(descriptor)) => Some(descriptor),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "orchestrator: update check failed");
                let err: AgentError = e.into();
                self.report_error(err.kind(), err.to_string()).await;
                None
            }
        }
    }

    /// §4.9 Update Pipeline invocation. On success the process begins
    /// graceful shutdown (the updater takes over); on failure the caller
    /// resumes the steady-state loop.
    async fn run_update(&self, descriptor: UpdateDescriptor) {
        self.transition(AgentState::Updating);
        let (events_tx, mut events_rx) = mpsc::channel(8);
        tokio::spawn(async move { while events_rx.recv().await.is_some() {} });

        let params = PipelineParams {
            current_pid: std::process::id(),
            current_install_dir: self.install_dir.clone(),
            current_agent_version: self.current_version.clone(),
        };
        match self.update_pipeline.run(&descriptor, params, &events_tx).await {
            Ok(()) => {
                tracing::info!("orchestrator: updater launched, beginning shutdown");
                self.cancel.cancel();
            }
            Err(e) => {
                tracing::warn!(error = %e, "orchestrator: update pipeline failed");
                let err: AgentError = e.into();
                self.report_error(err.kind(), err.to_string()).await;
                self.transition(AgentState::Connected);
            }
        }
    }

    /// §4.6: drains status reports, command results, then error reports,
    /// oldest first, aborting a kind's drain on the first send failure.
    async fn drain_offline_queues(&self, handle: &Arc<WebSocketHandle>) {
        self.drain_one(handle, &self.status_queue).await;
        self.drain_one(handle, &self.result_queue).await;
        self.drain_one(handle, &self.error_queue).await;
    }

    async fn drain_one(&self, handle: &Arc<WebSocketHandle>, queue: &OfflineQueue) {
        let items = match queue.list() {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(error = %e, "orchestrator: failed to list offline queue");
                return;
            }
        };
        for (path, mut item) in items {
            let Ok(event) = serde_json::from_value::<AgentEvent>(item.payload.clone()) else {
                let _ = queue.remove(&path);
                continue;
            };
            if handle.emit(event).await {
                let _ = queue.remove(&path);
            } else {
                let _ = queue.mark_retry(&path, &mut item);
                break;
            }
        }
    }

    fn enqueue_offline(&self, kind: QueueItemKind, queue: &OfflineQueue, event: &AgentEvent) {
        let Ok(payload) = serde_json::to_value(event) else { return };
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        if let Err(e) = queue.enqueue(payload, now) {
            tracing::warn!(error = %e, kind = %kind, "orchestrator: failed to persist offline item");
        }
    }

    /// Best-effort error report, enqueued offline when the transport
    /// fails to accept it (§7 propagation policy).
    async fn report_error(&self, kind: &str, message: String) {
        let request = ReportErrorRequest {
            error_kind: kind.to_string(),
            message: message.clone(),
            details: serde_json::Value::Null,
            timestamp: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or_default(),
        };
        if self.http.report_error(&request).await.is_err() {
            let payload = serde_json::json!({
                "error_kind": kind,
                "message": message,
            });
            let now = request.timestamp;
            let _ = self.error_queue.enqueue(payload, now);
        }
    }
}

/// `https://host` -> `wss://host/ws`, `http://host` -> `ws://host/ws`.
fn derive_ws_url(server_base_url: &str) -> String {
    if let Some(rest) = server_base_url.strip_prefix("https://") {
        format!("wss://{rest}/ws")
    } else if let Some(rest) = server_base_url.strip_prefix("http://") {
        format!("ws://{rest}/ws")
    } else {
        format!("wss://{server_base_url}/ws")
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
