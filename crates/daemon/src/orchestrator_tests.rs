// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use warden_core::identity::{AgentId, RuntimeIdentity};
use warden_core::{EnrollmentToken, Location};
use warden_engine::{HandlerRegistry, UpdatePipeline};
use warden_storage::{IdentityStore, OfflineQueue, StaticConfig, TokenVault};
use warden_transport::HttpTransport;

use super::*;
use crate::status::NullStatusSampler;

fn build_orchestrator(dir: &std::path::Path, max_attempts: u32) -> Orchestrator {
    let mut config = StaticConfig::test_default();
    config.network_retry_max_attempts = max_attempts;

    let vault = TokenVault::with_fixed_key([7u8; 32]);
    let agent_id = AgentId::new();
    let identity = RuntimeIdentity::new(
        agent_id,
        Location::default(),
        EnrollmentToken::new("placeholder-ciphertext"),
    );
    let identity_store = IdentityStore::new(dir.join("identity"));
    let http = Arc::new(
        HttpTransport::new("https://control.example.test", agent_id, config.http_request_timeout())
            .expect("http transport"),
    );
    let status_queue =
        OfflineQueue::open(dir, warden_core::queue_item::QueueItemKind::StatusReports, &config.offline_queue)
            .expect("status queue");
    let result_queue =
        OfflineQueue::open(dir, warden_core::queue_item::QueueItemKind::CommandResults, &config.offline_queue)
            .expect("result queue");
    let error_queue =
        OfflineQueue::open(dir, warden_core::queue_item::QueueItemKind::ErrorReports, &config.offline_queue)
            .expect("error queue");

    Orchestrator::new(
        config,
        identity_store,
        identity,
        vault,
        http,
        status_queue,
        result_queue,
        error_queue,
        Arc::new(HandlerRegistry::new()),
        UpdatePipeline::new(Arc::new(
            HttpTransport::new("https://control.example.test", agent_id, Duration::from_secs(5))
                .expect("update pipeline http transport"),
        )),
        Arc::new(NullStatusSampler),
        "1.0.0".to_string(),
        dir.join("install"),
    )
}

#[test]
fn derive_ws_url_rewrites_https_and_http_schemes() {
    assert_eq!(derive_ws_url("https://control.example.test"), "wss://control.example.test/ws");
    assert_eq!(derive_ws_url("http://control.example.test"), "ws://control.example.test/ws");
    assert_eq!(derive_ws_url("control.example.test"), "wss://control.example.test/ws");
}

#[test]
fn record_connect_failure_retries_then_goes_offline_at_the_configured_max() {
    let dir = tempfile::tempdir().expect("tempdir");
    let orchestrator = build_orchestrator(dir.path(), 2);

    assert!(matches!(orchestrator.record_connect_failure(), ConnectOutcome::Retry));
    assert!(matches!(orchestrator.record_connect_failure(), ConnectOutcome::Offline));
}

#[test]
fn reset_backoff_clears_the_failure_counter() {
    let dir = tempfile::tempdir().expect("tempdir");
    let orchestrator = build_orchestrator(dir.path(), 1);

    assert!(matches!(orchestrator.record_connect_failure(), ConnectOutcome::Offline));
    orchestrator.reset_backoff();
    assert!(matches!(orchestrator.record_connect_failure(), ConnectOutcome::Retry));
}

#[test]
fn transition_updates_current_state_and_appends_to_the_log() {
    let dir = tempfile::tempdir().expect("tempdir");
    let orchestrator = build_orchestrator(dir.path(), 5);

    assert_eq!(orchestrator.current_state(), AgentState::Initializing);
    orchestrator.transition(AgentState::Authenticating);
    orchestrator.transition(AgentState::Connected);

    assert_eq!(orchestrator.current_state(), AgentState::Connected);
    let log = orchestrator.transitions.snapshot();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].from, AgentState::Initializing);
    assert_eq!(log[0].to, AgentState::Authenticating);
    assert_eq!(log[1].to, AgentState::Connected);
}

#[test]
fn transition_to_the_same_state_is_not_logged() {
    let dir = tempfile::tempdir().expect("tempdir");
    let orchestrator = build_orchestrator(dir.path(), 5);

    orchestrator.transition(AgentState::Initializing);
    assert!(orchestrator.transitions.snapshot().is_empty());
}

#[tokio::test]
async fn stop_returns_immediately_once_already_terminal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let orchestrator = build_orchestrator(dir.path(), 5);
    orchestrator.transition(AgentState::Stopping);

    let result = orchestrator.stop(Duration::from_millis(50)).await;
    assert!(result.is_ok());
}
