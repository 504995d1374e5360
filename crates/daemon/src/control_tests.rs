// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::net::UnixStream;
use warden_core::identity::{AgentId, RuntimeIdentity};
use warden_core::{EnrollmentToken, Location};
use warden_engine::{HandlerRegistry, UpdatePipeline};
use warden_storage::{IdentityStore, OfflineQueue, StaticConfig, TokenVault};
use warden_transport::HttpTransport;
use warden_wire::{read_message, write_message, LocalRequest, LocalResponse};

use super::*;
use crate::orchestrator::Orchestrator;
use crate::status::NullStatusSampler;

fn build_orchestrator(dir: &std::path::Path) -> Orchestrator {
    let config = StaticConfig::test_default();
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

#[tokio::test]
async fn ping_and_status_round_trip_over_the_socket() {
    let dir = tempfile::tempdir().expect("tempdir");
    let socket_path = dir.path().join("wardend.sock");
    let orchestrator = Arc::new(build_orchestrator(dir.path()));
    let token = CancellationToken::new();

    let serve_token = token.clone();
    let serve_path = socket_path.clone();
    let serve_orchestrator = Arc::clone(&orchestrator);
    let handle = tokio::spawn(async move {
        serve(serve_path, serve_orchestrator, "1.2.3".to_string(), Instant::now(), serve_token).await
    });

    wait_for_socket(&socket_path).await;

    let mut stream = UnixStream::connect(&socket_path).await.expect("connect");
    write_message(&mut stream, &LocalRequest::Ping).await.expect("write ping");
    let response: LocalResponse = read_message(&mut stream).await.expect("read pong");
    assert_eq!(response, LocalResponse::Pong);

    let mut stream = UnixStream::connect(&socket_path).await.expect("connect");
    write_message(&mut stream, &LocalRequest::Status).await.expect("write status");
    let response: LocalResponse = read_message(&mut stream).await.expect("read status");
    match response {
        LocalResponse::Status { agent_version, .. } => assert_eq!(agent_version, "1.2.3"),
        other => panic!("unexpected response: {other:?}"),
    }

    token.cancel();
    handle.await.expect("serve task");
}

#[tokio::test]
async fn shutdown_request_cancels_the_token() {
    let dir = tempfile::tempdir().expect("tempdir");
    let socket_path = dir.path().join("wardend.sock");
    let orchestrator = Arc::new(build_orchestrator(dir.path()));
    let token = CancellationToken::new();

    let serve_token = token.clone();
    let serve_path = socket_path.clone();
    let serve_orchestrator = Arc::clone(&orchestrator);
    let handle = tokio::spawn(async move {
        serve(serve_path, serve_orchestrator, "1.2.3".to_string(), Instant::now(), serve_token).await
    });

    wait_for_socket(&socket_path).await;

    let mut stream = UnixStream::connect(&socket_path).await.expect("connect");
    write_message(&mut stream, &LocalRequest::Shutdown { kill: false }).await.expect("write shutdown");
    let response: LocalResponse = read_message(&mut stream).await.expect("read shutdown ack");
    assert_eq!(response, LocalResponse::ShuttingDown);

    assert!(tokio::time::timeout(Duration::from_secs(1), handle).await.is_ok());
    assert!(token.is_cancelled());
}

async fn wait_for_socket(path: &std::path::Path) {
    for _ in 0..100 {
        if path.exists() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("socket {} never appeared", path.display());
}
