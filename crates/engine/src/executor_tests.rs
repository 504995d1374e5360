// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::json;
use tokio::sync::mpsc;
use warden_core::command::CommandId;

use super::*;
use crate::handler::{CommandHandler, HandlerOutput, HandlerRegistry};

struct SleepyHandler {
    delay: Duration,
    concurrent: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl CommandHandler for SleepyHandler {
    async fn run(&self, _cmd: &CommandRequest) -> HandlerOutput {
        let now = self.concurrent.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.concurrent.fetch_sub(1, Ordering::SeqCst);
        HandlerOutput::success(None, Some(0))
    }
}

fn request(kind: &str) -> CommandRequest {
    CommandRequest { command_id: CommandId::new(), kind: kind.into(), payload: json!({}), parameters: json!({}) }
}

#[tokio::test]
async fn overflow_drops_oldest_and_emits_queue_full() {
    let (tx, mut rx) = mpsc::channel(16);
    let handlers = Arc::new(HandlerRegistry::with_defaults());
    let executor = CommandExecutor::spawn(1, 1, Duration::from_secs(5), handlers, tx);

    let first = request("console");
    let first_id = first.command_id;
    let second = request("console");
    executor.submit(first);
    executor.submit(second);

    let result = rx.recv().await.unwrap();
    assert_eq!(result.command_id, first_id);
    assert_eq!(result.error_kind, Some(CommandOutcome::QueueFull));

    executor.shutdown(Duration::from_secs(1)).await;
}

#[tokio::test]
async fn parallelism_is_bounded_by_max_parallel() {
    let (tx, mut rx) = mpsc::channel(16);
    let concurrent = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let mut handlers = HandlerRegistry::new();
    handlers.register(
        "sleepy",
        Arc::new(SleepyHandler {
            delay: Duration::from_millis(150),
            concurrent: concurrent.clone(),
            peak: peak.clone(),
        }),
    );
    let executor = CommandExecutor::spawn(8, 2, Duration::from_secs(5), Arc::new(handlers), tx);

    for _ in 0..4 {
        executor.submit(request("sleepy"));
    }
    for _ in 0..4 {
        rx.recv().await.unwrap();
    }
    assert!(peak.load(Ordering::SeqCst) <= 2);

    executor.shutdown(Duration::from_secs(1)).await;
}

#[tokio::test]
async fn handler_exceeding_timeout_yields_timeout_result() {
    let (tx, mut rx) = mpsc::channel(16);
    let mut handlers = HandlerRegistry::new();
    handlers.register(
        "sleepy",
        Arc::new(SleepyHandler {
            delay: Duration::from_millis(300),
            concurrent: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
        }),
    );
    let executor =
        CommandExecutor::spawn(8, 4, Duration::from_millis(50), Arc::new(handlers), tx);

    executor.submit(request("sleepy"));
    let result = rx.recv().await.unwrap();
    assert!(!result.success);
    assert_eq!(result.error_kind, Some(CommandOutcome::Timeout));

    executor.shutdown(Duration::from_secs(1)).await;
}

#[tokio::test]
async fn shutdown_discards_unstarted_commands_with_cancelled() {
    let (tx, mut rx) = mpsc::channel(16);
    let mut handlers = HandlerRegistry::new();
    handlers.register(
        "sleepy",
        Arc::new(SleepyHandler {
            delay: Duration::from_millis(500),
            concurrent: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
        }),
    );
    let executor = CommandExecutor::spawn(8, 1, Duration::from_secs(5), Arc::new(handlers), tx);

    // Occupies the single parallel slot so the second command never starts.
    executor.submit(request("sleepy"));
    tokio::time::sleep(Duration::from_millis(20)).await;
    let queued = request("sleepy");
    let queued_id = queued.command_id;
    executor.submit(queued);

    executor.shutdown(Duration::from_millis(50)).await;

    let mut saw_cancelled = false;
    while let Ok(result) = rx.try_recv() {
        if result.command_id == queued_id {
            assert_eq!(result.error_kind, Some(CommandOutcome::Cancelled));
            saw_cancelled = true;
        }
    }
    assert!(saw_cancelled);
}
