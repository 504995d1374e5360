// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command Executor (§4.7): bounded intake, bounded parallelism, a
//! timeout per accepted command — `tokio::sync::Semaphore` for the
//! parallelism gate, one spawned task per accepted command.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{mpsc, Notify, Semaphore};
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;

use warden_core::command::{CommandOutcome, CommandRequest, CommandResult};

use crate::handler::HandlerRegistry;

/// Owns the intake queue and the parallelism gate; `submit` and
/// `shutdown` are the only two calls made from outside the worker task.
pub struct CommandExecutor {
    queue: Arc<Mutex<VecDeque<CommandRequest>>>,
    max_size: usize,
    notify: Arc<Notify>,
    cancel: CancellationToken,
    results_tx: mpsc::Sender<CommandResult>,
    worker: JoinHandle<()>,
}

impl CommandExecutor {
    /// Spawns the worker task and returns a handle. `results_tx` carries
    /// every produced [`CommandResult`]; the caller (orchestrator) decides
    /// whether to send it live over WebSocket or enqueue it offline.
    pub fn spawn(
        max_size: usize,
        max_parallel: usize,
        default_timeout: Duration,
        handlers: Arc<HandlerRegistry>,
        results_tx: mpsc::Sender<CommandResult>,
    ) -> Self {
        let queue: Arc<Mutex<VecDeque<CommandRequest>>> = Arc::new(Mutex::new(VecDeque::new()));
        let notify = Arc::new(Notify::new());
        let cancel = CancellationToken::new();
        let semaphore = Arc::new(Semaphore::new(max_parallel.max(1)));

        let worker = tokio::spawn(run_worker(
            queue.clone(),
            notify.clone(),
            cancel.clone(),
            semaphore,
            default_timeout,
            handlers,
            results_tx.clone(),
        ));

        Self { queue, max_size, notify, cancel, results_tx, worker }
    }

    /// Enqueues `cmd`. When the intake queue is already at its bound, the
    /// oldest pending command is discarded and a synthetic `QueueFull`
    /// result is emitted for it (§4.7, §8 boundary behaviour).
    pub fn submit(&self, cmd: CommandRequest) {
        let dropped = {
            let mut queue = self.queue.lock();
            let dropped = if queue.len() >= self.max_size { queue.pop_front() } else { None };
            queue.push_back(cmd);
            dropped
        };
        if let Some(old) = dropped {
            tracing::warn!(command_id = %old.command_id, "executor: intake queue full, dropping oldest");
            let result = CommandResult::failure(
                old.command_id,
                old.kind,
                CommandOutcome::QueueFull,
                "intake queue full, oldest command discarded",
            );
            let _ = self.results_tx.try_send(result);
        }
        self.notify.notify_one();
    }

    /// Cooperative shutdown (§4.7 "Shutdown"): unstarted commands are
    /// discarded with a `Cancelled` result; waits up to `deadline` for
    /// in-flight handlers before returning regardless of completion.
    pub async fn shutdown(self, deadline: Duration) {
        self.cancel.cancel();
        self.notify.notify_waiters();
        if tokio::time::timeout(deadline, self.worker).await.is_err() {
            tracing::warn!("executor: shutdown deadline elapsed with handlers still running");
        }
    }
}

async fn run_worker(
    queue: Arc<Mutex<VecDeque<CommandRequest>>>,
    notify: Arc<Notify>,
    cancel: CancellationToken,
    semaphore: Arc<Semaphore>,
    default_timeout: Duration,
    handlers: Arc<HandlerRegistry>,
    results_tx: mpsc::Sender<CommandResult>,
) {
    let mut tasks: JoinSet<()> = JoinSet::new();

    'accept: loop {
        let next = queue.lock().pop_front();
        let Some(cmd) = next else {
            tokio::select! {
                _ = notify.notified() => continue 'accept,
                _ = cancel.cancelled() => break 'accept,
                Some(_) = tasks.join_next(), if !tasks.is_empty() => continue 'accept,
            }
        };

        let permit = tokio::select! {
            permit = semaphore.clone().acquire_owned() => permit,
            _ = cancel.cancelled() => {
                queue.lock().push_front(cmd);
                break 'accept;
            }
        };
        let Ok(permit) = permit else { break 'accept };

        let handler = handlers.resolve(&cmd.kind);
        let command_id = cmd.command_id;
        let kind = cmd.kind.clone();
        let results_tx = results_tx.clone();
        tasks.spawn(async move {
            let _permit = permit;
            let result = match tokio::time::timeout(default_timeout, handler.run(&cmd)).await {
                Ok(output) => output.into_result(command_id, kind),
                Err(_) => {
                    tracing::warn!(%command_id, "executor: command timed out");
                    CommandResult::failure(command_id, kind, CommandOutcome::Timeout, "command execution timed out")
                }
            };
            let _ = results_tx.send(result).await;
        });
    }

    let remaining: Vec<_> = queue.lock().drain(..).collect();
    for cmd in remaining {
        let result = CommandResult::failure(
            cmd.command_id,
            cmd.kind,
            CommandOutcome::Cancelled,
            "executor shutting down",
        );
        let _ = results_tx.try_send(result);
    }
    while tasks.join_next().await.is_some() {}
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
