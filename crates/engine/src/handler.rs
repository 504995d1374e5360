// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `CommandHandler` — the external collaborator boundary named in §4.7.
//! Real payload handlers (system actions, log collection) are out of
//! scope (§1); a console-execution stub and an unknown-kind fallback
//! ship in-tree, enough to exercise the executor's contract end-to-end.

use std::collections::HashMap;
use std::sync::Arc;

use warden_core::command::{CommandId, CommandOutcome, CommandRequest, CommandResult};

/// A handler's raw output before it is folded into a [`CommandResult`].
#[derive(Debug, Clone, Default)]
pub struct HandlerOutput {
    pub success: bool,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub exit_code: Option<i32>,
    pub error_message: Option<String>,
}

impl HandlerOutput {
    pub fn success(stdout: Option<String>, exit_code: Option<i32>) -> Self {
        Self { success: true, stdout, exit_code, ..Default::default() }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self { success: false, error_message: Some(message.into()), ..Default::default() }
    }

    pub(crate) fn into_result(self, command_id: CommandId, kind: String) -> CommandResult {
        if self.success {
            CommandResult {
                command_id,
                kind,
                success: true,
                stdout: self.stdout,
                stderr: self.stderr,
                exit_code: self.exit_code,
                error_kind: None,
                error_message: None,
            }
        } else {
            CommandResult {
                command_id,
                kind,
                success: false,
                stdout: self.stdout,
                stderr: self.stderr,
                exit_code: self.exit_code,
                error_kind: Some(CommandOutcome::ExecutionError),
                error_message: Some(
                    self.error_message.unwrap_or_else(|| "handler reported failure".into()),
                ),
            }
        }
    }
}

/// Selected by `CommandRequest::kind`; execution is bounded by the
/// executor's per-command timeout (§4.7).
#[async_trait::async_trait]
pub trait CommandHandler: Send + Sync {
    async fn run(&self, cmd: &CommandRequest) -> HandlerOutput;
}

/// Runs `payload.command` through the host shell. The stand-in payload
/// handler named in §4.7 — real system-action and log-collection
/// handlers are an external collaborator's responsibility.
pub struct ConsoleHandler;

#[async_trait::async_trait]
impl CommandHandler for ConsoleHandler {
    async fn run(&self, cmd: &CommandRequest) -> HandlerOutput {
        let Some(command) = cmd.payload.get("command").and_then(|v| v.as_str()) else {
            return HandlerOutput::failure("console command missing `payload.command`");
        };
        match tokio::process::Command::new("sh").arg("-c").arg(command).output().await {
            Ok(output) => HandlerOutput {
                success: output.status.success(),
                stdout: Some(String::from_utf8_lossy(&output.stdout).into_owned()),
                stderr: Some(String::from_utf8_lossy(&output.stderr).into_owned()),
                exit_code: output.status.code(),
                error_message: if output.status.success() {
                    None
                } else {
                    Some(format!("console command exited with {:?}", output.status.code()))
                },
            },
            Err(e) => HandlerOutput::failure(format!("failed to spawn shell: {e}")),
        }
    }
}

/// Fallback for any `kind` with no registered handler.
pub struct UnknownKindHandler;

#[async_trait::async_trait]
impl CommandHandler for UnknownKindHandler {
    async fn run(&self, cmd: &CommandRequest) -> HandlerOutput {
        HandlerOutput::failure(format!("no handler registered for command kind {:?}", cmd.kind))
    }
}

/// Maps a `CommandRequest::kind` to the handler that executes it.
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
    fallback: Arc<dyn CommandHandler>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self { handlers: HashMap::new(), fallback: Arc::new(UnknownKindHandler) }
    }

    /// A registry with the in-tree `console` handler already registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("console", Arc::new(ConsoleHandler));
        registry
    }

    pub fn register(&mut self, kind: impl Into<String>, handler: Arc<dyn CommandHandler>) {
        self.handlers.insert(kind.into(), handler);
    }

    pub fn resolve(&self, kind: &str) -> Arc<dyn CommandHandler> {
        self.handlers.get(kind).cloned().unwrap_or_else(|| self.fallback.clone())
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
