// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command request/result types handled by the Command Executor.

use serde::{Deserialize, Serialize};
use serde_json::Value;

crate::define_id! {
    /// Unique within the lifetime of the process (§3 invariant 4).
    pub struct CommandId("cmd-");
}

/// A directive received over the WebSocket transport's `command_execute`
/// event. `parameters` and `payload` are opaque structured documents; the
/// handler selected by `kind` downcasts them at its own boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandRequest {
    pub command_id: CommandId,
    pub kind: String,
    pub payload: Value,
    pub parameters: Value,
}

/// Why execution did not produce a normal success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum CommandOutcome {
    Timeout,
    ExecutionError,
    QueueFull,
    Cancelled,
}

crate::simple_display! {
    CommandOutcome {
        Timeout => "Timeout",
        ExecutionError => "ExecutionError",
        QueueFull => "QueueFull",
        Cancelled => "Cancelled",
    }
}

/// Whether a `CommandResult` represents a success or one of the synthetic
/// failure outcomes the executor itself produces (as opposed to a handler
/// reporting its own exit code).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandStatus {
    Success,
    Failure(CommandOutcome),
}

/// Executor output, delivered over WebSocket if live, else enqueued
/// offline. Exactly one is produced per accepted command (§3 invariant 4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResult {
    pub command_id: CommandId,
    pub kind: String,
    pub success: bool,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub exit_code: Option<i32>,
    pub error_kind: Option<CommandOutcome>,
    pub error_message: Option<String>,
}

impl CommandResult {
    pub fn success(command_id: CommandId, kind: impl Into<String>, stdout: Option<String>, exit_code: Option<i32>) -> Self {
        Self {
            command_id,
            kind: kind.into(),
            success: true,
            stdout,
            stderr: None,
            exit_code,
            error_kind: None,
            error_message: None,
        }
    }

    pub fn failure(
        command_id: CommandId,
        kind: impl Into<String>,
        outcome: CommandOutcome,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            command_id,
            kind: kind.into(),
            success: false,
            stdout: None,
            stderr: None,
            exit_code: None,
            error_kind: Some(outcome),
            error_message: Some(error_message.into()),
        }
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
