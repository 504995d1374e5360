// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The small local control protocol between `warden` (CLI) and `wardend`
//! (daemon), carried over the framing in [`crate::framing`]. This is
//! intentionally thin — the agent has no fleet-inventory or job-query
//! surface; the CLI only needs to check liveness and request shutdown.

use serde::{Deserialize, Serialize};
use warden_core::AgentState;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum LocalRequest {
    Ping,
    Status,
    Shutdown { kill: bool },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum LocalResponse {
    Pong,
    Status {
        state: AgentState,
        uptime_secs: u64,
        agent_version: String,
    },
    ShuttingDown,
    Error {
        message: String,
    },
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
