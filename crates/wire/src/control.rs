// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! DTOs for the control-plane wire protocol: HTTP request/response bodies
//! and the WebSocket duplex session's typed events (§6).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use warden_core::{AgentId, CommandOutcome, CommandRequest, Location, UpdateDescriptor};

/// `identify` / `refresh` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyRequest {
    pub agent_id: AgentId,
    pub location: Location,
    pub force_renew: bool,
}

/// `identify` / `refresh` response — exactly one of the four shapes named
/// in §4.4/§6.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IdentifyResponse {
    Success {
        #[serde(skip_serializing_if = "Option::is_none")]
        token: Option<String>,
    },
    MfaRequired,
    PositionError {
        message: String,
    },
    Error {
        message: String,
    },
}

/// `verify_mfa` request/response pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyMfaRequest {
    pub agent_id: AgentId,
    pub mfa_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VerifyMfaResponse {
    Success { token: String },
    Error { message: String },
}

/// `submit_hardware_inventory` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HardwareInventory {
    pub os: String,
    pub cpu: String,
    pub gpu: Option<String>,
    pub total_ram_bytes: u64,
    pub total_disk_bytes: u64,
}

/// `check_update` response — absent (204) when there is no newer version.
pub type CheckUpdateResponse = Option<UpdateDescriptor>;

/// `report_error` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportErrorRequest {
    pub error_kind: String,
    pub message: String,
    #[serde(default)]
    pub details: Value,
    pub timestamp: u64,
}

/// Outbound `status_update` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub cpu_pct: Option<f32>,
    pub ram_pct: Option<f32>,
    pub disk_pct: Option<f32>,
}

/// Messages the server may push down the duplex session (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ServerEvent {
    AuthSuccess,
    AuthFailed,
    CommandExecute(CommandRequest),
    NewVersionAvailable(UpdateDescriptor),
}

/// Messages the agent emits up the duplex session (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AgentEvent {
    /// Fallback message-level authentication when header auth fails.
    Authenticate { agent_id: AgentId, token: String },
    StatusUpdate(StatusUpdate),
    CommandResult {
        command_id: warden_core::command::CommandId,
        kind: String,
        success: bool,
        stdout: Option<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
        error_kind: Option<CommandOutcome>,
        error_message: Option<String>,
    },
    UpdateStatus {
        status: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        version: Option<String>,
    },
}

#[cfg(test)]
#[path = "control_tests.rs"]
mod tests;
