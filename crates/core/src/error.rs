// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The agent-wide error taxonomy.
//!
//! Every component boundary returns one of these variants (directly, or
//! wrapped via `#[from]` in a narrower component error). The taxonomy is
//! also what gets serialised into error reports sent to the control plane.

use thiserror::Error;

/// Top-level error taxonomy surfaced to logs and to the control plane.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("websocket connection failed: {0}")]
    WebSocketConnectionFailed(String),

    #[error("websocket authentication failed: {0}")]
    WebSocketAuthFailed(String),

    #[error("http request failed: {0}")]
    HttpRequestFailed(String),

    #[error("failed to load configuration: {0}")]
    ConfigLoadFailed(String),

    #[error("configuration validation failed: {0}")]
    ConfigValidationFailed(String),

    #[error("token decryption failed: {0}")]
    TokenDecryptionFailed(String),

    #[error("hardware info collection failed: {0}")]
    HardwareInfoCollectionFailed(String),

    #[error("status reporting failed: {0}")]
    StatusReportingFailed(String),

    #[error("command execution failed: {0}")]
    CommandExecutionFailed(String),

    #[error("command queue full")]
    CommandQueueFull,

    #[error("update download failed: {0}")]
    UpdateDownloadFailed(String),

    #[error("update checksum mismatch: expected {expected}, got {actual}")]
    UpdateChecksumMismatch { expected: String, actual: String },

    #[error("update extraction failed: {0}")]
    UpdateExtractionFailed(String),

    #[error("update rollback failed: {0}")]
    UpdateRollbackFailed(String),

    #[error("update service start failed: {0}")]
    UpdateServiceStartFailed(String),

    #[error("logging failed: {0}")]
    LoggingFailed(String),

    #[error("resource limit exceeded: {0}")]
    ResourceLimitExceeded(String),

    #[error("unhandled exception: {0}")]
    UnhandledException(String),

    #[error("offline queue error: {0}")]
    OfflineQueueError(String),
}

impl AgentError {
    /// The taxonomy tag as it appears in error reports sent to the control
    /// plane (`report_error`'s `error_kind` field).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::WebSocketConnectionFailed(_) => "WebSocketConnectionFailed",
            Self::WebSocketAuthFailed(_) => "WebSocketAuthFailed",
            Self::HttpRequestFailed(_) => "HttpRequestFailed",
            Self::ConfigLoadFailed(_) => "ConfigLoadFailed",
            Self::ConfigValidationFailed(_) => "ConfigValidationFailed",
            Self::TokenDecryptionFailed(_) => "TokenDecryptionFailed",
            Self::HardwareInfoCollectionFailed(_) => "HardwareInfoCollectionFailed",
            Self::StatusReportingFailed(_) => "StatusReportingFailed",
            Self::CommandExecutionFailed(_) => "CommandExecutionFailed",
            Self::CommandQueueFull => "CommandQueueFull",
            Self::UpdateDownloadFailed(_) => "UpdateDownloadFailed",
            Self::UpdateChecksumMismatch { .. } => "UpdateChecksumMismatch",
            Self::UpdateExtractionFailed(_) => "UpdateExtractionFailed",
            Self::UpdateRollbackFailed(_) => "UpdateRollbackFailed",
            Self::UpdateServiceStartFailed(_) => "UpdateServiceStartFailed",
            Self::LoggingFailed(_) => "LoggingFailed",
            Self::ResourceLimitExceeded(_) => "ResourceLimitExceeded",
            Self::UnhandledException(_) => "UnhandledException",
            Self::OfflineQueueError(_) => "OfflineQueueError",
        }
    }

    /// Whether this condition is recoverable by local retry (per §7's
    /// propagation policy) or whether it should drive the orchestrator to
    /// `CONFIGURATION_ERROR` and terminate the process.
    pub fn is_fatal_at_startup(&self) -> bool {
        matches!(
            self,
            Self::ConfigLoadFailed(_)
                | Self::ConfigValidationFailed(_)
                | Self::TokenDecryptionFailed(_)
        )
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
