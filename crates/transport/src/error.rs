// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors surfaced by the HTTP and WebSocket transports (§4.4/§4.5, §7).
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("websocket connection failed: {0}")]
    WebSocketConnectionFailed(String),

    #[error("websocket auth failed: {0}")]
    WebSocketAuthFailed(String),

    #[error("http request failed: {0}")]
    HttpRequestFailed(String),

    #[error("http request rejected (status {status}): {message}")]
    HttpStatus { status: u16, message: String },

    #[error("circuit breaker open for this endpoint")]
    CircuitOpen,
}

impl TransportError {
    /// 401 is surfaced, never retried here — the orchestrator decides
    /// whether to refresh the token (§4.4).
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::HttpStatus { status: 401, .. })
    }
}

impl From<TransportError> for warden_core::AgentError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::WebSocketConnectionFailed(msg) => {
                warden_core::AgentError::WebSocketConnectionFailed(msg)
            }
            TransportError::WebSocketAuthFailed(msg) => {
                warden_core::AgentError::WebSocketAuthFailed(msg)
            }
            TransportError::HttpRequestFailed(msg) => warden_core::AgentError::HttpRequestFailed(msg),
            TransportError::HttpStatus { status, message } => {
                warden_core::AgentError::HttpRequestFailed(format!("{status}: {message}"))
            }
            TransportError::CircuitOpen => {
                warden_core::AgentError::HttpRequestFailed("circuit breaker open".into())
            }
        }
    }
}
